//! Home page handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use crate::cache::{CacheKey, CacheValue};
use crate::db::CatalogRepository;
use crate::error::Result;
use crate::filters;
use crate::models::{Category, Product};
use crate::routes::products::{CategoryView, ProductView};
use crate::state::AppState;

/// Number of featured products on the home page.
const FEATURED_COUNT: u32 = 8;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub categories: Vec<CategoryView>,
    pub featured_products: Vec<ProductView>,
}

/// Display the home page.
#[instrument(skip(state))]
pub async fn home(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let categories = cached_categories(&state).await?;
    let featured = cached_featured_products(&state).await?;

    Ok(HomeTemplate {
        categories: categories.iter().map(CategoryView::from).collect(),
        featured_products: featured.iter().map(ProductView::from).collect(),
    })
}

/// Category list, via the 60s catalog cache.
async fn cached_categories(state: &AppState) -> Result<Vec<Category>> {
    if let Some(CacheValue::Categories(categories)) =
        state.catalog_cache().get(&CacheKey::Categories).await
    {
        return Ok(categories);
    }

    let categories = CatalogRepository::new(state.pool()).list_categories().await?;
    state
        .catalog_cache()
        .insert(
            CacheKey::Categories,
            CacheValue::Categories(categories.clone()),
        )
        .await;
    Ok(categories)
}

/// Featured products, via the 60s catalog cache.
async fn cached_featured_products(state: &AppState) -> Result<Vec<Product>> {
    if let Some(CacheValue::Products(products)) =
        state.catalog_cache().get(&CacheKey::FeaturedProducts).await
    {
        return Ok(products);
    }

    let products = CatalogRepository::new(state.pool())
        .featured_products(FEATURED_COUNT)
        .await?;
    state
        .catalog_cache()
        .insert(
            CacheKey::FeaturedProducts,
            CacheValue::Products(products.clone()),
        )
        .await;
    Ok(products)
}
