//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use crate::db::CatalogRepository;
use crate::error::{AppError, Result};
use crate::filters;
use crate::models::{Category, Product};
use crate::state::AppState;

/// Products per listing page.
const PER_PAGE: u32 = 24;

/// Product display data for templates.
#[derive(Debug, Clone)]
pub struct ProductView {
    pub slug: String,
    pub name: String,
    /// The referenced category's name, straight from the join.
    pub category: String,
    pub category_slug: String,
    pub description: String,
    pub price: String,
    pub image_url: Option<String>,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            slug: product.slug.clone(),
            name: product.name.clone(),
            category: product.category_name.clone(),
            category_slug: product.category_slug.clone(),
            description: product.description.clone(),
            price: product.price.to_string(),
            image_url: product.image_url.clone(),
        }
    }
}

/// Category display data for templates.
#[derive(Debug, Clone)]
pub struct CategoryView {
    pub slug: String,
    pub name: String,
    pub description: String,
}

impl From<&Category> for CategoryView {
    fn from(category: &Category) -> Self {
        Self {
            slug: category.slug.clone(),
            name: category.name.clone(),
            description: category.description.clone(),
        }
    }
}

/// Pagination query parameters.
#[derive(Debug, Deserialize)]
pub struct ProductsQuery {
    pub page: Option<u32>,
    pub category: Option<String>,
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub products: Vec<ProductView>,
    pub categories: Vec<CategoryView>,
    pub active_category: Option<String>,
    pub current_page: u32,
    pub total_pages: u32,
    pub has_more_pages: bool,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub product: ProductView,
    pub product_id: i32,
    pub related_products: Vec<ProductView>,
}

/// Display product listing page.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ProductsQuery>,
) -> Result<Response> {
    let catalog = CatalogRepository::new(state.pool());
    let current_page = query.page.unwrap_or(1).max(1);

    // Resolve an optional ?category=slug filter
    let category = match &query.category {
        Some(slug) => Some(
            catalog
                .get_category_by_slug(slug)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("category {slug}")))?,
        ),
        None => None,
    };

    let (products, total) = catalog
        .list_active_products(category.as_ref().map(|c| c.id), current_page, PER_PAGE)
        .await?;
    let categories = catalog.list_categories().await?;

    let total_pages = u32::try_from(total.div_ceil(u64::from(PER_PAGE))).unwrap_or(1).max(1);

    Ok(ProductsIndexTemplate {
        products: products.iter().map(ProductView::from).collect(),
        categories: categories.iter().map(CategoryView::from).collect(),
        active_category: category.map(|c| c.slug),
        current_page,
        total_pages,
        has_more_pages: current_page < total_pages,
    }
    .into_response())
}

/// Display product detail page.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(slug): Path<String>) -> Result<Response> {
    let catalog = CatalogRepository::new(state.pool());

    let product = catalog
        .get_active_product_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {slug}")))?;

    let related = catalog
        .related_products(product.category_id, product.id, 4)
        .await?;

    Ok(ProductShowTemplate {
        product_id: product.id.as_i32(),
        product: ProductView::from(&product),
        related_products: related.iter().map(ProductView::from).collect(),
    }
    .into_response())
}
