//! Category route handlers.

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
use crate::routes::products::{CategoryView, ProductView};
use crate::state::AppState;

/// Products per category page.
const PER_PAGE: u32 = 24;

/// Pagination query parameters.
#[derive(Debug, Deserialize)]
pub struct CategoryQuery {
    pub page: Option<u32>,
}

/// Category listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "categories/index.html")]
pub struct CategoriesIndexTemplate {
    pub categories: Vec<CategoryView>,
}

/// Category detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "categories/show.html")]
pub struct CategoryShowTemplate {
    pub category: CategoryView,
    pub products: Vec<ProductView>,
    pub current_page: u32,
    pub total_pages: u32,
    pub has_more_pages: bool,
}

/// Display category listing page.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let categories = CatalogRepository::new(state.pool()).list_categories().await?;

    Ok(CategoriesIndexTemplate {
        categories: categories.iter().map(CategoryView::from).collect(),
    })
}

/// Display a category with its products.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<CategoryQuery>,
) -> Result<Response> {
    let catalog = CatalogRepository::new(state.pool());
    let current_page = query.page.unwrap_or(1).max(1);

    let category = catalog
        .get_category_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("category {slug}")))?;

    let (products, total) = catalog
        .list_active_products(Some(category.id), current_page, PER_PAGE)
        .await?;

    let total_pages = u32::try_from(total.div_ceil(u64::from(PER_PAGE))).unwrap_or(1).max(1);

    Ok(CategoryShowTemplate {
        category: CategoryView::from(&category),
        products: products.iter().map(ProductView::from).collect(),
        current_page,
        total_pages,
        has_more_pages: current_page < total_pages,
    }
    .into_response())
}
