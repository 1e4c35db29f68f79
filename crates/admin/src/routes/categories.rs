//! Admin category routes.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tracing::instrument;

use coralcart_core::CategoryId;

use crate::db::{CategoryAdminRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{RequireAdminAuth, RequireWriteAdmin};
use crate::models::CategorySummary;
use crate::state::AppState;

use super::dashboard::AdminUserView;

/// Build the categories router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index).post(create))
        .route("/{id}", post(update))
        .route("/{id}/delete", post(delete))
}

// =============================================================================
// View Types
// =============================================================================

/// Category row for the listing table.
#[derive(Debug, Clone)]
pub struct CategoryRowView {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub product_count: i64,
}

impl From<&CategorySummary> for CategoryRowView {
    fn from(category: &CategorySummary) -> Self {
        Self {
            id: category.id.as_i32(),
            name: category.name.clone(),
            slug: category.slug.clone(),
            description: category.description.clone(),
            product_count: category.product_count,
        }
    }
}

// =============================================================================
// Query / Form Types
// =============================================================================

/// Listing query parameters.
#[derive(Debug, Deserialize)]
pub struct CategoriesQuery {
    pub notice: Option<String>,
    pub error: Option<String>,
}

/// Category create/update form data.
#[derive(Debug, Deserialize)]
pub struct CategoryForm {
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Categories page template (listing + inline create form).
#[derive(Template, WebTemplate)]
#[template(path = "categories/index.html")]
pub struct CategoriesIndexTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub categories: Vec<CategoryRowView>,
    pub notice: Option<String>,
    pub error: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Categories page handler.
#[instrument(skip(admin, state))]
pub async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(query): Query<CategoriesQuery>,
) -> Result<CategoriesIndexTemplate> {
    let categories = CategoryAdminRepository::new(state.pool()).list().await?;

    Ok(CategoriesIndexTemplate {
        admin_user: AdminUserView::from(&admin),
        current_path: "/categories".to_string(),
        categories: categories.iter().map(CategoryRowView::from).collect(),
        notice: query.notice,
        error: query.error,
    })
}

/// Create a category.
#[instrument(skip(_admin, state, form))]
pub async fn create(
    RequireWriteAdmin(_admin): RequireWriteAdmin,
    State(state): State<AppState>,
    Form(form): Form<CategoryForm>,
) -> Result<Response> {
    let name = form.name.trim().to_string();
    if name.is_empty() {
        return Ok(Redirect::to("/categories?error=name").into_response());
    }

    let slug = form
        .slug
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map_or_else(|| super::products::slugify(&name), ToString::to_string);
    let description = form.description.unwrap_or_default().trim().to_string();

    match CategoryAdminRepository::new(state.pool())
        .create(&name, &slug, &description)
        .await
    {
        Ok(_) => Ok(Redirect::to("/categories?notice=created").into_response()),
        Err(RepositoryError::Conflict(_)) => {
            Ok(Redirect::to("/categories?error=slug").into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// Update a category.
#[instrument(skip(_admin, state, form))]
pub async fn update(
    RequireWriteAdmin(_admin): RequireWriteAdmin,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Form(form): Form<CategoryForm>,
) -> Result<Response> {
    let name = form.name.trim().to_string();
    if name.is_empty() {
        return Ok(Redirect::to("/categories?error=name").into_response());
    }

    let slug = form
        .slug
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map_or_else(|| super::products::slugify(&name), ToString::to_string);
    let description = form.description.unwrap_or_default().trim().to_string();

    match CategoryAdminRepository::new(state.pool())
        .update(CategoryId::new(id), &name, &slug, &description)
        .await
    {
        Ok(true) => Ok(Redirect::to("/categories?notice=updated").into_response()),
        Ok(false) => Err(AppError::NotFound(format!("category {id}"))),
        Err(RepositoryError::Conflict(_)) => {
            Ok(Redirect::to("/categories?error=slug").into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// Delete a category.
///
/// A category that still has products is never deleted; the page shows why.
#[instrument(skip(_admin, state))]
pub async fn delete(
    RequireWriteAdmin(_admin): RequireWriteAdmin,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response> {
    match CategoryAdminRepository::new(state.pool())
        .delete(CategoryId::new(id))
        .await
    {
        Ok(()) => Ok(Redirect::to("/categories?notice=deleted").into_response()),
        Err(RepositoryError::Conflict(_)) => {
            Ok(Redirect::to("/categories?error=has_products").into_response())
        }
        Err(RepositoryError::NotFound) => Err(AppError::NotFound(format!("category {id}"))),
        Err(e) => Err(e.into()),
    }
}
