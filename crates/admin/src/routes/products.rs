//! Admin product routes: full catalog CRUD.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use coralcart_core::{CategoryId, Money, ProductId};

use crate::db::products::ProductInput;
use crate::db::{CategoryAdminRepository, ProductAdminRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{RequireAdminAuth, RequireWriteAdmin};
use crate::models::{CategorySummary, ProductDetail};
use crate::state::AppState;

use super::dashboard::AdminUserView;

/// Build the products router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index).post(create))
        .route("/new", get(new_form))
        .route("/{id}/edit", get(edit_form))
        .route("/{id}", post(update))
        .route("/{id}/delete", post(delete))
}

// =============================================================================
// View Types
// =============================================================================

/// Product row for the listing table.
#[derive(Debug, Clone)]
pub struct ProductRowView {
    pub id: i32,
    pub name: String,
    /// The joined category name, always in sync with the category row.
    pub category: String,
    pub price: String,
    pub active: bool,
}

impl From<&ProductDetail> for ProductRowView {
    fn from(product: &ProductDetail) -> Self {
        Self {
            id: product.id.as_i32(),
            name: product.name.clone(),
            category: product.category_name.clone(),
            price: product.price.to_string(),
            active: product.active,
        }
    }
}

/// Category option for the form dropdown.
#[derive(Debug, Clone)]
pub struct CategoryOptionView {
    pub id: i32,
    pub name: String,
}

impl From<&CategorySummary> for CategoryOptionView {
    fn from(category: &CategorySummary) -> Self {
        Self {
            id: category.id.as_i32(),
            name: category.name.clone(),
        }
    }
}

/// Editable product fields for the form.
#[derive(Debug, Clone, Default)]
pub struct ProductFormView {
    pub category_id: i32,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price: String,
    pub image_url: String,
    pub active: bool,
}

impl From<&ProductDetail> for ProductFormView {
    fn from(product: &ProductDetail) -> Self {
        Self {
            category_id: product.category_id.as_i32(),
            name: product.name.clone(),
            slug: product.slug.clone(),
            description: product.description.clone(),
            price: format!("{:.2}", product.price.amount()),
            image_url: product.image_url.clone().unwrap_or_default(),
            active: product.active,
        }
    }
}

// =============================================================================
// Query / Form Types
// =============================================================================

/// Listing query parameters.
#[derive(Debug, Deserialize)]
pub struct ProductsQuery {
    pub notice: Option<String>,
}

/// Form page query parameters.
#[derive(Debug, Deserialize)]
pub struct FormQuery {
    pub error: Option<String>,
}

/// Product create/update form data.
#[derive(Debug, Deserialize)]
pub struct ProductForm {
    pub category_id: i32,
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub price: String,
    pub image_url: Option<String>,
    pub active: Option<String>,
}

impl ProductForm {
    /// Validate and convert into repository input.
    fn into_input(self) -> std::result::Result<ProductInput, &'static str> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err("name");
        }

        let price: Decimal = self.price.trim().parse().map_err(|_| "price")?;
        if price.is_sign_negative() {
            return Err("price");
        }

        let slug = match self.slug.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(slug) => slug.to_string(),
            None => slugify(&name),
        };

        Ok(ProductInput {
            category_id: CategoryId::new(self.category_id),
            name,
            slug,
            description: self.description.unwrap_or_default().trim().to_string(),
            price: Money::new(price).round_to_cents(),
            image_url: self
                .image_url
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            // Checkboxes submit a value only when checked
            active: self.active.is_some(),
        })
    }
}

/// Build a URL slug from a product or category name.
pub(crate) fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_dash = true;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    slug.trim_end_matches('-').to_string()
}

// =============================================================================
// Templates
// =============================================================================

/// Products list page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub products: Vec<ProductRowView>,
    pub notice: Option<String>,
}

/// Product create/edit form template.
#[derive(Template, WebTemplate)]
#[template(path = "products/form.html")]
pub struct ProductFormTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub heading: String,
    pub action: String,
    pub product: ProductFormView,
    pub categories: Vec<CategoryOptionView>,
    pub error: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Products list page handler.
#[instrument(skip(admin, state))]
pub async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(query): Query<ProductsQuery>,
) -> Result<ProductsIndexTemplate> {
    let products = ProductAdminRepository::new(state.pool()).list().await?;

    Ok(ProductsIndexTemplate {
        admin_user: AdminUserView::from(&admin),
        current_path: "/products".to_string(),
        products: products.iter().map(ProductRowView::from).collect(),
        notice: query.notice,
    })
}

/// New product form handler.
#[instrument(skip(admin, state))]
pub async fn new_form(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(query): Query<FormQuery>,
) -> Result<ProductFormTemplate> {
    let categories = CategoryAdminRepository::new(state.pool()).list().await?;

    Ok(ProductFormTemplate {
        admin_user: AdminUserView::from(&admin),
        current_path: "/products".to_string(),
        heading: "New product".to_string(),
        action: "/products".to_string(),
        product: ProductFormView {
            active: true,
            ..ProductFormView::default()
        },
        categories: categories.iter().map(CategoryOptionView::from).collect(),
        error: query.error,
    })
}

/// Edit product form handler.
#[instrument(skip(admin, state))]
pub async fn edit_form(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(query): Query<FormQuery>,
) -> Result<ProductFormTemplate> {
    let product = ProductAdminRepository::new(state.pool())
        .get_by_id(ProductId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    let categories = CategoryAdminRepository::new(state.pool()).list().await?;

    Ok(ProductFormTemplate {
        admin_user: AdminUserView::from(&admin),
        current_path: "/products".to_string(),
        heading: format!("Edit {}", product.name),
        action: format!("/products/{id}"),
        product: ProductFormView::from(&product),
        categories: categories.iter().map(CategoryOptionView::from).collect(),
        error: query.error,
    })
}

/// Create a product.
#[instrument(skip(_admin, state, form))]
pub async fn create(
    RequireWriteAdmin(_admin): RequireWriteAdmin,
    State(state): State<AppState>,
    Form(form): Form<ProductForm>,
) -> Result<Response> {
    let input = match form.into_input() {
        Ok(input) => input,
        Err(field) => {
            return Ok(Redirect::to(&format!("/products/new?error={field}")).into_response());
        }
    };

    match ProductAdminRepository::new(state.pool()).create(&input).await {
        Ok(product) => {
            tracing::info!(product = %product.name, "product created");
            Ok(Redirect::to("/products?notice=created").into_response())
        }
        Err(RepositoryError::Conflict(_)) => {
            Ok(Redirect::to("/products/new?error=slug").into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// Update a product.
#[instrument(skip(_admin, state, form))]
pub async fn update(
    RequireWriteAdmin(_admin): RequireWriteAdmin,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Form(form): Form<ProductForm>,
) -> Result<Response> {
    let input = match form.into_input() {
        Ok(input) => input,
        Err(field) => {
            return Ok(
                Redirect::to(&format!("/products/{id}/edit?error={field}")).into_response(),
            );
        }
    };

    match ProductAdminRepository::new(state.pool())
        .update(ProductId::new(id), &input)
        .await
    {
        Ok(true) => Ok(Redirect::to("/products?notice=updated").into_response()),
        Ok(false) => Err(AppError::NotFound(format!("product {id}"))),
        Err(RepositoryError::Conflict(_)) => {
            Ok(Redirect::to(&format!("/products/{id}/edit?error=slug")).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// Delete a product, archiving it when orders reference it.
#[instrument(skip(_admin, state))]
pub async fn delete(
    RequireWriteAdmin(_admin): RequireWriteAdmin,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response> {
    let deleted = ProductAdminRepository::new(state.pool())
        .delete_or_archive(ProductId::new(id))
        .await?;

    let notice = if deleted { "deleted" } else { "archived" };
    Ok(Redirect::to(&format!("/products?notice={notice}")).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Sea Salt Caramel"), "sea-salt-caramel");
        assert_eq!(slugify("  Fancy -- Name!  "), "fancy-name");
        assert_eq!(slugify("Écru tote"), "cru-tote");
    }

    #[test]
    fn test_form_rejects_bad_price() {
        let form = ProductForm {
            category_id: 1,
            name: "Widget".to_string(),
            slug: None,
            description: None,
            price: "not-a-number".to_string(),
            image_url: None,
            active: Some("on".to_string()),
        };
        assert_eq!(form.into_input().unwrap_err(), "price");
    }

    #[test]
    fn test_form_defaults_slug_from_name() {
        let form = ProductForm {
            category_id: 1,
            name: "Sea Salt Caramel".to_string(),
            slug: None,
            description: Some("chewy".to_string()),
            price: "12.50".to_string(),
            image_url: Some(String::new()),
            active: None,
        };
        let input = form.into_input().expect("valid form");
        assert_eq!(input.slug, "sea-salt-caramel");
        assert_eq!(input.price, Money::from_cents(1250));
        assert!(input.image_url.is_none());
        assert!(!input.active);
    }
}
