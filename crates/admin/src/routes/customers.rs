//! Admin customer routes.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    extract::{Path, Query, State},
    routing::get,
};
use serde::Deserialize;
use tracing::instrument;

use coralcart_core::CustomerId;

use crate::db::{CustomerAdminRepository, OrderAdminRepository};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::models::CustomerSummary;
use crate::routes::orders::OrderRowView;
use crate::state::AppState;

use super::dashboard::AdminUserView;

/// Build the customers router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/{id}", get(show))
}

// =============================================================================
// View Types
// =============================================================================

/// Customer row for the listing table.
#[derive(Debug, Clone)]
pub struct CustomerRowView {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub order_count: i64,
    pub total_spent: String,
    pub joined_at: String,
}

impl From<&CustomerSummary> for CustomerRowView {
    fn from(customer: &CustomerSummary) -> Self {
        Self {
            id: customer.id.as_i32(),
            name: customer.display_name(),
            email: customer.email.to_string(),
            order_count: customer.order_count,
            total_spent: customer.total_spent.to_string(),
            joined_at: customer.created_at.format("%Y-%m-%d").to_string(),
        }
    }
}

// =============================================================================
// Query Types
// =============================================================================

/// Listing query parameters.
#[derive(Debug, Deserialize)]
pub struct CustomersQuery {
    pub q: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Customers list page template.
#[derive(Template, WebTemplate)]
#[template(path = "customers/index.html")]
pub struct CustomersIndexTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub customers: Vec<CustomerRowView>,
    pub search_value: Option<String>,
}

/// Customer detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "customers/show.html")]
pub struct CustomerShowTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub customer: CustomerRowView,
    pub orders: Vec<OrderRowView>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Customers list page handler.
#[instrument(skip(admin, state))]
pub async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(query): Query<CustomersQuery>,
) -> Result<CustomersIndexTemplate> {
    let customers = CustomerAdminRepository::new(state.pool())
        .list(query.q.as_deref())
        .await?;

    Ok(CustomersIndexTemplate {
        admin_user: AdminUserView::from(&admin),
        current_path: "/customers".to_string(),
        customers: customers.iter().map(CustomerRowView::from).collect(),
        search_value: query.q,
    })
}

/// Customer detail page handler.
#[instrument(skip(admin, state))]
pub async fn show(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<CustomerShowTemplate> {
    let customer_id = CustomerId::new(id);

    let customer = CustomerAdminRepository::new(state.pool())
        .get_by_id(customer_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("customer {id}")))?;

    let orders = OrderAdminRepository::new(state.pool())
        .list_for_customer(customer_id)
        .await?;

    Ok(CustomerShowTemplate {
        admin_user: AdminUserView::from(&admin),
        current_path: "/customers".to_string(),
        customer: CustomerRowView::from(&customer),
        orders: orders.iter().map(OrderRowView::from).collect(),
    })
}
