//! Account route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use crate::db::OrderRepository;
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::Order;
use crate::state::AppState;

/// Order summary row for the account page.
#[derive(Debug, Clone)]
pub struct OrderSummaryView {
    pub number: String,
    pub status: String,
    pub total: String,
    pub placed_at: String,
}

impl From<&Order> for OrderSummaryView {
    fn from(order: &Order) -> Self {
        Self {
            number: order.number.clone(),
            status: order.status.label().to_string(),
            total: order.totals.total.to_string(),
            placed_at: order.created_at.format("%Y-%m-%d").to_string(),
        }
    }
}

/// Account overview template.
#[derive(Template, WebTemplate)]
#[template(path = "account/index.html")]
pub struct AccountTemplate {
    pub email: String,
    pub name: String,
    pub orders: Vec<OrderSummaryView>,
}

/// Display the account overview with order history.
#[instrument(skip(customer, state))]
pub async fn index(
    RequireAuth(customer): RequireAuth,
    State(state): State<AppState>,
) -> Result<impl IntoResponse> {
    let orders = OrderRepository::new(state.pool())
        .list_for_customer(customer.id)
        .await?;

    let name = format!(
        "{} {}",
        customer.first_name.as_deref().unwrap_or(""),
        customer.last_name.as_deref().unwrap_or("")
    )
    .trim()
    .to_string();

    Ok(AccountTemplate {
        email: customer.email.to_string(),
        name,
        orders: orders.iter().map(OrderSummaryView::from).collect(),
    })
}
