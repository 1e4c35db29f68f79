//! Admin order routes: listing, detail, and status transitions.

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

use coralcart_core::{OrderId, OrderStatus};

use crate::db::{OrderAdminRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{RequireAdminAuth, RequireWriteAdmin};
use crate::models::{AdminOrder, AdminOrderItem};
use crate::state::AppState;

use super::dashboard::AdminUserView;

/// Maximum orders shown in the listing.
const LIST_LIMIT: u32 = 100;

/// Build the orders router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/{id}", get(show))
        .route("/{id}/status", post(update_status))
        .route("/{id}/cancel", post(cancel))
}

// =============================================================================
// View Types
// =============================================================================

/// Order row for the listing table.
#[derive(Debug, Clone)]
pub struct OrderRowView {
    pub id: i32,
    pub number: String,
    pub email: String,
    pub status: String,
    pub payment_method: String,
    pub total: String,
    pub placed_at: String,
}

impl From<&AdminOrder> for OrderRowView {
    fn from(order: &AdminOrder) -> Self {
        Self {
            id: order.id.as_i32(),
            number: order.number.clone(),
            email: order.email.to_string(),
            status: order.status.label().to_string(),
            payment_method: order.payment_method.clone(),
            total: order.totals.total.to_string(),
            placed_at: order.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// Order line view for the detail page.
#[derive(Debug, Clone)]
pub struct OrderItemView {
    pub name: String,
    pub quantity: u32,
    pub unit_price: String,
    pub line_total: String,
}

impl From<&AdminOrderItem> for OrderItemView {
    fn from(item: &AdminOrderItem) -> Self {
        Self {
            name: item.product_name.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price.to_string(),
            line_total: item.line_total().to_string(),
        }
    }
}

/// A status transition the detail page can offer.
#[derive(Debug, Clone)]
pub struct TransitionView {
    pub value: String,
    pub label: String,
}

/// A status option for the listing filter dropdown.
#[derive(Debug, Clone)]
pub struct StatusOptionView {
    pub value: String,
    pub selected: bool,
}

/// All statuses, marking the active filter.
fn status_options(active: Option<OrderStatus>) -> Vec<StatusOptionView> {
    [
        OrderStatus::Pending,
        OrderStatus::Paid,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ]
    .into_iter()
    .map(|status| StatusOptionView {
        value: status.to_string(),
        selected: active == Some(status),
    })
    .collect()
}

/// Full order view for the detail page.
#[derive(Debug, Clone)]
pub struct OrderDetailView {
    pub id: i32,
    pub number: String,
    pub email: String,
    pub status: String,
    pub status_value: String,
    pub payment_method: String,
    pub payment_reference: Option<String>,
    pub shipping_name: String,
    pub shipping_address: Vec<String>,
    pub subtotal: String,
    pub shipping: String,
    pub tax: String,
    pub total: String,
    pub placed_at: String,
    pub can_cancel: bool,
    pub transitions: Vec<TransitionView>,
}

impl From<&AdminOrder> for OrderDetailView {
    fn from(order: &AdminOrder) -> Self {
        let transitions = order
            .status
            .next_statuses()
            .into_iter()
            .filter(|s| *s != OrderStatus::Cancelled)
            .map(|s| TransitionView {
                value: s.to_string(),
                label: s.label().to_string(),
            })
            .collect();

        Self {
            id: order.id.as_i32(),
            number: order.number.clone(),
            email: order.email.to_string(),
            status: order.status.label().to_string(),
            status_value: order.status.to_string(),
            payment_method: order.payment_method.clone(),
            payment_reference: order.payment_reference.clone(),
            shipping_name: order.shipping_name.clone(),
            shipping_address: order.shipping_address.clone(),
            subtotal: order.totals.subtotal.to_string(),
            shipping: order.totals.shipping.to_string(),
            tax: order.totals.tax.to_string(),
            total: order.totals.total.to_string(),
            placed_at: order.created_at.format("%Y-%m-%d %H:%M UTC").to_string(),
            can_cancel: order.status.can_transition_to(OrderStatus::Cancelled),
            transitions,
        }
    }
}

// =============================================================================
// Query / Form Types
// =============================================================================

/// Listing query parameters.
#[derive(Debug, Deserialize)]
pub struct OrdersQuery {
    pub status: Option<String>,
    pub q: Option<String>,
}

/// Detail page query parameters.
#[derive(Debug, Deserialize)]
pub struct OrderShowQuery {
    pub error: Option<String>,
}

/// Status transition form data.
///
/// Carries the status the admin was looking at, so the update is guarded
/// against a concurrent change by someone else.
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub from_status: String,
    pub to_status: String,
}

/// Cancel form data.
#[derive(Debug, Deserialize)]
pub struct CancelForm {
    pub from_status: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Orders list page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/index.html")]
pub struct OrdersIndexTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub orders: Vec<OrderRowView>,
    pub status_options: Vec<StatusOptionView>,
    pub search_value: Option<String>,
}

/// Order detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/show.html")]
pub struct OrderShowTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub order: OrderDetailView,
    pub items: Vec<OrderItemView>,
    pub error: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Orders list page handler.
#[instrument(skip(admin, state))]
pub async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(query): Query<OrdersQuery>,
) -> Result<OrdersIndexTemplate> {
    let status = query
        .status
        .as_deref()
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<OrderStatus>().ok());

    let orders = OrderAdminRepository::new(state.pool())
        .list(status, query.q.as_deref(), LIST_LIMIT)
        .await?;

    Ok(OrdersIndexTemplate {
        admin_user: AdminUserView::from(&admin),
        current_path: "/orders".to_string(),
        orders: orders.iter().map(OrderRowView::from).collect(),
        status_options: status_options(status),
        search_value: query.q,
    })
}

/// Order detail page handler.
#[instrument(skip(admin, state))]
pub async fn show(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(query): Query<OrderShowQuery>,
) -> Result<OrderShowTemplate> {
    let (order, items) = OrderAdminRepository::new(state.pool())
        .get_with_items(OrderId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;

    Ok(OrderShowTemplate {
        admin_user: AdminUserView::from(&admin),
        current_path: "/orders".to_string(),
        order: OrderDetailView::from(&order),
        items: items.iter().map(OrderItemView::from).collect(),
        error: query.error,
    })
}

/// Apply a status transition.
#[instrument(skip(_admin, state, form))]
pub async fn update_status(
    RequireWriteAdmin(_admin): RequireWriteAdmin,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Form(form): Form<StatusForm>,
) -> Result<Response> {
    let (Ok(from), Ok(to)) = (
        form.from_status.parse::<OrderStatus>(),
        form.to_status.parse::<OrderStatus>(),
    ) else {
        return Err(AppError::BadRequest("unknown order status".to_string()));
    };

    apply_transition(&state, OrderId::new(id), from, to).await
}

/// Cancel an order.
#[instrument(skip(_admin, state, form))]
pub async fn cancel(
    RequireWriteAdmin(_admin): RequireWriteAdmin,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Form(form): Form<CancelForm>,
) -> Result<Response> {
    let Ok(from) = form.from_status.parse::<OrderStatus>() else {
        return Err(AppError::BadRequest("unknown order status".to_string()));
    };

    apply_transition(&state, OrderId::new(id), from, OrderStatus::Cancelled).await
}

/// Run a guarded transition and turn the outcome into a redirect.
async fn apply_transition(
    state: &AppState,
    id: OrderId,
    from: OrderStatus,
    to: OrderStatus,
) -> Result<Response> {
    let result = OrderAdminRepository::new(state.pool())
        .transition_status(id, from, to)
        .await;

    match result {
        Ok(true) => Ok(Redirect::to(&format!("/orders/{id}")).into_response()),
        // Someone else changed the order since this page was loaded.
        Ok(false) => Ok(Redirect::to(&format!("/orders/{id}?error=stale")).into_response()),
        Err(RepositoryError::Conflict(_)) => {
            Ok(Redirect::to(&format!("/orders/{id}?error=transition")).into_response())
        }
        Err(e) => Err(e.into()),
    }
}
