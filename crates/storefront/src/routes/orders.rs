//! Order tracking and confirmation handlers.
//!
//! Logged-in customers see their own orders; guests gain access to an order
//! by proving they know its number and contact email, which the session then
//! remembers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use coralcart_core::Email;

use crate::db::{OrderRepository, settings};
use crate::error::Result;
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::models::{Order, OrderItem, session_keys};
use crate::routes::checkout::PaymentMethodView;
use crate::state::AppState;

// =============================================================================
// Session Helpers
// =============================================================================

/// Remember that this session is allowed to view an order.
pub async fn remember_tracked_order(session: &Session, number: &str) {
    let mut tracked: Vec<String> = session
        .get(session_keys::TRACKED_ORDERS)
        .await
        .ok()
        .flatten()
        .unwrap_or_default();

    if !tracked.iter().any(|n| n == number) {
        tracked.push(number.to_string());
        if let Err(e) = session.insert(session_keys::TRACKED_ORDERS, &tracked).await {
            tracing::error!("Failed to remember tracked order: {e}");
        }
    }
}

/// Whether this session has tracked the given order number.
async fn is_tracked_order(session: &Session, number: &str) -> bool {
    session
        .get::<Vec<String>>(session_keys::TRACKED_ORDERS)
        .await
        .ok()
        .flatten()
        .is_some_and(|tracked| tracked.iter().any(|n| n == number))
}

// =============================================================================
// View Types
// =============================================================================

/// Order line display data for templates.
#[derive(Debug, Clone)]
pub struct OrderItemView {
    pub name: String,
    pub quantity: u32,
    pub unit_price: String,
    pub line_total: String,
}

impl From<&OrderItem> for OrderItemView {
    fn from(item: &OrderItem) -> Self {
        Self {
            name: item.product_name.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price.to_string(),
            line_total: item.line_total().to_string(),
        }
    }
}

/// Order display data for templates.
#[derive(Debug, Clone)]
pub struct OrderView {
    pub number: String,
    pub status: String,
    pub is_pending: bool,
    pub email: String,
    pub payment_method: String,
    pub payment_reference: Option<String>,
    pub shipping_name: String,
    pub shipping_lines: Vec<String>,
    pub subtotal: String,
    pub shipping: String,
    pub tax: String,
    pub total: String,
    pub placed_at: String,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        let mut shipping_lines = vec![order.shipping.address1.clone()];
        if let Some(address2) = &order.shipping.address2 {
            shipping_lines.push(address2.clone());
        }
        shipping_lines.push(format!(
            "{} {}",
            order.shipping.postcode, order.shipping.city
        ));
        shipping_lines.push(order.shipping.country.clone());

        Self {
            number: order.number.clone(),
            status: order.status.label().to_string(),
            is_pending: order.status == coralcart_core::OrderStatus::Pending,
            email: order.email.to_string(),
            payment_method: order.payment_method.clone(),
            payment_reference: order.payment_reference.clone(),
            shipping_name: order.shipping.name.clone(),
            shipping_lines,
            subtotal: order.totals.subtotal.to_string(),
            shipping: order.totals.shipping.to_string(),
            tax: order.totals.tax.to_string(),
            total: order.totals.total.to_string(),
            placed_at: order.created_at.format("%Y-%m-%d %H:%M UTC").to_string(),
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Tracking form template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/track.html")]
pub struct TrackOrderTemplate {
    pub error: Option<String>,
}

/// Order status/confirmation page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/show.html")]
pub struct OrderShowTemplate {
    pub order: OrderView,
    pub items: Vec<OrderItemView>,
    pub payment_method: Option<PaymentMethodView>,
    pub just_placed: bool,
    pub payment_notice: Option<String>,
}

// =============================================================================
// Query / Form Types
// =============================================================================

/// Query parameters for the tracking form.
#[derive(Debug, Deserialize)]
pub struct TrackQuery {
    pub error: Option<String>,
}

/// Tracking form data.
#[derive(Debug, Deserialize)]
pub struct TrackForm {
    pub number: String,
    pub email: String,
}

/// Query parameters for the order page.
#[derive(Debug, Deserialize)]
pub struct OrderShowQuery {
    pub placed: Option<String>,
    pub payment: Option<String>,
}

/// Payment reference form data.
#[derive(Debug, Deserialize)]
pub struct PaymentReferenceForm {
    pub reference: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the guest tracking form.
#[instrument]
pub async fn track_page(Query(query): Query<TrackQuery>) -> impl IntoResponse {
    TrackOrderTemplate { error: query.error }
}

/// Look up an order by number and contact email.
#[instrument(skip(state, session, form))]
pub async fn track(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<TrackForm>,
) -> Result<Response> {
    let number = form.number.trim().to_uppercase();
    let Ok(email) = Email::parse(&form.email) else {
        return Ok(Redirect::to("/orders/track?error=not_found").into_response());
    };

    let order = OrderRepository::new(state.pool())
        .find_for_tracking(&number, &email)
        .await?;

    match order {
        Some(order) => {
            remember_tracked_order(&session, &order.number).await;
            Ok(Redirect::to(&format!("/orders/{}", order.number)).into_response())
        }
        // One error code for both unknown number and wrong email, so the
        // form can't be used to probe which order numbers exist.
        None => Ok(Redirect::to("/orders/track?error=not_found").into_response()),
    }
}

/// Display an order's status page.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(customer): OptionalAuth,
    Path(number): Path<String>,
    Query(query): Query<OrderShowQuery>,
) -> Result<Response> {
    let Some((order, items)) = load_authorized_order(&state, &session, customer.as_ref(), &number)
        .await?
    else {
        return Ok(Redirect::to("/orders/track").into_response());
    };

    // Payment instructions are only relevant while the order awaits payment.
    let payment_method = if order.status == coralcart_core::OrderStatus::Pending {
        settings::load_payment_methods(state.pool())
            .await?
            .iter()
            .find(|m| m.id == order.payment_method)
            .map(PaymentMethodView::from)
    } else {
        None
    };

    let payment_notice = query.payment.as_deref().map(|code| {
        match code {
            "saved" => "Payment reference saved. We'll confirm your payment shortly.",
            "locked" => "This order is no longer awaiting payment.",
            _ => "Payment reference could not be saved.",
        }
        .to_string()
    });

    Ok(OrderShowTemplate {
        order: OrderView::from(&order),
        items: items.iter().map(OrderItemView::from).collect(),
        payment_method,
        just_placed: query.placed.is_some(),
        payment_notice,
    }
    .into_response())
}

/// Attach the customer's payment reference to a pending order.
#[instrument(skip(state, session, form))]
pub async fn set_payment_reference(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(customer): OptionalAuth,
    Path(number): Path<String>,
    Form(form): Form<PaymentReferenceForm>,
) -> Result<Response> {
    let Some((order, _)) =
        load_authorized_order(&state, &session, customer.as_ref(), &number).await?
    else {
        return Ok(Redirect::to("/orders/track").into_response());
    };

    let reference = form.reference.trim();
    if reference.is_empty() {
        return Ok(Redirect::to(&format!("/orders/{number}?payment=invalid")).into_response());
    }

    let updated = OrderRepository::new(state.pool())
        .set_payment_reference(&order.number, &order.email, reference)
        .await?;

    let outcome = if updated { "saved" } else { "locked" };
    Ok(Redirect::to(&format!("/orders/{number}?payment={outcome}")).into_response())
}

/// Load an order the current session is allowed to see.
///
/// Authorized when the logged-in customer owns the order, or when the
/// session has previously tracked it by number + email.
async fn load_authorized_order(
    state: &AppState,
    session: &Session,
    customer: Option<&crate::models::CurrentCustomer>,
    number: &str,
) -> Result<Option<(Order, Vec<OrderItem>)>> {
    let Some((order, items)) = OrderRepository::new(state.pool())
        .get_with_items_by_number(number)
        .await?
    else {
        return Ok(None);
    };

    let owns = customer.is_some_and(|c| order.customer_id == Some(c.id));
    if owns || is_tracked_order(session, number).await {
        Ok(Some((order, items)))
    } else {
        Ok(None)
    }
}
