//! Checkout route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use coralcart_core::PaymentMethod;
use coralcart_core::pricing::{CheckoutTotals, PricedLine};
use coralcart_core::ProductId;

use crate::db::{CatalogRepository, settings};
use crate::error::Result;
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::models::ShippingAddress;
use crate::routes::cart::{CartItemView, get_cart, save_cart};
use crate::routes::orders::remember_tracked_order;
use crate::services::checkout::{CheckoutError, CheckoutRequest, CheckoutService};
use crate::state::AppState;

/// Payment method display data for templates.
#[derive(Debug, Clone)]
pub struct PaymentMethodView {
    pub id: String,
    pub label: String,
    pub instructions: String,
    pub details: Vec<(String, String)>,
}

impl From<&PaymentMethod> for PaymentMethodView {
    fn from(method: &PaymentMethod) -> Self {
        Self {
            id: method.id.clone(),
            label: method.label.clone(),
            instructions: method.instructions.clone(),
            details: method
                .details
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }
}

/// Computed totals display data for templates.
#[derive(Debug, Clone)]
pub struct TotalsView {
    pub subtotal: String,
    pub shipping: String,
    pub tax: String,
    pub total: String,
}

impl From<&CheckoutTotals> for TotalsView {
    fn from(totals: &CheckoutTotals) -> Self {
        Self {
            subtotal: totals.subtotal.to_string(),
            shipping: totals.shipping.to_string(),
            tax: totals.tax.to_string(),
            total: totals.total.to_string(),
        }
    }
}

/// Query parameters for error display.
#[derive(Debug, Deserialize)]
pub struct CheckoutQuery {
    pub error: Option<String>,
}

/// Checkout form data.
#[derive(Debug, Deserialize)]
pub struct CheckoutForm {
    pub email: String,
    pub name: String,
    pub address1: String,
    pub address2: Option<String>,
    pub city: String,
    pub postcode: String,
    pub country: String,
    pub payment_method: String,
}

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutTemplate {
    pub items: Vec<CartItemView>,
    pub totals: TotalsView,
    pub payment_methods: Vec<PaymentMethodView>,
    pub email: String,
    pub error: Option<String>,
}

/// Display the checkout page with a totals preview.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(customer): OptionalAuth,
    Query(query): Query<CheckoutQuery>,
) -> Result<Response> {
    let cart = get_cart(&session).await;
    if cart.is_empty() {
        return Ok(Redirect::to("/cart").into_response());
    }

    // Price the cart once for both the line display and the totals preview.
    let ids: Vec<ProductId> = cart.lines.iter().map(|l| l.product_id).collect();
    let products = CatalogRepository::new(state.pool())
        .get_active_products_by_ids(&ids)
        .await?;

    let mut items = Vec::new();
    let mut priced = Vec::new();
    for line in &cart.lines {
        let Some(product) = products.iter().find(|p| p.id == line.product_id) else {
            continue;
        };
        priced.push(PricedLine::new(product.price, line.quantity));
        items.push(CartItemView {
            product_id: product.id.as_i32(),
            slug: product.slug.clone(),
            name: product.name.clone(),
            quantity: line.quantity,
            price: product.price.to_string(),
            line_price: product.price.times(line.quantity).to_string(),
            image_url: product.image_url.clone(),
        });
    }

    if items.is_empty() {
        return Ok(Redirect::to("/cart").into_response());
    }

    let totals = CheckoutTotals::compute(&priced);
    let methods = settings::load_enabled_payment_methods(state.pool()).await?;

    Ok(CheckoutTemplate {
        items,
        totals: TotalsView::from(&totals),
        payment_methods: methods.iter().map(PaymentMethodView::from).collect(),
        email: customer.map(|c| c.email.to_string()).unwrap_or_default(),
        error: query.error,
    }
    .into_response())
}

/// Handle checkout form submission.
#[instrument(skip(state, session, form))]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(customer): OptionalAuth,
    Form(form): Form<CheckoutForm>,
) -> Result<Response> {
    let mut cart = get_cart(&session).await;

    let request = CheckoutRequest {
        customer_id: customer.map(|c| c.id),
        email: form.email,
        payment_method: form.payment_method,
        shipping: ShippingAddress {
            name: form.name,
            address1: form.address1,
            address2: form.address2.filter(|s| !s.trim().is_empty()),
            city: form.city,
            postcode: form.postcode,
            country: form.country,
        },
    };

    let order = match CheckoutService::new(state.pool())
        .place_order(&cart, request)
        .await
    {
        Ok(order) => order,
        Err(e) => return Ok(checkout_error_redirect(&e).into_response()),
    };

    // The cart is spent; guests can revisit the order through the session.
    cart.clear();
    if let Err(e) = save_cart(&session, &cart).await {
        tracing::error!("Failed to clear cart after checkout: {e}");
    }
    remember_tracked_order(&session, &order.number).await;

    Ok(Redirect::to(&format!("/orders/{}?placed=1", order.number)).into_response())
}

/// Map a checkout failure to a redirect the form page can explain.
fn checkout_error_redirect(error: &CheckoutError) -> Redirect {
    let code = match error {
        CheckoutError::EmptyCart => "empty_cart",
        CheckoutError::ProductUnavailable(_) => "unavailable",
        CheckoutError::UnknownPaymentMethod(_) => "payment_method",
        CheckoutError::InvalidEmail(_) => "email",
        CheckoutError::MissingField(_) => "missing",
        CheckoutError::Repository(_) => {
            tracing::error!("Checkout failed: {error}");
            "failed"
        }
    };
    Redirect::to(&format!("/checkout?error={code}"))
}
