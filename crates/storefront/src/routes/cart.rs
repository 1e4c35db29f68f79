//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! The cart itself lives in the session; prices come from the catalog on
//! every render so the session never holds a stale price.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{AppendHeaders, Html, IntoResponse, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use coralcart_core::{Money, ProductId};

use crate::db::CatalogRepository;
use crate::error::Result;
use crate::filters;
use crate::models::{Cart, session_keys};
use crate::state::AppState;

/// Cart item display data for templates.
#[derive(Debug, Clone)]
pub struct CartItemView {
    pub product_id: i32,
    pub slug: String,
    pub name: String,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
    pub image_url: Option<String>,
}

/// Cart display data for templates.
#[derive(Debug, Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub item_count: u32,
}

impl CartView {
    /// Create an empty cart.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            subtotal: "$0.00".to_string(),
            item_count: 0,
        }
    }
}

// =============================================================================
// Session Helpers
// =============================================================================

/// Get the cart from the session, defaulting to an empty one.
pub async fn get_cart(session: &Session) -> Cart {
    session
        .get::<Cart>(session_keys::CART)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}

/// Save the cart to the session.
pub async fn save_cart(
    session: &Session,
    cart: &Cart,
) -> std::result::Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CART, cart).await
}

/// Price the cart against the live catalog.
///
/// Lines whose product has disappeared or gone inactive are skipped; callers
/// that also hold the session prune the cart with [`Cart::retain_products`].
pub async fn build_cart_view(state: &AppState, cart: &Cart) -> Result<CartView> {
    if cart.is_empty() {
        return Ok(CartView::empty());
    }

    let ids: Vec<ProductId> = cart.lines.iter().map(|l| l.product_id).collect();
    let products = CatalogRepository::new(state.pool())
        .get_active_products_by_ids(&ids)
        .await?;

    let mut items = Vec::new();
    let mut subtotal = Money::zero();
    let mut item_count = 0;

    for line in &cart.lines {
        let Some(product) = products.iter().find(|p| p.id == line.product_id) else {
            continue;
        };
        let line_price = product.price.times(line.quantity);
        subtotal += line_price;
        item_count += line.quantity;

        items.push(CartItemView {
            product_id: product.id.as_i32(),
            slug: product.slug.clone(),
            name: product.name.clone(),
            quantity: line.quantity,
            price: product.price.to_string(),
            line_price: line_price.to_string(),
            image_url: product.image_url.clone(),
        });
    }

    Ok(CartView {
        items,
        subtotal: subtotal.to_string(),
        item_count,
    })
}

// =============================================================================
// Form Types
// =============================================================================

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: i32,
    pub quantity: Option<u32>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: i32,
    pub quantity: u32,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: i32,
}

// =============================================================================
// Templates
// =============================================================================

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display cart page.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<impl IntoResponse> {
    let cart = get_cart(&session).await;
    let view = build_cart_view(&state, &cart).await?;

    Ok(CartShowTemplate { cart: view })
}

/// Add item to cart (HTMX).
///
/// Returns the cart count badge with an HTMX trigger so other fragments can
/// refresh themselves.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddToCartForm>,
) -> Response {
    let product_id = ProductId::new(form.product_id);

    // Only known, active products enter the cart.
    let exists = CatalogRepository::new(state.pool())
        .get_active_products_by_ids(&[product_id])
        .await
        .map(|products| !products.is_empty());

    match exists {
        Ok(true) => {}
        Ok(false) => {
            return (
                StatusCode::NOT_FOUND,
                Html("<span class=\"cart-error\">This product is no longer available</span>"),
            )
                .into_response();
        }
        Err(e) => {
            tracing::error!("Failed to verify product before cart add: {e}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html("<span class=\"cart-error\">Error adding to cart</span>"),
            )
                .into_response();
        }
    }

    let mut cart = get_cart(&session).await;
    cart.add(product_id, form.quantity.unwrap_or(1));

    if let Err(e) = save_cart(&session, &cart).await {
        tracing::error!("Failed to save cart to session: {e}");
    }

    (
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartCountTemplate {
            count: cart.item_count(),
        },
    )
        .into_response()
}

/// Update cart item quantity (HTMX).
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<UpdateCartForm>,
) -> Response {
    let mut cart = get_cart(&session).await;
    cart.set_quantity(ProductId::new(form.product_id), form.quantity);

    if let Err(e) = save_cart(&session, &cart).await {
        tracing::error!("Failed to save cart to session: {e}");
    }

    render_cart_items(&state, &cart).await
}

/// Remove item from cart (HTMX).
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RemoveFromCartForm>,
) -> Response {
    let mut cart = get_cart(&session).await;
    cart.remove(ProductId::new(form.product_id));

    if let Err(e) = save_cart(&session, &cart).await {
        tracing::error!("Failed to save cart to session: {e}");
    }

    render_cart_items(&state, &cart).await
}

/// Get cart count badge (HTMX).
#[instrument(skip(session))]
pub async fn count(session: Session) -> impl IntoResponse {
    let cart = get_cart(&session).await;

    CartCountTemplate {
        count: cart.item_count(),
    }
}

/// Render the cart items fragment with the cart-updated trigger.
async fn render_cart_items(state: &AppState, cart: &Cart) -> Response {
    match build_cart_view(state, cart).await {
        Ok(view) => (
            AppendHeaders([("HX-Trigger", "cart-updated")]),
            CartItemsTemplate { cart: view },
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to render cart: {e}");
            CartItemsTemplate {
                cart: CartView::empty(),
            }
            .into_response()
        }
    }
}
