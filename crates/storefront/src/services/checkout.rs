//! Checkout service.
//!
//! Turns the session cart into a placed order: re-prices every line against
//! the live catalog, validates the chosen payment method against the merged
//! configuration, computes totals, and writes the order in one transaction.

use sqlx::PgPool;
use thiserror::Error;

use coralcart_core::pricing::{CheckoutTotals, PricedLine};
use coralcart_core::{CustomerId, Email, EmailError, ProductId};

use crate::db::{CatalogRepository, OrderRepository, RepositoryError, settings};
use crate::models::{Cart, NewOrder, NewOrderItem, Order, ShippingAddress};

/// Errors that can occur while placing an order.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The cart has no lines.
    #[error("cart is empty")]
    EmptyCart,

    /// A cart line references a product that is gone or inactive.
    #[error("product {0} is no longer available")]
    ProductUnavailable(ProductId),

    /// The selected payment method is not offered.
    #[error("unknown payment method: {0}")]
    UnknownPaymentMethod(String),

    /// The contact email is malformed.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// A required shipping field is blank.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// Underlying repository error.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Input for placing an order.
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    /// Logged-in customer, if any. Guests check out by email alone.
    pub customer_id: Option<CustomerId>,
    pub email: String,
    pub payment_method: String,
    pub shipping: ShippingAddress,
}

/// Checkout service.
pub struct CheckoutService<'a> {
    pool: &'a PgPool,
}

impl<'a> CheckoutService<'a> {
    /// Create a new checkout service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Place an order for the given cart.
    ///
    /// # Errors
    ///
    /// Returns a `CheckoutError` describing the first validation failure, or
    /// `CheckoutError::Repository` if the database write fails (in which case
    /// nothing was persisted).
    pub async fn place_order(
        &self,
        cart: &Cart,
        request: CheckoutRequest,
    ) -> Result<Order, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let email = Email::parse(&request.email)?;
        validate_shipping(&request.shipping)?;

        // Only a currently enabled method is accepted, so a method disabled
        // mid-session cannot slip through.
        let methods = settings::load_enabled_payment_methods(self.pool).await?;
        if !methods.iter().any(|m| m.id == request.payment_method) {
            return Err(CheckoutError::UnknownPaymentMethod(request.payment_method));
        }

        // Re-price every line against the live catalog.
        let ids: Vec<ProductId> = cart.lines.iter().map(|l| l.product_id).collect();
        let products = CatalogRepository::new(self.pool)
            .get_active_products_by_ids(&ids)
            .await?;

        let mut items = Vec::with_capacity(cart.lines.len());
        let mut priced = Vec::with_capacity(cart.lines.len());
        for line in &cart.lines {
            let product = products
                .iter()
                .find(|p| p.id == line.product_id)
                .ok_or(CheckoutError::ProductUnavailable(line.product_id))?;

            items.push(NewOrderItem {
                product_id: product.id,
                product_name: product.name.clone(),
                unit_price: product.price,
                quantity: line.quantity,
            });
            priced.push(PricedLine::new(product.price, line.quantity));
        }

        let totals = CheckoutTotals::compute(&priced);

        let new_order = NewOrder {
            customer_id: request.customer_id,
            email,
            payment_method: request.payment_method,
            shipping: request.shipping,
            totals,
            items,
        };

        let order = OrderRepository::new(self.pool).create(&new_order).await?;

        tracing::info!(
            order_number = %order.number,
            total = %order.totals.total,
            "order placed"
        );

        Ok(order)
    }
}

/// Reject blank required shipping fields.
fn validate_shipping(shipping: &ShippingAddress) -> Result<(), CheckoutError> {
    if shipping.name.trim().is_empty() {
        return Err(CheckoutError::MissingField("name"));
    }
    if shipping.address1.trim().is_empty() {
        return Err(CheckoutError::MissingField("address"));
    }
    if shipping.city.trim().is_empty() {
        return Err(CheckoutError::MissingField("city"));
    }
    if shipping.postcode.trim().is_empty() {
        return Err(CheckoutError::MissingField("postcode"));
    }
    if shipping.country.trim().is_empty() {
        return Err(CheckoutError::MissingField("country"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address() -> ShippingAddress {
        ShippingAddress {
            name: "Ada Lovelace".to_string(),
            address1: "1 Analytical Way".to_string(),
            address2: None,
            city: "London".to_string(),
            postcode: "N1 9GU".to_string(),
            country: "GB".to_string(),
        }
    }

    #[test]
    fn test_validate_shipping_accepts_complete_address() {
        assert!(validate_shipping(&address()).is_ok());
    }

    #[test]
    fn test_validate_shipping_rejects_blank_fields() {
        let mut shipping = address();
        shipping.city = "   ".to_string();
        assert!(matches!(
            validate_shipping(&shipping),
            Err(CheckoutError::MissingField("city"))
        ));
    }
}
