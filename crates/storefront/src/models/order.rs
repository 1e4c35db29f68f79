//! Order domain types.

use chrono::{DateTime, Utc};

use coralcart_core::pricing::CheckoutTotals;
use coralcart_core::{CustomerId, Email, Money, OrderId, OrderItemId, OrderStatus, ProductId};

/// Shipping address captured at checkout.
#[derive(Debug, Clone)]
pub struct ShippingAddress {
    pub name: String,
    pub address1: String,
    pub address2: Option<String>,
    pub city: String,
    pub postcode: String,
    pub country: String,
}

/// A placed order.
#[derive(Debug, Clone)]
pub struct Order {
    pub id: OrderId,
    /// Human-facing order number ("CC-1042").
    pub number: String,
    /// Owning account, absent for guest checkouts.
    pub customer_id: Option<CustomerId>,
    /// Contact email; the tracking key for guest orders.
    pub email: Email,
    pub status: OrderStatus,
    /// Id of the payment method chosen at checkout.
    pub payment_method: String,
    /// Customer-supplied payment reference (transaction hash, transfer id).
    pub payment_reference: Option<String>,
    pub shipping: ShippingAddress,
    pub totals: CheckoutTotals,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A line on a placed order.
///
/// Name and unit price are snapshots from the time of checkout; later
/// catalog edits never rewrite history.
#[derive(Debug, Clone)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub product_id: Option<ProductId>,
    pub product_name: String,
    pub unit_price: Money,
    pub quantity: u32,
}

impl OrderItem {
    /// Line total (unit price × quantity).
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.unit_price.times(self.quantity)
    }
}

/// Input for creating an order.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub customer_id: Option<CustomerId>,
    pub email: Email,
    pub payment_method: String,
    pub shipping: ShippingAddress,
    pub totals: CheckoutTotals,
    pub items: Vec<NewOrderItem>,
}

/// Input for one order line.
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub unit_price: Money,
    pub quantity: u32,
}
