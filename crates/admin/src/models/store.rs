//! Admin-side views of store data.
//!
//! These carry what the admin pages need alongside each entity: derived
//! spend for customers, product counts for categories, the joined category
//! name for products.

use chrono::{DateTime, Utc};

use coralcart_core::pricing::CheckoutTotals;
use coralcart_core::{
    CategoryId, CustomerId, Email, Money, OrderId, OrderStatus, ProductId,
};

/// Aggregate figures for the dashboard.
#[derive(Debug, Clone)]
pub struct DashboardMetrics {
    pub order_count: i64,
    /// Sum of non-cancelled order totals.
    pub revenue: Money,
    pub customer_count: i64,
    pub product_count: i64,
}

/// An order as managed from the admin panel.
#[derive(Debug, Clone)]
pub struct AdminOrder {
    pub id: OrderId,
    pub number: String,
    pub customer_id: Option<CustomerId>,
    pub email: Email,
    pub status: OrderStatus,
    pub payment_method: String,
    pub payment_reference: Option<String>,
    pub shipping_name: String,
    pub shipping_address: Vec<String>,
    pub totals: CheckoutTotals,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A line on an order.
#[derive(Debug, Clone)]
pub struct AdminOrderItem {
    pub product_id: Option<ProductId>,
    pub product_name: String,
    pub unit_price: Money,
    pub quantity: u32,
}

impl AdminOrderItem {
    /// Line total (unit price × quantity).
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.unit_price.times(self.quantity)
    }
}

/// A customer with derived order figures.
///
/// `total_spent` is computed at read time over non-cancelled orders, so it
/// can never disagree with the order table.
#[derive(Debug, Clone)]
pub struct CustomerSummary {
    pub id: CustomerId,
    pub email: Email,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub order_count: i64,
    pub total_spent: Money,
    pub created_at: DateTime<Utc>,
}

impl CustomerSummary {
    /// Display name for templates, falling back to the email.
    #[must_use]
    pub fn display_name(&self) -> String {
        let name = format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or(""),
            self.last_name.as_deref().unwrap_or("")
        )
        .trim()
        .to_string();

        if name.is_empty() {
            self.email.to_string()
        } else {
            name
        }
    }
}

/// A product as managed from the admin panel.
#[derive(Debug, Clone)]
pub struct ProductDetail {
    pub id: ProductId,
    pub category_id: CategoryId,
    pub category_name: String,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price: Money,
    pub image_url: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// A category with its product count.
#[derive(Debug, Clone)]
pub struct CategorySummary {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub product_count: i64,
}
