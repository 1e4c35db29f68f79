//! Catalog domain types.

use chrono::{DateTime, Utc};

use coralcart_core::{CategoryId, Money, ProductId};

/// A product category.
#[derive(Debug, Clone)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A product, always carried together with its category name.
///
/// The category name is resolved by join at query time, so the displayed
/// category can never drift from the referenced row.
#[derive(Debug, Clone)]
pub struct Product {
    pub id: ProductId,
    pub category_id: CategoryId,
    pub category_name: String,
    pub category_slug: String,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price: Money,
    pub image_url: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
