//! Short-lived cache for catalog reads.
//!
//! The home page and category list are read on nearly every request; a small
//! TTL cache keeps them off the database without any invalidation wiring.
//! Sixty seconds of staleness after an admin edit is acceptable here.

use std::time::Duration;

use moka::future::Cache;

use crate::models::{Category, Product};

/// Cache key for catalog reads.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Categories,
    FeaturedProducts,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Categories(Vec<Category>),
    Products(Vec<Product>),
}

/// The catalog cache type.
pub type CatalogCache = Cache<CacheKey, CacheValue>;

/// Time a cached catalog read stays valid.
const CATALOG_TTL: Duration = Duration::from_secs(60);

/// Build the catalog cache.
#[must_use]
pub fn build_catalog_cache() -> CatalogCache {
    Cache::builder()
        .max_capacity(64)
        .time_to_live(CATALOG_TTL)
        .build()
}
