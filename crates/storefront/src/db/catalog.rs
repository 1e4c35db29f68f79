//! Catalog repository for category and product reads.
//!
//! Every product query joins the category row so the displayed category name
//! always comes from the referenced category, never from a stored copy.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use coralcart_core::{CategoryId, Money, ProductId};

use super::RepositoryError;
use crate::models::{Category, Product};

const PRODUCT_COLUMNS: &str = r"
    p.id, p.category_id, c.name AS category_name, c.slug AS category_slug,
    p.name, p.slug, p.description, p.price, p.image_url, p.active,
    p.created_at, p.updated_at
";

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for category queries.
#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    id: i32,
    name: String,
    slug: String,
    description: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: CategoryId::new(row.id),
            name: row.name,
            slug: row.slug,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Internal row type for product queries (joined with the category).
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i32,
    category_id: i32,
    category_name: String,
    category_slug: String,
    name: String,
    slug: String,
    description: String,
    price: Decimal,
    image_url: Option<String>,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ProductId::new(row.id),
            category_id: CategoryId::new(row.category_id),
            category_name: row.category_name,
            category_slug: row.category_slug,
            name: row.name,
            slug: row.slug,
            description: row.description,
            price: Money::new(row.price),
            image_url: row.image_url,
            active: row.active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for catalog reads.
pub struct CatalogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CatalogRepository<'a> {
    /// Create a new catalog repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all categories, alphabetically.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            r"
            SELECT id, name, slug, description, created_at, updated_at
            FROM store.categories
            ORDER BY name
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get a category by its slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_category_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<Category>, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r"
            SELECT id, name, slug, description, created_at, updated_at
            FROM store.categories
            WHERE slug = $1
            ",
        )
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// List active products, newest first, optionally filtered by category.
    ///
    /// Returns the page of products and the total count of matching rows.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_active_products(
        &self,
        category_id: Option<CategoryId>,
        page: u32,
        per_page: u32,
    ) -> Result<(Vec<Product>, u64), RepositoryError> {
        let category_id = category_id.map(|c| c.as_i32());
        let offset = i64::from(page.saturating_sub(1)) * i64::from(per_page);

        let sql = format!(
            r"
            SELECT {PRODUCT_COLUMNS}
            FROM store.products p
            JOIN store.categories c ON c.id = p.category_id
            WHERE p.active AND ($1::int4 IS NULL OR p.category_id = $1)
            ORDER BY p.created_at DESC, p.id DESC
            LIMIT $2 OFFSET $3
            "
        );
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(category_id)
            .bind(i64::from(per_page))
            .bind(offset)
            .fetch_all(self.pool)
            .await?;

        let total: i64 = sqlx::query_scalar(
            r"
            SELECT COUNT(*)
            FROM store.products
            WHERE active AND ($1::int4 IS NULL OR category_id = $1)
            ",
        )
        .bind(category_id)
        .fetch_one(self.pool)
        .await?;

        Ok((
            rows.into_iter().map(Into::into).collect(),
            u64::try_from(total).unwrap_or(0),
        ))
    }

    /// Get an active product by its slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_active_product_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<Product>, RepositoryError> {
        let sql = format!(
            r"
            SELECT {PRODUCT_COLUMNS}
            FROM store.products p
            JOIN store.categories c ON c.id = p.category_id
            WHERE p.slug = $1 AND p.active
            "
        );
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(slug)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(Into::into))
    }

    /// Fetch active products by id, for pricing cart lines.
    ///
    /// Missing or inactive products are simply absent from the result; the
    /// caller decides whether that invalidates the cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_active_products_by_ids(
        &self,
        ids: &[ProductId],
    ) -> Result<Vec<Product>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let raw_ids: Vec<i32> = ids.iter().map(ProductId::as_i32).collect();
        let sql = format!(
            r"
            SELECT {PRODUCT_COLUMNS}
            FROM store.products p
            JOIN store.categories c ON c.id = p.category_id
            WHERE p.id = ANY($1) AND p.active
            "
        );
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(&raw_ids)
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Other active products from the same category, for "related" sections.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn related_products(
        &self,
        category_id: CategoryId,
        exclude: ProductId,
        limit: u32,
    ) -> Result<Vec<Product>, RepositoryError> {
        let sql = format!(
            r"
            SELECT {PRODUCT_COLUMNS}
            FROM store.products p
            JOIN store.categories c ON c.id = p.category_id
            WHERE p.category_id = $1 AND p.id <> $2 AND p.active
            ORDER BY p.created_at DESC
            LIMIT $3
            "
        );
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(category_id.as_i32())
            .bind(exclude.as_i32())
            .bind(i64::from(limit))
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Newest active products, for the home page.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn featured_products(&self, limit: u32) -> Result<Vec<Product>, RepositoryError> {
        let sql = format!(
            r"
            SELECT {PRODUCT_COLUMNS}
            FROM store.products p
            JOIN store.categories c ON c.id = p.category_id
            WHERE p.active
            ORDER BY p.created_at DESC, p.id DESC
            LIMIT $1
            "
        );
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(i64::from(limit))
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
