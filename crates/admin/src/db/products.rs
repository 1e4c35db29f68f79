//! Admin product repository: full CRUD over the catalog.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use coralcart_core::{CategoryId, Money, ProductId};

use super::RepositoryError;
use crate::models::ProductDetail;

const PRODUCT_COLUMNS: &str = r"
    p.id, p.category_id, c.name AS category_name, p.name, p.slug,
    p.description, p.price, p.image_url, p.active, p.created_at
";

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for product queries (joined with the category).
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i32,
    category_id: i32,
    category_name: String,
    name: String,
    slug: String,
    description: String,
    price: Decimal,
    image_url: Option<String>,
    active: bool,
    created_at: DateTime<Utc>,
}

impl From<ProductRow> for ProductDetail {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ProductId::new(row.id),
            category_id: CategoryId::new(row.category_id),
            category_name: row.category_name,
            name: row.name,
            slug: row.slug,
            description: row.description,
            price: Money::new(row.price),
            image_url: row.image_url,
            active: row.active,
            created_at: row.created_at,
        }
    }
}

/// Input for creating or updating a product.
#[derive(Debug, Clone)]
pub struct ProductInput {
    pub category_id: CategoryId,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price: Money,
    pub image_url: Option<String>,
    pub active: bool,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for admin product operations.
pub struct ProductAdminRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductAdminRepository<'a> {
    /// Create a new admin product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all products (active and archived), newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<ProductDetail>, RepositoryError> {
        let sql = format!(
            r"
            SELECT {PRODUCT_COLUMNS}
            FROM store.products p
            JOIN store.categories c ON c.id = p.category_id
            ORDER BY p.created_at DESC, p.id DESC
            "
        );
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get a product by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<ProductDetail>, RepositoryError> {
        let sql = format!(
            r"
            SELECT {PRODUCT_COLUMNS}
            FROM store.products p
            JOIN store.categories c ON c.id = p.category_id
            WHERE p.id = $1
            "
        );
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id.as_i32())
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(Into::into))
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` for a duplicate slug,
    /// `RepositoryError::Database` for other database errors.
    pub async fn create(&self, input: &ProductInput) -> Result<ProductDetail, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            WITH inserted AS (
                INSERT INTO store.products
                    (category_id, name, slug, description, price, image_url, active)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING *
            )
            SELECT p.id, p.category_id, c.name AS category_name, p.name, p.slug,
                   p.description, p.price, p.image_url, p.active, p.created_at
            FROM inserted p
            JOIN store.categories c ON c.id = p.category_id
            ",
        )
        .bind(input.category_id.as_i32())
        .bind(&input.name)
        .bind(&input.slug)
        .bind(&input.description)
        .bind(input.price.amount())
        .bind(input.image_url.as_deref())
        .bind(input.active)
        .fetch_one(self.pool)
        .await
        .map_err(map_product_write_error)?;

        Ok(row.into())
    }

    /// Update a product in place (row-level update, no whole-table rewrite).
    ///
    /// Returns `true` if a row was updated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` for a duplicate slug,
    /// `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE store.products
            SET category_id = $2, name = $3, slug = $4, description = $5,
                price = $6, image_url = $7, active = $8, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .bind(input.category_id.as_i32())
        .bind(&input.name)
        .bind(&input.slug)
        .bind(&input.description)
        .bind(input.price.amount())
        .bind(input.image_url.as_deref())
        .bind(input.active)
        .execute(self.pool)
        .await
        .map_err(map_product_write_error)?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a product, or archive it when order lines reference it.
    ///
    /// Deleting a product that was never ordered removes the row; one that
    /// appears on an order is archived instead so history keeps its link.
    /// Returns `true` if the product was fully deleted, `false` if archived.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist,
    /// `RepositoryError::Database` if a query fails.
    pub async fn delete_or_archive(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let referenced: i64 = sqlx::query_scalar(
            r"
            SELECT COUNT(*) FROM store.order_items
            WHERE product_id = $1
            ",
        )
        .bind(id.as_i32())
        .fetch_one(self.pool)
        .await?;

        if referenced > 0 {
            let result = sqlx::query(
                r"
                UPDATE store.products
                SET active = FALSE, updated_at = NOW()
                WHERE id = $1
                ",
            )
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

            if result.rows_affected() == 0 {
                return Err(RepositoryError::NotFound);
            }
            return Ok(false);
        }

        let result = sqlx::query(
            r"
            DELETE FROM store.products
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(true)
    }
}

/// Map slug collisions to `Conflict`.
fn map_product_write_error(e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict("a product with this slug already exists".to_owned());
    }
    RepositoryError::Database(e)
}
