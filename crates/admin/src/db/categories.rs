//! Admin category repository with the guarded delete rule.

use sqlx::PgPool;

use coralcart_core::CategoryId;

use super::RepositoryError;
use crate::models::CategorySummary;

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for category summary queries.
#[derive(Debug, sqlx::FromRow)]
struct CategorySummaryRow {
    id: i32,
    name: String,
    slug: String,
    description: String,
    product_count: i64,
}

impl From<CategorySummaryRow> for CategorySummary {
    fn from(row: CategorySummaryRow) -> Self {
        Self {
            id: CategoryId::new(row.id),
            name: row.name,
            slug: row.slug,
            description: row.description,
            product_count: row.product_count,
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for admin category operations.
pub struct CategoryAdminRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryAdminRepository<'a> {
    /// Create a new admin category repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all categories with their product counts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<CategorySummary>, RepositoryError> {
        let rows = sqlx::query_as::<_, CategorySummaryRow>(
            r"
            SELECT c.id, c.name, c.slug, c.description,
                   COUNT(p.id) AS product_count
            FROM store.categories c
            LEFT JOIN store.products p ON p.category_id = c.id
            GROUP BY c.id
            ORDER BY c.name
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Create a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` for a duplicate slug,
    /// `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        name: &str,
        slug: &str,
        description: &str,
    ) -> Result<CategorySummary, RepositoryError> {
        let row = sqlx::query_as::<_, CategorySummaryRow>(
            r"
            INSERT INTO store.categories (name, slug, description)
            VALUES ($1, $2, $3)
            RETURNING id, name, slug, description, 0::bigint AS product_count
            ",
        )
        .bind(name)
        .bind(slug)
        .bind(description)
        .fetch_one(self.pool)
        .await
        .map_err(map_category_write_error)?;

        Ok(row.into())
    }

    /// Update a category in place.
    ///
    /// Returns `true` if a row was updated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` for a duplicate slug,
    /// `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: CategoryId,
        name: &str,
        slug: &str,
        description: &str,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE store.categories
            SET name = $2, slug = $3, description = $4, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .bind(name)
        .bind(slug)
        .bind(description)
        .execute(self.pool)
        .await
        .map_err(map_category_write_error)?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a category.
    ///
    /// A category that still has products cannot be deleted. The products
    /// FK is `ON DELETE RESTRICT`, so even a racing product insert between
    /// check and delete ends as `Conflict`, never as a half-applied delete.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if products reference the category,
    /// `RepositoryError::NotFound` if it does not exist,
    /// `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: CategoryId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM store.categories
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .execute(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_foreign_key_violation()
            {
                return RepositoryError::Conflict(
                    "category still has products and cannot be deleted".to_owned(),
                );
            }
            RepositoryError::Database(e)
        })?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

/// Map slug collisions to `Conflict`.
fn map_category_write_error(e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict("a category with this slug already exists".to_owned());
    }
    RepositoryError::Database(e)
}
