//! Admin customer repository with derived spend figures.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use coralcart_core::{CustomerId, Email, Money};

use super::RepositoryError;
use crate::models::CustomerSummary;

// Derived figures live in the query, not in a stored column: total_spent is
// the sum of the customer's non-cancelled order totals at read time.
const CUSTOMER_SUMMARY_SQL: &str = r"
    SELECT c.id, c.email, c.first_name, c.last_name, c.created_at,
           COUNT(o.id) AS order_count,
           COALESCE(SUM(o.total) FILTER (WHERE o.status <> 'cancelled'), 0) AS total_spent
    FROM store.customers c
    LEFT JOIN store.orders o ON o.customer_id = c.id
";

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for customer summary queries.
#[derive(Debug, sqlx::FromRow)]
struct CustomerSummaryRow {
    id: i32,
    email: String,
    first_name: Option<String>,
    last_name: Option<String>,
    created_at: DateTime<Utc>,
    order_count: i64,
    total_spent: Decimal,
}

impl TryFrom<CustomerSummaryRow> for CustomerSummary {
    type Error = RepositoryError;

    fn try_from(row: CustomerSummaryRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: CustomerId::new(row.id),
            email,
            first_name: row.first_name,
            last_name: row.last_name,
            order_count: row.order_count,
            total_spent: Money::new(row.total_spent),
            created_at: row.created_at,
        })
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for admin customer views.
pub struct CustomerAdminRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CustomerAdminRepository<'a> {
    /// Create a new admin customer repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List customers with derived order count and spend, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored email is invalid.
    pub async fn list(&self, search: Option<&str>) -> Result<Vec<CustomerSummary>, RepositoryError> {
        let pattern = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{s}%"));

        let sql = format!(
            r"
            {CUSTOMER_SUMMARY_SQL}
            WHERE ($1::text IS NULL
                   OR c.email ILIKE $1
                   OR c.first_name ILIKE $1
                   OR c.last_name ILIKE $1)
            GROUP BY c.id
            ORDER BY c.created_at DESC
            "
        );
        let rows = sqlx::query_as::<_, CustomerSummaryRow>(&sql)
            .bind(pattern)
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get one customer with derived figures.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored email is invalid.
    pub async fn get_by_id(
        &self,
        id: CustomerId,
    ) -> Result<Option<CustomerSummary>, RepositoryError> {
        let sql = format!(
            r"
            {CUSTOMER_SUMMARY_SQL}
            WHERE c.id = $1
            GROUP BY c.id
            "
        );
        let row = sqlx::query_as::<_, CustomerSummaryRow>(&sql)
            .bind(id.as_i32())
            .fetch_optional(self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }
}
