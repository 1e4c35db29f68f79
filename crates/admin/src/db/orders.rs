//! Admin order repository: listing, detail, and guarded status transitions.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use coralcart_core::pricing::CheckoutTotals;
use coralcart_core::{CustomerId, Email, Money, OrderId, OrderStatus, ProductId};

use super::RepositoryError;
use crate::models::{AdminOrder, AdminOrderItem, DashboardMetrics};

const ORDER_COLUMNS: &str = r"
    id, number, customer_id, email, status, payment_method, payment_reference,
    shipping_name, shipping_address1, shipping_address2, shipping_city,
    shipping_postcode, shipping_country, subtotal, shipping, tax, total,
    created_at, updated_at
";

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for order queries.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i32,
    number: String,
    customer_id: Option<i32>,
    email: String,
    status: OrderStatus,
    payment_method: String,
    payment_reference: Option<String>,
    shipping_name: String,
    shipping_address1: String,
    shipping_address2: Option<String>,
    shipping_city: String,
    shipping_postcode: String,
    shipping_country: String,
    subtotal: Decimal,
    shipping: Decimal,
    tax: Decimal,
    total: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for AdminOrder {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        let mut shipping_address = vec![row.shipping_address1];
        if let Some(address2) = row.shipping_address2 {
            shipping_address.push(address2);
        }
        shipping_address.push(format!("{} {}", row.shipping_postcode, row.shipping_city));
        shipping_address.push(row.shipping_country);

        Ok(Self {
            id: OrderId::new(row.id),
            number: row.number,
            customer_id: row.customer_id.map(CustomerId::new),
            email,
            status: row.status,
            payment_method: row.payment_method,
            payment_reference: row.payment_reference,
            shipping_name: row.shipping_name,
            shipping_address,
            totals: CheckoutTotals {
                subtotal: Money::new(row.subtotal),
                shipping: Money::new(row.shipping),
                tax: Money::new(row.tax),
                total: Money::new(row.total),
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Internal row type for order item queries.
#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    product_id: Option<i32>,
    product_name: String,
    unit_price: Decimal,
    quantity: i32,
}

impl From<OrderItemRow> for AdminOrderItem {
    fn from(row: OrderItemRow) -> Self {
        Self {
            product_id: row.product_id.map(ProductId::new),
            product_name: row.product_name,
            unit_price: Money::new(row.unit_price),
            quantity: u32::try_from(row.quantity).unwrap_or(0),
        }
    }
}

/// Internal row type for the dashboard metrics query.
#[derive(Debug, sqlx::FromRow)]
struct MetricsRow {
    order_count: i64,
    revenue: Decimal,
    customer_count: i64,
    product_count: i64,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for admin order operations.
pub struct OrderAdminRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderAdminRepository<'a> {
    /// Create a new admin order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List orders, newest first, with optional status filter and
    /// number/email search.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored email is invalid.
    pub async fn list(
        &self,
        status: Option<OrderStatus>,
        search: Option<&str>,
        limit: u32,
    ) -> Result<Vec<AdminOrder>, RepositoryError> {
        let pattern = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{s}%"));

        let sql = format!(
            r"
            SELECT {ORDER_COLUMNS}
            FROM store.orders
            WHERE ($1::store.order_status IS NULL OR status = $1)
              AND ($2::text IS NULL OR number ILIKE $2 OR email ILIKE $2)
            ORDER BY created_at DESC
            LIMIT $3
            "
        );
        let rows = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(status)
            .bind(pattern)
            .bind(i64::from(limit))
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get an order with its items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored email is invalid.
    pub async fn get_with_items(
        &self,
        id: OrderId,
    ) -> Result<Option<(AdminOrder, Vec<AdminOrderItem>)>, RepositoryError> {
        let sql = format!(
            r"
            SELECT {ORDER_COLUMNS}
            FROM store.orders
            WHERE id = $1
            "
        );
        let Some(row) = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(id.as_i32())
            .fetch_optional(self.pool)
            .await?
        else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, OrderItemRow>(
            r"
            SELECT product_id, product_name, unit_price, quantity
            FROM store.order_items
            WHERE order_id = $1
            ORDER BY id
            ",
        )
        .bind(row.id)
        .fetch_all(self.pool)
        .await?;

        let order: AdminOrder = row.try_into()?;
        Ok(Some((order, items.into_iter().map(Into::into).collect())))
    }

    /// Apply a status transition, guarded against concurrent edits.
    ///
    /// The transition is validated against the order state machine, then
    /// applied with `WHERE id = $1 AND status = <from>` so that two admins
    /// acting on the same order cannot clobber each other: whoever loses the
    /// race sees `false` and re-reads.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the state machine forbids the
    /// transition, `RepositoryError::Database` if the query fails.
    pub async fn transition_status(
        &self,
        id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<bool, RepositoryError> {
        if !from.can_transition_to(to) {
            return Err(RepositoryError::Conflict(format!(
                "cannot move order from {from} to {to}"
            )));
        }

        let result = sqlx::query(
            r"
            UPDATE store.orders
            SET status = $3, updated_at = NOW()
            WHERE id = $1 AND status = $2
            ",
        )
        .bind(id.as_i32())
        .bind(from)
        .bind(to)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Aggregate figures for the dashboard.
    ///
    /// Revenue is the sum of non-cancelled order totals, computed in SQL so
    /// it always matches the order table.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn metrics(&self) -> Result<DashboardMetrics, RepositoryError> {
        let row = sqlx::query_as::<_, MetricsRow>(
            r"
            SELECT
                (SELECT COUNT(*) FROM store.orders) AS order_count,
                (SELECT COALESCE(SUM(total), 0) FROM store.orders
                 WHERE status <> 'cancelled') AS revenue,
                (SELECT COUNT(*) FROM store.customers) AS customer_count,
                (SELECT COUNT(*) FROM store.products) AS product_count
            ",
        )
        .fetch_one(self.pool)
        .await?;

        Ok(DashboardMetrics {
            order_count: row.order_count,
            revenue: Money::new(row.revenue),
            customer_count: row.customer_count,
            product_count: row.product_count,
        })
    }

    /// Most recent orders, for the dashboard.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored email is invalid.
    pub async fn recent(&self, limit: u32) -> Result<Vec<AdminOrder>, RepositoryError> {
        self.list(None, None, limit).await
    }

    /// List a customer's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored email is invalid.
    pub async fn list_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<AdminOrder>, RepositoryError> {
        let sql = format!(
            r"
            SELECT {ORDER_COLUMNS}
            FROM store.orders
            WHERE customer_id = $1
            ORDER BY created_at DESC
            "
        );
        let rows = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(customer_id.as_i32())
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}
