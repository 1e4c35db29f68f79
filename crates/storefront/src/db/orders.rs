//! Order repository: checkout writes and tracking reads.
//!
//! Order creation inserts the order row and every line in one transaction so
//! a half-written order can never be observed.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use coralcart_core::pricing::CheckoutTotals;
use coralcart_core::{CustomerId, Email, Money, OrderId, OrderItemId, OrderStatus, ProductId};

use super::RepositoryError;
use crate::models::{NewOrder, Order, OrderItem, ShippingAddress};

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

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: OrderId::new(row.id),
            number: row.number,
            customer_id: row.customer_id.map(CustomerId::new),
            email,
            status: row.status,
            payment_method: row.payment_method,
            payment_reference: row.payment_reference,
            shipping: ShippingAddress {
                name: row.shipping_name,
                address1: row.shipping_address1,
                address2: row.shipping_address2,
                city: row.shipping_city,
                postcode: row.shipping_postcode,
                country: row.shipping_country,
            },
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
    id: i32,
    product_id: Option<i32>,
    product_name: String,
    unit_price: Decimal,
    quantity: i32,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        Self {
            id: OrderItemId::new(row.id),
            product_id: row.product_id.map(ProductId::new),
            product_name: row.product_name,
            unit_price: Money::new(row.unit_price),
            quantity: u32::try_from(row.quantity).unwrap_or(0),
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create an order with its items in a single transaction.
    ///
    /// The order number is drawn from a database sequence inside the insert,
    /// so concurrent checkouts can never collide.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails; nothing is
    /// persisted in that case.
    pub async fn create(&self, new_order: &NewOrder) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            r"
            INSERT INTO store.orders (
                number, customer_id, email, payment_method,
                shipping_name, shipping_address1, shipping_address2,
                shipping_city, shipping_postcode, shipping_country,
                subtotal, shipping, tax, total
            )
            VALUES (
                'CC-' || nextval('store.order_number_seq')::text,
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13
            )
            RETURNING {ORDER_COLUMNS}
            "
        );
        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(new_order.customer_id.map(|c| c.as_i32()))
            .bind(new_order.email.as_str())
            .bind(&new_order.payment_method)
            .bind(&new_order.shipping.name)
            .bind(&new_order.shipping.address1)
            .bind(new_order.shipping.address2.as_deref())
            .bind(&new_order.shipping.city)
            .bind(&new_order.shipping.postcode)
            .bind(&new_order.shipping.country)
            .bind(new_order.totals.subtotal.amount())
            .bind(new_order.totals.shipping.amount())
            .bind(new_order.totals.tax.amount())
            .bind(new_order.totals.total.amount())
            .fetch_one(&mut *tx)
            .await?;

        for item in &new_order.items {
            sqlx::query(
                r"
                INSERT INTO store.order_items (order_id, product_id, product_name, unit_price, quantity)
                VALUES ($1, $2, $3, $4, $5)
                ",
            )
            .bind(row.id)
            .bind(item.product_id.as_i32())
            .bind(&item.product_name)
            .bind(item.unit_price.amount())
            .bind(i32::try_from(item.quantity).unwrap_or(i32::MAX))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        row.try_into()
    }

    /// Get an order with its items by order number.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored email is invalid.
    pub async fn get_with_items_by_number(
        &self,
        number: &str,
    ) -> Result<Option<(Order, Vec<OrderItem>)>, RepositoryError> {
        let sql = format!(
            r"
            SELECT {ORDER_COLUMNS}
            FROM store.orders
            WHERE number = $1
            "
        );
        let Some(row) = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(number)
            .fetch_optional(self.pool)
            .await?
        else {
            return Ok(None);
        };

        let items = self.items_for(row.id).await?;
        let order: Order = row.try_into()?;
        Ok(Some((order, items)))
    }

    /// Find an order by number and contact email, for guest tracking.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored email is invalid.
    pub async fn find_for_tracking(
        &self,
        number: &str,
        email: &Email,
    ) -> Result<Option<Order>, RepositoryError> {
        let sql = format!(
            r"
            SELECT {ORDER_COLUMNS}
            FROM store.orders
            WHERE number = $1 AND email = $2
            "
        );
        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(number)
            .bind(email.as_str())
            .fetch_optional(self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
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
    ) -> Result<Vec<Order>, RepositoryError> {
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

    /// Attach or update the payment reference while the order is still
    /// awaiting payment.
    ///
    /// Returns `true` if a row was updated. The status guard in the WHERE
    /// clause makes the update a no-op once an admin has confirmed payment.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn set_payment_reference(
        &self,
        number: &str,
        email: &Email,
        reference: &str,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE store.orders
            SET payment_reference = $3, updated_at = NOW()
            WHERE number = $1 AND email = $2 AND status = 'pending'
            ",
        )
        .bind(number)
        .bind(email.as_str())
        .bind(reference)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn items_for(&self, order_id: i32) -> Result<Vec<OrderItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderItemRow>(
            r"
            SELECT id, product_id, product_name, unit_price, quantity
            FROM store.order_items
            WHERE order_id = $1
            ORDER BY id
            ",
        )
        .bind(order_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
