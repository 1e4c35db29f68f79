//! Read-only access to the payment-method configuration.
//!
//! The admin binary owns the `admin.settings` table; the storefront only
//! reads the saved overrides and merges them onto the built-in defaults.

use serde_json::Value as JsonValue;
use sqlx::PgPool;

use coralcart_core::{
    PAYMENT_METHODS_SETTING, PaymentMethod, PaymentMethodOverride, default_payment_methods,
    merge_payment_methods,
};

use super::RepositoryError;

/// Load the merged payment-method configuration.
///
/// A missing settings row means no admin has configured anything yet, which
/// resolves to the (all-disabled) defaults.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
/// Returns `RepositoryError::DataCorruption` if the stored JSON does not
/// deserialize as payment-method overrides.
pub async fn load_payment_methods(pool: &PgPool) -> Result<Vec<PaymentMethod>, RepositoryError> {
    let saved: Option<JsonValue> = sqlx::query_scalar(
        r"
        SELECT value FROM admin.settings
        WHERE key = $1
        ",
    )
    .bind(PAYMENT_METHODS_SETTING)
    .fetch_optional(pool)
    .await?;

    let overrides: Vec<PaymentMethodOverride> = match saved {
        Some(value) => serde_json::from_value(value).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid payment method settings: {e}"))
        })?,
        None => Vec::new(),
    };

    Ok(merge_payment_methods(default_payment_methods(), &overrides))
}

/// Load only the enabled payment methods, in configured order.
///
/// # Errors
///
/// Same as [`load_payment_methods`].
pub async fn load_enabled_payment_methods(
    pool: &PgPool,
) -> Result<Vec<PaymentMethod>, RepositoryError> {
    let methods = load_payment_methods(pool).await?;
    Ok(methods.into_iter().filter(|m| m.enabled).collect())
}
