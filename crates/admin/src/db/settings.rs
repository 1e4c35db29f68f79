//! Settings database operations.
//!
//! Generic JSONB key/value storage plus the typed payment-method accessors
//! built on top of it.

use serde_json::Value as JsonValue;
use sqlx::PgPool;

use coralcart_core::{
    PAYMENT_METHODS_SETTING, PaymentMethod, PaymentMethodOverride, default_payment_methods,
    merge_payment_methods,
};

/// Error type for settings operations.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Get a setting value.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub async fn get_setting(pool: &PgPool, key: &str) -> Result<Option<JsonValue>, SettingsError> {
    let result: Option<JsonValue> = sqlx::query_scalar(
        r"
        SELECT value FROM admin.settings
        WHERE key = $1
        ",
    )
    .bind(key)
    .fetch_optional(pool)
    .await?;

    Ok(result)
}

/// Set a setting value.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub async fn set_setting(pool: &PgPool, key: &str, value: &JsonValue) -> Result<(), SettingsError> {
    sqlx::query(
        r"
        INSERT INTO admin.settings (key, value)
        VALUES ($1, $2)
        ON CONFLICT (key) DO UPDATE SET value = $2, updated_at = NOW()
        ",
    )
    .bind(key)
    .bind(value)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load the saved payment-method overrides.
///
/// # Errors
///
/// Returns an error if the query fails or the stored JSON is malformed.
pub async fn load_payment_overrides(
    pool: &PgPool,
) -> Result<Vec<PaymentMethodOverride>, SettingsError> {
    match get_setting(pool, PAYMENT_METHODS_SETTING).await? {
        Some(value) => Ok(serde_json::from_value(value)?),
        None => Ok(Vec::new()),
    }
}

/// Load the merged payment-method configuration (defaults + overrides).
///
/// # Errors
///
/// Returns an error if the query fails or the stored JSON is malformed.
pub async fn load_payment_methods(pool: &PgPool) -> Result<Vec<PaymentMethod>, SettingsError> {
    let overrides = load_payment_overrides(pool).await?;
    Ok(merge_payment_methods(default_payment_methods(), &overrides))
}

/// Save one payment-method override, replacing any previous entry for the
/// same id and keeping the rest intact.
///
/// # Errors
///
/// Returns an error if the query fails or serialization fails.
pub async fn save_payment_override(
    pool: &PgPool,
    entry: PaymentMethodOverride,
) -> Result<(), SettingsError> {
    let mut overrides = load_payment_overrides(pool).await?;
    overrides.retain(|o| o.id != entry.id);
    overrides.push(entry);

    let value = serde_json::to_value(&overrides)?;
    set_setting(pool, PAYMENT_METHODS_SETTING, &value).await
}
