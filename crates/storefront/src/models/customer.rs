//! Customer domain types.

use chrono::{DateTime, Utc};

use coralcart_core::{CustomerId, Email};

/// A registered customer (domain type).
#[derive(Debug, Clone)]
pub struct Customer {
    /// Unique customer ID.
    pub id: CustomerId,
    /// Customer's email address.
    pub email: Email,
    /// Optional given name.
    pub first_name: Option<String>,
    /// Optional family name.
    pub last_name: Option<String>,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    /// Display name for templates, falling back to the email local part.
    #[must_use]
    pub fn display_name(&self) -> String {
        let name = format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or(""),
            self.last_name.as_deref().unwrap_or("")
        )
        .trim()
        .to_string();

        if name.is_empty() {
            self.email.as_str().split('@').next().unwrap_or("").to_string()
        } else {
            name
        }
    }
}
