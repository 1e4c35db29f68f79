//! Session-related types for customer authentication.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use coralcart_core::{CustomerId, Email};

/// Session-stored customer identity.
///
/// Minimal data stored in the session to identify the logged-in customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentCustomer {
    /// Customer's database ID.
    pub id: CustomerId,
    /// Customer's email address.
    pub email: Email,
    /// Customer's given name, if provided.
    pub first_name: Option<String>,
    /// Customer's family name, if provided.
    pub last_name: Option<String>,
}

/// Session keys for storefront session data.
pub mod session_keys {
    /// Key for storing the current logged-in customer.
    pub const CURRENT_CUSTOMER: &str = "current_customer";

    /// Key for the session cart.
    pub const CART: &str = "cart";

    /// Key remembering emails this session has used to track guest orders.
    pub const TRACKED_ORDERS: &str = "tracked_orders";
}
