//! Admin services.

pub mod auth;

pub use auth::{AdminAuthError, AdminAuthService, hash_password};
