//! Storefront middleware: sessions, auth extractors, rate limiting.

pub mod auth;
pub mod rate_limit;
pub mod session;

pub use auth::{OptionalAuth, RequireAuth, clear_current_customer, set_current_customer};
pub use rate_limit::auth_rate_limiter;
pub use session::create_session_layer;
