//! Admin middleware: sessions and auth extractors.

pub mod auth;
pub mod session;

pub use auth::{
    OptionalAdminAuth, RequireAdminAuth, RequireSuperAdmin, RequireWriteAdmin,
    clear_current_admin, set_current_admin,
};
pub use session::create_session_layer;
