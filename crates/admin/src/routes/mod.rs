//! HTTP route handlers for the admin panel.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Health check
//!
//! # Dashboard
//! GET  /                       - Dashboard overview
//!
//! # Auth
//! GET  /auth/login             - Login page
//! POST /auth/login             - Login action
//! POST /auth/logout            - Logout
//!
//! # Orders
//! GET  /orders                 - Order listing (?status=, ?q=)
//! GET  /orders/{id}            - Order detail
//! POST /orders/{id}/status     - Guarded status transition
//! POST /orders/{id}/cancel     - Cancel the order
//!
//! # Customers
//! GET  /customers              - Customer listing with derived spend
//! GET  /customers/{id}         - Customer detail with order history
//!
//! # Products
//! GET  /products               - Product listing
//! GET  /products/new           - New product form
//! POST /products               - Create product
//! GET  /products/{id}/edit     - Edit product form
//! POST /products/{id}          - Update product
//! POST /products/{id}/delete   - Delete (or archive) product
//!
//! # Categories
//! GET  /categories             - Category listing + inline create form
//! POST /categories             - Create category
//! POST /categories/{id}        - Update category
//! POST /categories/{id}/delete - Delete category (rejected when populated)
//!
//! # Settings
//! GET  /settings/payments      - Payment-method configuration
//! POST /settings/payments/{id} - Save one method's override
//!
//! # Admin Users (super admin only)
//! GET  /admin-users            - List admin users
//! POST /admin-users            - Create admin user
//! POST /admin-users/{id}/delete - Remove admin user
//! ```

pub mod admin_users;
pub mod auth;
pub mod categories;
pub mod customers;
pub mod dashboard;
pub mod orders;
pub mod products;
pub mod settings;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create all routes for the admin panel.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Dashboard
        .route("/", get(dashboard::dashboard))
        // Auth
        .route("/auth/login", get(auth::login_page).post(auth::login))
        .route("/auth/logout", post(auth::logout))
        // Store management
        .nest("/orders", orders::router())
        .nest("/customers", customers::router())
        .nest("/products", products::router())
        .nest("/categories", categories::router())
        .nest("/settings", settings::router())
        // Admin users
        .nest("/admin-users", admin_users::router())
}
