//! Integration tests for Coralcart.
//!
//! # Running Tests
//!
//! ```bash
//! # Start PostgreSQL, run migrations, seed, and start both binaries:
//! cargo run -p coralcart-cli -- migrate
//! cargo run -p coralcart-cli -- seed
//! cargo run -p coralcart-storefront &
//! cargo run -p coralcart-admin &
//!
//! # Then run the (otherwise ignored) integration tests:
//! cargo test -p coralcart-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_BASE_URL` - storefront under test (default: `http://localhost:3000`)
//! - `ADMIN_BASE_URL` - admin under test (default: `http://localhost:3001`)
//! - `ADMIN_TEST_EMAIL` / `ADMIN_TEST_PASSWORD` - credentials for admin flows

use reqwest::Client;

/// Shared context for driving the running servers.
pub struct TestContext {
    pub client: Client,
    pub storefront_url: String,
    pub admin_url: String,
}

impl TestContext {
    /// Build a context from environment variables.
    ///
    /// The client keeps cookies so session flows (cart, login) work across
    /// requests, and never follows redirects so tests can assert on them.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be constructed.
    #[must_use]
    pub fn from_env() -> Self {
        let client = Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            storefront_url: std::env::var("STOREFRONT_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            admin_url: std::env::var("ADMIN_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3001".to_string()),
        }
    }

    /// Storefront URL for a path.
    #[must_use]
    pub fn storefront(&self, path: &str) -> String {
        format!("{}{path}", self.storefront_url)
    }

    /// Admin URL for a path.
    #[must_use]
    pub fn admin(&self, path: &str) -> String {
        format!("{}{path}", self.admin_url)
    }

    /// Log into the admin with the configured test credentials.
    ///
    /// # Panics
    ///
    /// Panics if the credentials are missing or the login request fails.
    pub async fn admin_login(&self) {
        let email = std::env::var("ADMIN_TEST_EMAIL").expect("ADMIN_TEST_EMAIL not set");
        let password = std::env::var("ADMIN_TEST_PASSWORD").expect("ADMIN_TEST_PASSWORD not set");

        let resp = self
            .client
            .post(self.admin("/auth/login"))
            .form(&[("email", email.as_str()), ("password", password.as_str())])
            .send()
            .await
            .expect("Admin login request failed");

        // Successful login redirects to the dashboard
        assert!(resp.status().is_redirection(), "admin login did not redirect");
        let location = resp
            .headers()
            .get("location")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        assert_eq!(location, "/", "admin login redirected to {location}");
    }
}
