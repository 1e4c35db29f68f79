//! Integration tests for the admin panel: auth, orders, and catalog rules.
//!
//! These tests require a running admin with a migrated database and an
//! admin account matching `ADMIN_TEST_EMAIL` / `ADMIN_TEST_PASSWORD`.
//! Run with:
//!
//! ```bash
//! cargo test -p coralcart-integration-tests -- --ignored
//! ```

use reqwest::StatusCode;

use coralcart_integration_tests::TestContext;

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_pages_require_login() {
    let ctx = TestContext::from_env();

    for path in ["/", "/orders", "/customers", "/products", "/categories"] {
        let resp = ctx
            .client
            .get(ctx.admin(path))
            .send()
            .await
            .expect("request failed");
        let location = resp
            .headers()
            .get("location")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        assert_eq!(location, "/auth/login", "{path} did not require login");
    }
}

#[tokio::test]
#[ignore = "Requires running admin server and test credentials"]
async fn test_login_and_dashboard() {
    let ctx = TestContext::from_env();
    ctx.admin_login().await;

    let resp = ctx
        .client
        .get(ctx.admin("/"))
        .send()
        .await
        .expect("dashboard request failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let body = resp.text().await.expect("failed to read body");
    assert!(body.contains("Dashboard"));
    assert!(body.contains("Revenue"));
}

#[tokio::test]
#[ignore = "Requires running admin server and test credentials"]
async fn test_category_with_products_cannot_be_deleted() {
    let ctx = TestContext::from_env();
    ctx.admin_login().await;

    // Create a category and a product inside it
    let resp = ctx
        .client
        .post(ctx.admin("/categories"))
        .form(&[
            ("name", "Delete Guard"),
            ("slug", "delete-guard"),
            ("description", ""),
        ])
        .send()
        .await
        .expect("category create failed");
    assert!(resp.status().is_redirection());

    // Find the category id from the listing page
    let body = ctx
        .client
        .get(ctx.admin("/categories"))
        .send()
        .await
        .expect("categories request failed")
        .text()
        .await
        .expect("failed to read body");
    let category_id = extract_id(&body, "/categories/").expect("category id not found");

    let resp = ctx
        .client
        .post(ctx.admin("/products"))
        .form(&[
            ("category_id", category_id.as_str()),
            ("name", "Guarded Product"),
            ("price", "10.00"),
            ("active", "on"),
        ])
        .send()
        .await
        .expect("product create failed");
    assert!(resp.status().is_redirection());

    // Deleting the populated category must be rejected
    let resp = ctx
        .client
        .post(ctx.admin(&format!("/categories/{category_id}/delete")))
        .send()
        .await
        .expect("category delete failed");
    let location = resp
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(
        location.contains("error=has_products"),
        "expected rejection, got redirect to {location}"
    );
}

#[tokio::test]
#[ignore = "Requires running admin server, test credentials, and at least one pending order"]
async fn test_order_status_transitions_are_guarded() {
    let ctx = TestContext::from_env();
    ctx.admin_login().await;

    // Find a pending order
    let body = ctx
        .client
        .get(ctx.admin("/orders?status=pending"))
        .send()
        .await
        .expect("orders request failed")
        .text()
        .await
        .expect("failed to read body");
    let order_id = extract_id(&body, "/orders/").expect("no pending order found");

    // pending → shipped skips a step and must be rejected
    let resp = ctx
        .client
        .post(ctx.admin(&format!("/orders/{order_id}/status")))
        .form(&[("from_status", "pending"), ("to_status", "shipped")])
        .send()
        .await
        .expect("status request failed");
    let location = resp
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(location.contains("error=transition"));

    // pending → paid is the legal first step
    let resp = ctx
        .client
        .post(ctx.admin(&format!("/orders/{order_id}/status")))
        .form(&[("from_status", "pending"), ("to_status", "paid")])
        .send()
        .await
        .expect("status request failed");
    let location = resp
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert_eq!(location, format!("/orders/{order_id}"));

    // Replaying the same form now fails the guard (status already moved)
    let resp = ctx
        .client
        .post(ctx.admin(&format!("/orders/{order_id}/status")))
        .form(&[("from_status", "pending"), ("to_status", "paid")])
        .send()
        .await
        .expect("status request failed");
    let location = resp
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(location.contains("error=stale"));
}

/// Pull the first numeric id out of an href/action like `{prefix}123`.
fn extract_id(body: &str, prefix: &str) -> Option<String> {
    let start = body.find(prefix)? + prefix.len();
    let rest = body.get(start..)?;
    let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
    if digits.is_empty() { None } else { Some(digits) }
}
