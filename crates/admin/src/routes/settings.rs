//! Payment-method configuration routes.
//!
//! The page renders the merged configuration (defaults + saved overrides);
//! saving a method writes an override for that id only, leaving the other
//! entries untouched.

use std::collections::BTreeMap;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tracing::instrument;

use coralcart_core::{PaymentMethod, PaymentMethodOverride};

use crate::db::settings;
use crate::error::Result;
use crate::filters;
use crate::middleware::{RequireAdminAuth, RequireWriteAdmin};
use crate::state::AppState;

use super::dashboard::AdminUserView;

/// Build the settings router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/payments", get(payments_page))
        .route("/payments/{id}", post(update_method))
}

// =============================================================================
// View Types
// =============================================================================

/// Payment method view for the settings form.
#[derive(Debug, Clone)]
pub struct PaymentMethodView {
    pub id: String,
    pub label: String,
    pub enabled: bool,
    pub instructions: String,
    /// Details rendered one `key: value` pair per line for the textarea.
    pub details_text: String,
}

impl From<&PaymentMethod> for PaymentMethodView {
    fn from(method: &PaymentMethod) -> Self {
        let details_text = method
            .details
            .iter()
            .map(|(k, v)| format!("{k}: {v}"))
            .collect::<Vec<_>>()
            .join("\n");

        Self {
            id: method.id.clone(),
            label: method.label.clone(),
            enabled: method.enabled,
            instructions: method.instructions.clone(),
            details_text,
        }
    }
}

// =============================================================================
// Query / Form Types
// =============================================================================

/// Page query parameters.
#[derive(Debug, Deserialize)]
pub struct PaymentsQuery {
    pub notice: Option<String>,
}

/// Payment method form data.
#[derive(Debug, Deserialize)]
pub struct PaymentMethodForm {
    pub label: String,
    pub enabled: Option<String>,
    pub instructions: Option<String>,
    pub details: Option<String>,
}

/// Parse the details textarea, one `key: value` pair per line.
///
/// Blank lines and lines without a colon are skipped.
fn parse_details(text: &str) -> BTreeMap<String, String> {
    text.lines()
        .filter_map(|line| {
            let (key, value) = line.split_once(':')?;
            let key = key.trim();
            if key.is_empty() {
                return None;
            }
            Some((key.to_string(), value.trim().to_string()))
        })
        .collect()
}

// =============================================================================
// Templates
// =============================================================================

/// Payment settings page template.
#[derive(Template, WebTemplate)]
#[template(path = "settings/payments.html")]
pub struct PaymentsTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub methods: Vec<PaymentMethodView>,
    pub notice: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Payment settings page handler.
#[instrument(skip(admin, state))]
pub async fn payments_page(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(query): Query<PaymentsQuery>,
) -> Result<PaymentsTemplate> {
    let methods = settings::load_payment_methods(state.pool()).await?;

    Ok(PaymentsTemplate {
        admin_user: AdminUserView::from(&admin),
        current_path: "/settings/payments".to_string(),
        methods: methods.iter().map(PaymentMethodView::from).collect(),
        notice: query.notice,
    })
}

/// Save one payment method's override.
#[instrument(skip(_admin, state, form))]
pub async fn update_method(
    RequireWriteAdmin(_admin): RequireWriteAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<PaymentMethodForm>,
) -> Result<Response> {
    let entry = PaymentMethodOverride {
        id,
        kind: None,
        label: Some(form.label.trim().to_string()).filter(|s| !s.is_empty()),
        // Checkboxes submit a value only when checked
        enabled: Some(form.enabled.is_some()),
        instructions: form.instructions.map(|s| s.trim().to_string()),
        details: Some(parse_details(&form.details.unwrap_or_default())),
    };

    settings::save_payment_override(state.pool(), entry).await?;

    Ok(Redirect::to("/settings/payments?notice=saved").into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_details_pairs() {
        let parsed = parse_details("network: Bitcoin\naddress: bc1qxyz\n");
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed.get("network").map(String::as_str), Some("Bitcoin"));
        assert_eq!(parsed.get("address").map(String::as_str), Some("bc1qxyz"));
    }

    #[test]
    fn test_parse_details_skips_malformed_lines() {
        let parsed = parse_details("no colon here\n\n: empty key\nhandle: @coralcart");
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed.get("handle").map(String::as_str), Some("@coralcart"));
    }

    #[test]
    fn test_parse_details_keeps_colons_in_value() {
        let parsed = parse_details("payment_link: https://pay.example.com/cc");
        assert_eq!(
            parsed.get("payment_link").map(String::as_str),
            Some("https://pay.example.com/cc")
        );
    }
}
