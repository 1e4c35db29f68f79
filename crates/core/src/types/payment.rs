//! Manual payment-method configuration.
//!
//! The store takes payment outside the request path (crypto transfer, bank
//! transfer, P2P apps, a hosted card link). What checkout offers is the
//! hardcoded default set with admin-saved overrides shallow-merged on top,
//! matched by id. The merged result is what both the storefront checkout and
//! the admin settings page render.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Settings key under which overrides are stored.
pub const PAYMENT_METHODS_SETTING: &str = "payment_methods";

/// The kind of manual payment channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethodKind {
    Crypto,
    BankTransfer,
    P2p,
    Card,
}

impl PaymentMethodKind {
    /// Human-readable label for templates.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Crypto => "Crypto wallet",
            Self::BankTransfer => "Bank transfer",
            Self::P2p => "P2P transfer",
            Self::Card => "Card",
        }
    }
}

/// A fully resolved payment method as offered at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethod {
    /// Stable identifier ("crypto", "bank", ...), the merge key.
    pub id: String,
    pub kind: PaymentMethodKind,
    pub label: String,
    pub enabled: bool,
    /// Shown to the customer after selecting the method.
    pub instructions: String,
    /// Channel-specific fields (wallet address, IBAN, handle, ...).
    pub details: BTreeMap<String, String>,
}

impl PaymentMethod {
    fn new(id: &str, kind: PaymentMethodKind, instructions: &str) -> Self {
        Self {
            id: id.to_string(),
            kind,
            label: kind.label().to_string(),
            enabled: false,
            instructions: instructions.to_string(),
            details: BTreeMap::new(),
        }
    }

    fn with_detail(mut self, key: &str, value: &str) -> Self {
        self.details.insert(key.to_string(), value.to_string());
        self
    }
}

/// A saved override for one payment method.
///
/// Every field is optional; absent fields fall through to the default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethodOverride {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<PaymentMethodKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<BTreeMap<String, String>>,
}

/// The built-in method set offered before any admin configuration.
///
/// Everything starts disabled; an admin enables a channel after filling in
/// its details.
#[must_use]
pub fn default_payment_methods() -> Vec<PaymentMethod> {
    vec![
        PaymentMethod::new(
            "crypto",
            PaymentMethodKind::Crypto,
            "Send the exact total to the wallet address below, then enter the transaction hash as your payment reference.",
        )
        .with_detail("network", "")
        .with_detail("address", ""),
        PaymentMethod::new(
            "bank",
            PaymentMethodKind::BankTransfer,
            "Transfer the total to the account below and quote your order number. Enter the transfer reference as your payment reference.",
        )
        .with_detail("account_name", "")
        .with_detail("iban", ""),
        PaymentMethod::new(
            "p2p",
            PaymentMethodKind::P2p,
            "Send the total to the handle below and enter the transaction ID as your payment reference.",
        )
        .with_detail("handle", ""),
        PaymentMethod::new(
            "card",
            PaymentMethodKind::Card,
            "Pay through the hosted card link below, then enter the receipt number as your payment reference.",
        )
        .with_detail("payment_link", ""),
    ]
}

/// Shallow-merge saved overrides onto the defaults, matched by id.
///
/// A present override field replaces the default wholesale (including the
/// `details` map). Overrides whose id matches no default are appended so a
/// configured method never silently disappears.
#[must_use]
pub fn merge_payment_methods(
    defaults: Vec<PaymentMethod>,
    overrides: &[PaymentMethodOverride],
) -> Vec<PaymentMethod> {
    let mut merged: Vec<PaymentMethod> = defaults
        .into_iter()
        .map(|mut method| {
            if let Some(saved) = overrides.iter().find(|o| o.id == method.id) {
                if let Some(kind) = saved.kind {
                    method.kind = kind;
                }
                if let Some(label) = &saved.label {
                    method.label = label.clone();
                }
                if let Some(enabled) = saved.enabled {
                    method.enabled = enabled;
                }
                if let Some(instructions) = &saved.instructions {
                    method.instructions = instructions.clone();
                }
                if let Some(details) = &saved.details {
                    method.details = details.clone();
                }
            }
            method
        })
        .collect();

    // Keep saved entries the default set no longer knows about.
    for saved in overrides {
        if merged.iter().any(|m| m.id == saved.id) {
            continue;
        }
        merged.push(PaymentMethod {
            id: saved.id.clone(),
            kind: saved.kind.unwrap_or(PaymentMethodKind::BankTransfer),
            label: saved
                .label
                .clone()
                .unwrap_or_else(|| saved.id.clone()),
            enabled: saved.enabled.unwrap_or(false),
            instructions: saved.instructions.clone().unwrap_or_default(),
            details: saved.details.clone().unwrap_or_default(),
        });
    }

    merged
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn override_for(id: &str) -> PaymentMethodOverride {
        PaymentMethodOverride {
            id: id.to_string(),
            ..PaymentMethodOverride::default()
        }
    }

    #[test]
    fn test_defaults_start_disabled() {
        assert!(default_payment_methods().iter().all(|m| !m.enabled));
    }

    #[test]
    fn test_saved_fields_win_over_defaults() {
        let mut saved = override_for("crypto");
        saved.enabled = Some(true);
        saved.details = Some(BTreeMap::from([
            ("network".to_string(), "Ethereum".to_string()),
            ("address".to_string(), "0xabc".to_string()),
        ]));

        let merged = merge_payment_methods(default_payment_methods(), &[saved]);
        let crypto = merged.iter().find(|m| m.id == "crypto").unwrap();
        assert!(crypto.enabled);
        assert_eq!(crypto.details.get("network").unwrap(), "Ethereum");
        // Untouched fields keep the default
        assert_eq!(crypto.label, "Crypto wallet");
    }

    #[test]
    fn test_defaults_without_overrides_pass_through() {
        let merged = merge_payment_methods(default_payment_methods(), &[]);
        assert_eq!(merged, default_payment_methods());
    }

    #[test]
    fn test_details_replace_wholesale() {
        // A present details map replaces the default map, it is not deep-merged.
        let mut saved = override_for("bank");
        saved.details = Some(BTreeMap::from([(
            "account_name".to_string(),
            "Coralcart Ltd".to_string(),
        )]));

        let merged = merge_payment_methods(default_payment_methods(), &[saved]);
        let bank = merged.iter().find(|m| m.id == "bank").unwrap();
        assert_eq!(bank.details.len(), 1);
        assert!(!bank.details.contains_key("iban"));
    }

    #[test]
    fn test_unknown_saved_ids_survive() {
        let mut saved = override_for("giftcard");
        saved.label = Some("Gift card".to_string());
        saved.enabled = Some(true);

        let merged = merge_payment_methods(default_payment_methods(), &[saved]);
        let extra = merged.iter().find(|m| m.id == "giftcard").unwrap();
        assert_eq!(extra.label, "Gift card");
        assert!(extra.enabled);
    }
}
