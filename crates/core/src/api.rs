//! JSON envelopes exchanged between front ends and the storefront API.
//!
//! Every response carries an `ok` flag. Failures always have the shape
//! `{"ok": false, "error": "..."}`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::SubscriptionId;

/// `GET /api/ping` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PingResponse {
    pub ok: bool,
    pub message: String,
}

/// `POST /api/suscripciones` success response (201).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionCreated {
    pub ok: bool,
    pub subscription_id: SubscriptionId,
    #[serde(default)]
    pub message: String,
}

/// `GET /api/suscripciones` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionList {
    pub ok: bool,
    pub data: Vec<SubscriptionSummary>,
}

/// One row of the subscription listing: the subscription joined with its
/// plan and customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct SubscriptionSummary {
    pub id: SubscriptionId,
    pub created_at: DateTime<Utc>,
    /// Plan display name.
    pub plan: String,
    pub customer_name: String,
    pub customer_lastname: String,
    pub email: String,
}

/// Failure envelope for any endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub ok: bool,
    pub error: String,
}

impl ErrorResponse {
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: error.into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_created_uses_subscription_id_key() {
        let body = SubscriptionCreated {
            ok: true,
            subscription_id: SubscriptionId::new(12),
            message: "Subscription saved".to_owned(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["subscriptionId"], 12);
        assert_eq!(json["ok"], true);
    }

    #[test]
    fn test_summary_keys_are_snake_case() {
        let json = r#"{
            "id": 3,
            "created_at": "2026-10-17T12:00:00Z",
            "plan": "Standard",
            "customer_name": "A",
            "customer_lastname": "B",
            "email": "a@b.com"
        }"#;
        let row: SubscriptionSummary = serde_json::from_str(json).unwrap();
        assert_eq!(row.id, SubscriptionId::new(3));
        assert_eq!(row.plan, "Standard");
    }

    #[test]
    fn test_error_response_is_not_ok() {
        let json = serde_json::to_value(ErrorResponse::new("boom")).unwrap();
        assert_eq!(json, serde_json::json!({"ok": false, "error": "boom"}));
    }
}
