//! Subscription Model

use serde::{Deserialize, Serialize};
use shared::models::{SubscriptionPlan, SubscriptionStatus};
use surrealdb::RecordId;

use super::serde_helpers;

/// Subscription entity (订阅)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<RecordId>,
    pub tenant_id: String,
    pub plan: SubscriptionPlan,
    pub status: SubscriptionStatus,
    /// Unix millis
    pub start_date: i64,
    /// Unix millis
    pub end_date: i64,
    #[serde(default)]
    pub payment_order_id: Option<String>,
    #[serde(default)]
    pub payment_id: Option<String>,
    #[serde(default)]
    pub payment_signature: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Payment references recorded on activation / extension
#[derive(Debug, Clone, Default)]
pub struct PaymentRef {
    pub order_id: Option<String>,
    pub payment_id: Option<String>,
    pub signature: Option<String>,
}
