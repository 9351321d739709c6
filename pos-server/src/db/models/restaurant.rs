//! Restaurant Model

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::serde_helpers;

/// Restaurant profile, keyed by tenant id (`restaurant:<tenant_id>`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Restaurant {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<RecordId>,
    pub tenant_id: String,
    pub name: String,
    #[serde(default)]
    pub outlet: Option<String>,
    pub updated_at: i64,
}

/// Profile upsert payload (PUT /api/restaurant)
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RestaurantUpsert {
    pub name: String,
    #[serde(default)]
    pub outlet: Option<String>,
}
