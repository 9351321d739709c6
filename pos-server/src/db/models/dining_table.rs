//! Dining Table Model

use serde::{Deserialize, Serialize};
use shared::models::TableStatus;
use surrealdb::RecordId;

use super::serde_helpers;

/// Dining table entity (桌台)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiningTable {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<RecordId>,
    pub tenant_id: String,
    /// 租户内唯一
    pub table_number: i64,
    #[serde(default)]
    pub status: TableStatus,
    pub created_at: i64,
}

/// Create dining table payload
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DiningTableCreate {
    pub table_number: i64,
}

/// Bulk create payload: numbers `[base_number, base_number + quantity - 1]`
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DiningTableBulkCreate {
    pub base_number: i64,
    pub quantity: i64,
}

/// Status update payload
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DiningTableStatusUpdate {
    pub status: String,
}
