//! Held Order Model

use serde::{Deserialize, Serialize};
use shared::models::HeldOrderStatus;
use surrealdb::RecordId;

use super::LineItem;
use super::serde_helpers;

/// Held order entity (挂单)
///
/// 桌台上尚未结账的订单；结账时整组标记为 RESUMED
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeldOrder {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<RecordId>,
    pub tenant_id: String,
    /// Key of the dining table
    pub table_id: String,
    #[serde(default, deserialize_with = "serde_helpers::vec_or_empty")]
    pub items: Vec<LineItem>,
    pub subtotal: f64,
    pub tax_a: f64,
    pub tax_b: f64,
    #[serde(default)]
    pub discount_percentage: f64,
    /// Free-form payment hint entered at the till ("cash", "upi", ...)
    #[serde(default)]
    pub payment_mode: Option<String>,
    #[serde(default)]
    pub status: HeldOrderStatus,
    #[serde(default)]
    pub names: Option<String>,
    pub created_at: i64,
}

/// Create held order payload
///
/// 金额字段可省略，由服务端按 5% / 5% 税率计算
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HeldOrderCreate {
    pub items: Vec<LineItem>,
    pub subtotal: Option<f64>,
    pub tax_a: Option<f64>,
    pub tax_b: Option<f64>,
    pub discount_percentage: Option<f64>,
    pub payment_mode: Option<String>,
    pub names: Option<String>,
}
