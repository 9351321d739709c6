//! Bill Model

use serde::{Deserialize, Serialize};
use shared::models::{BillStatus, PaymentMethod, PaymentStatus};
use surrealdb::RecordId;

use super::serde_helpers;

/// 账单行项目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LineItem {
    /// 菜品名称
    pub item: String,
    pub quantity: i64,
    /// 单价
    pub price: f64,
}

/// Bill entity (账单)
///
/// `total_amount = subtotal + tax_a + tax_b - discount_amount`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bill {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<RecordId>,
    /// 租户内单调递增的账单号，分配后不可变
    pub bill_number: i64,
    pub tenant_id: String,
    /// Key of the dining table
    pub table_id: String,
    pub table_number: i64,
    #[serde(default, deserialize_with = "serde_helpers::vec_or_empty")]
    pub items: Vec<LineItem>,
    pub subtotal: f64,
    pub tax_a: f64,
    pub tax_b: f64,
    #[serde(default)]
    pub discount_percentage: f64,
    #[serde(default)]
    pub discount_amount: f64,
    pub total_amount: f64,
    #[serde(default)]
    pub status: BillStatus,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    /// 合并自挂单的顾客标签，以 " | " 连接
    #[serde(default)]
    pub names: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Partial bill update (PATCH /api/bills/{id})
///
/// 只允许以下字段；未知字段直接拒绝
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BillPatch {
    pub items: Option<Vec<LineItem>>,
    pub discount_percentage: Option<f64>,
    pub payment_method: Option<String>,
    pub names: Option<String>,
}

/// PATCH /api/bills/{id}/payment-method
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PaymentMethodUpdate {
    pub payment_method: String,
}

/// Resolved field changes written by the repository (`MERGE`)
#[derive(Debug, Clone, Default, Serialize)]
pub struct BillChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<LineItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtotal: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_a: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_b: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_percentage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<BillStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<PaymentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub names: Option<String>,
    pub updated_at: i64,
}

/// Conjunctive list filter; timestamps are millis, `created_before` exclusive
#[derive(Debug, Clone, Default)]
pub struct BillFilter {
    pub status: Option<BillStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub created_from: Option<i64>,
    pub created_before: Option<i64>,
    pub min_amount: Option<f64>,
    pub max_amount: Option<f64>,
}

/// Summary bucket grouped by bill status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusBucket {
    pub status: BillStatus,
    pub count: i64,
    pub total_amount: f64,
    pub average_amount: f64,
}

/// Summary bucket grouped by payment method (COMPLETED bills only)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentMethodBucket {
    pub payment_method: Option<PaymentMethod>,
    pub count: i64,
    pub total_amount: f64,
}
