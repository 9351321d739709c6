//! Product Model

use serde::{Deserialize, Serialize};
use shared::models::PricingType;
use surrealdb::RecordId;

use super::serde_helpers;

/// 商品规格 (如 "Half" / "Full")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProductVariant {
    pub name: String,
    #[serde(default)]
    pub price: Option<f64>,
}

/// Product entity (菜品)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<RecordId>,
    pub tenant_id: String,
    pub category: String,
    pub item_name: String,
    pub pricing_type: PricingType,
    #[serde(default)]
    pub base_price: Option<f64>,
    #[serde(default)]
    pub mrp: Option<f64>,
    #[serde(default)]
    pub selling_price: Option<f64>,
    #[serde(rename = "type")]
    pub product_type: String,
    pub unit_type: String,
    #[serde(default, deserialize_with = "serde_helpers::vec_or_empty")]
    pub variants: Vec<ProductVariant>,
    #[serde(default)]
    pub image_url: Option<String>,
    /// Object storage key of `image_url`
    #[serde(default)]
    pub image_key: Option<String>,
    #[serde(default = "default_true", deserialize_with = "serde_helpers::bool_true")]
    pub in_stock: bool,
    /// Unix millis; while in the future the product is unavailable
    #[serde(default)]
    pub out_of_stock_until: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

fn default_true() -> bool {
    true
}

impl Product {
    /// 当前是否可售
    ///
    /// A set `out_of_stock_until` decides alone: available once it has lapsed.
    /// Without a window the `in_stock` flag decides.
    pub fn is_available_at(&self, now_millis: i64) -> bool {
        match self.out_of_stock_until {
            Some(until) => until <= now_millis,
            None => self.in_stock,
        }
    }
}

/// Validated create payload (built from the multipart form)
#[derive(Debug, Clone)]
pub struct ProductCreate {
    pub category: String,
    pub item_name: String,
    pub pricing_type: PricingType,
    pub base_price: Option<f64>,
    pub mrp: Option<f64>,
    pub selling_price: Option<f64>,
    pub product_type: String,
    pub unit_type: String,
    pub variants: Vec<ProductVariant>,
}

/// Partial product update (`MERGE`)
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProductUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pricing_type: Option<PricingType>,
    /// `Some(None)` writes null (the field belongs to the other pricing type)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_price: Option<Option<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mrp: Option<Option<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selling_price: Option<Option<f64>>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub product_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variants: Option<Vec<ProductVariant>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_key: Option<String>,
    pub updated_at: i64,
}

/// Stock update payload (PATCH /api/products/{id}/stock)
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StockUpdate {
    pub in_stock: bool,
    #[serde(default)]
    pub duration: Option<String>,
}

/// Public menu projection; no tenant, stock or storage fields
#[derive(Debug, Clone, Serialize)]
pub struct PublicMenuItem {
    pub id: String,
    pub category: String,
    pub item_name: String,
    pub pricing_type: PricingType,
    #[serde(rename = "type")]
    pub product_type: String,
    pub unit_type: String,
    pub variants: Vec<ProductVariant>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mrp: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selling_price: Option<f64>,
}

impl From<Product> for PublicMenuItem {
    fn from(p: Product) -> Self {
        Self {
            id: p.id.map(|id| id.to_string()).unwrap_or_default(),
            category: p.category,
            item_name: p.item_name,
            pricing_type: p.pricing_type,
            product_type: p.product_type,
            unit_type: p.unit_type,
            variants: p.variants,
            image_url: p.image_url,
            base_price: p.base_price,
            mrp: p.mrp,
            selling_price: p.selling_price,
        }
    }
}
