//! Serde helpers for SurrealDB records
//!
//! RecordId 反序列化同时支持两种格式：
//! - 字符串格式 "table:id" (来自 API JSON)
//! - SurrealDB 原生格式 (来自数据库)

use serde::{Deserialize, Deserializer, Serializer};
use surrealdb::RecordId;

/// Deserialize bool that treats null as true
pub fn bool_true<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<bool>::deserialize(deserializer).map(|opt| opt.unwrap_or(true))
}

/// Deserialize Vec that treats null as empty
pub fn vec_or_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<Vec<T>>::deserialize(deserializer).map(|opt| opt.unwrap_or_default())
}

/// 内部辅助：同时支持字符串和原生 RecordId 格式
#[derive(Debug, Clone)]
struct FlexibleRecordId(RecordId);

impl<'de> Deserialize<'de> for FlexibleRecordId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};
        use std::fmt;

        struct FlexibleVisitor;

        impl<'de> Visitor<'de> for FlexibleVisitor {
            type Value = FlexibleRecordId;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string 'table:id' or RecordId")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                value
                    .parse::<RecordId>()
                    .map(FlexibleRecordId)
                    .map_err(|_| de::Error::custom(format!("invalid RecordId: {}", value)))
            }

            fn visit_map<M>(self, map: M) -> Result<Self::Value, M::Error>
            where
                M: de::MapAccess<'de>,
            {
                // 委托给 RecordId 原生反序列化
                RecordId::deserialize(de::value::MapAccessDeserializer::new(map))
                    .map(FlexibleRecordId)
            }
        }

        deserializer.deserialize_any(FlexibleVisitor)
    }
}

/// Option<RecordId> serialization as "table:id" string
pub mod option_record_id {
    use super::*;

    pub fn serialize<S>(id: &Option<RecordId>, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match id {
            Some(id) => s.serialize_some(&id.to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(d: D) -> Result<Option<RecordId>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<FlexibleRecordId>::deserialize(d).map(|opt| opt.map(|f| f.0))
    }
}

// =============================================================================
// ID Convention
// =============================================================================
//
// API 对外暴露 "table:key"；路径参数同时接受 "table:key" 与纯 key。
// 跨表引用 (如 held_order.table_id) 只存纯 key 字符串，
// 避免 RecordId 在 CONTENT 写入时被序列化为字符串后类型不一致。

/// Resolve a path parameter into a record of `table`
///
/// Accepts `"table:key"` (the table prefix must match) or a bare key.
/// Returns `None` for empty input or a foreign table prefix.
pub fn parse_record_id(table: &str, raw: &str) -> Option<RecordId> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.split_once(':') {
        Some((prefix, key)) if prefix == table => {
            if key.is_empty() {
                return None;
            }
            raw.parse::<RecordId>()
                .ok()
                .or_else(|| Some(RecordId::from_table_key(table, key)))
        }
        Some(_) => None,
        None => Some(RecordId::from_table_key(table, raw)),
    }
}

/// Bare key of a record id (without the table prefix and without ⟨⟩ escaping)
pub fn record_key(id: &RecordId) -> String {
    let key = id.key().to_string();
    key.strip_prefix('⟨')
        .and_then(|k| k.strip_suffix('⟩'))
        .map(str::to_string)
        .unwrap_or(key)
}
