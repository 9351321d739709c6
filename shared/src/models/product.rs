//! Product enums: pricing mode and out-of-stock windows

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How a product is priced
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PricingType {
    /// Single `base_price`
    #[serde(rename = "basePrice")]
    BasePrice,
    /// List price (`mrp`) plus a `selling_price` that may not exceed it
    #[serde(rename = "mrpBased", alias = "mrp")]
    MrpBased,
}

impl PricingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PricingType::BasePrice => "basePrice",
            PricingType::MrpBased => "mrpBased",
        }
    }
}

impl FromStr for PricingType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "basePrice" => Ok(PricingType::BasePrice),
            "mrpBased" | "mrp" => Ok(PricingType::MrpBased),
            other => Err(format!("Invalid pricing type: {other}")),
        }
    }
}

/// How long a product stays out of stock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StockDuration {
    TwoHours,
    SixHours,
    OneDay,
    OneWeek,
    /// Until manually restocked
    Indefinite,
}

const HOUR_MS: i64 = 60 * 60 * 1000;

impl StockDuration {
    /// Window length in milliseconds, `None` for [`StockDuration::Indefinite`]
    pub fn as_millis(&self) -> Option<i64> {
        match self {
            StockDuration::TwoHours => Some(2 * HOUR_MS),
            StockDuration::SixHours => Some(6 * HOUR_MS),
            StockDuration::OneDay => Some(24 * HOUR_MS),
            StockDuration::OneWeek => Some(7 * 24 * HOUR_MS),
            StockDuration::Indefinite => None,
        }
    }

    /// `now + window`, or `None` when the product is out of stock indefinitely
    pub fn until(&self, now_millis: i64) -> Option<i64> {
        self.as_millis().map(|ms| now_millis + ms)
    }
}

impl FromStr for StockDuration {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "2h" | "2hour" => Ok(StockDuration::TwoHours),
            "6h" | "6hour" => Ok(StockDuration::SixHours),
            "1d" | "1day" => Ok(StockDuration::OneDay),
            "1w" | "1week" => Ok(StockDuration::OneWeek),
            "indefinite" => Ok(StockDuration::Indefinite),
            other => Err(format!("Invalid duration: {other}")),
        }
    }
}

impl<'de> Deserialize<'de> for StockDuration {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pricing_type_accepts_mrp_alias() {
        let p: PricingType = serde_json::from_str("\"mrp\"").unwrap();
        assert_eq!(p, PricingType::MrpBased);
        assert_eq!(serde_json::to_string(&p).unwrap(), "\"mrpBased\"");
        assert_eq!("basePrice".parse::<PricingType>(), Ok(PricingType::BasePrice));
    }

    #[test]
    fn stock_duration_windows() {
        let now = 1_000;
        assert_eq!(
            "2h".parse::<StockDuration>().unwrap().until(now),
            Some(now + 7_200_000)
        );
        assert_eq!(
            "1week".parse::<StockDuration>().unwrap().until(now),
            Some(now + 604_800_000)
        );
        assert_eq!(StockDuration::Indefinite.until(now), None);
    }

    #[test]
    fn stock_duration_rejects_unknown() {
        assert!("3d".parse::<StockDuration>().is_err());
        assert!(serde_json::from_str::<StockDuration>("\"forever\"").is_err());
    }
}
