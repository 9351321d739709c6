//! Subscription plan and status

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Subscription plan sold through the payment gateway
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SubscriptionPlan {
    #[serde(rename = "1-month", alias = "basic")]
    OneMonth,
    #[serde(rename = "6-months", alias = "premium")]
    SixMonths,
    #[serde(rename = "1-year", alias = "enterprise")]
    OneYear,
}

impl SubscriptionPlan {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionPlan::OneMonth => "1-month",
            SubscriptionPlan::SixMonths => "6-months",
            SubscriptionPlan::OneYear => "1-year",
        }
    }

    /// Length of the paid period in calendar months
    pub fn months(&self) -> u32 {
        match self {
            SubscriptionPlan::OneMonth => 1,
            SubscriptionPlan::SixMonths => 6,
            SubscriptionPlan::OneYear => 12,
        }
    }

    /// Price handed to the payment gateway, in the gateway's amount unit
    pub fn amount(&self) -> u64 {
        match self {
            SubscriptionPlan::OneMonth => 100,
            SubscriptionPlan::SixMonths => 500,
            SubscriptionPlan::OneYear => 1000,
        }
    }
}

impl FromStr for SubscriptionPlan {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1-month" | "basic" => Ok(SubscriptionPlan::OneMonth),
            "6-months" | "premium" => Ok(SubscriptionPlan::SixMonths),
            "1-year" | "enterprise" => Ok(SubscriptionPlan::OneYear),
            other => Err(format!("Invalid plan: {other}")),
        }
    }
}

/// Subscription status as reported to clients
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Active,
    Expired,
    /// No subscription on record; never persisted
    Inactive,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Expired => "expired",
            SubscriptionStatus::Inactive => "inactive",
        }
    }
}
