//! Bill and held-order enums

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Bill lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillStatus {
    #[default]
    Active,
    Completed,
}

impl BillStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillStatus::Active => "ACTIVE",
            BillStatus::Completed => "COMPLETED",
        }
    }
}

impl FromStr for BillStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ACTIVE" => Ok(BillStatus::Active),
            "COMPLETED" => Ok(BillStatus::Completed),
            other => Err(format!("Invalid bill status: {other}")),
        }
    }
}

/// Bill payment status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    #[default]
    Unpaid,
    Paid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "UNPAID",
            PaymentStatus::Paid => "PAID",
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "UNPAID" => Ok(PaymentStatus::Unpaid),
            "PAID" => Ok(PaymentStatus::Paid),
            other => Err(format!("Invalid payment status: {other}")),
        }
    }
}

/// Payment method recorded on a bill
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Cash,
    Card,
    Upi,
    #[default]
    Other,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 4] = [
        PaymentMethod::Cash,
        PaymentMethod::Card,
        PaymentMethod::Upi,
        PaymentMethod::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "CASH",
            PaymentMethod::Card => "CARD",
            PaymentMethod::Upi => "UPI",
            PaymentMethod::Other => "OTHER",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    /// Case-insensitive, so free-form hints like `"upi"` normalize to `UPI`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CASH" => Ok(PaymentMethod::Cash),
            "CARD" => Ok(PaymentMethod::Card),
            "UPI" => Ok(PaymentMethod::Upi),
            "OTHER" => Ok(PaymentMethod::Other),
            other => Err(format!("Invalid payment method: {other}")),
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Held order status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HeldOrderStatus {
    #[default]
    Hold,
    Resumed,
}

impl HeldOrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HeldOrderStatus::Hold => "HOLD",
            HeldOrderStatus::Resumed => "RESUMED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_method_parses_case_insensitively() {
        assert_eq!("upi".parse::<PaymentMethod>(), Ok(PaymentMethod::Upi));
        assert_eq!(" Cash ".parse::<PaymentMethod>(), Ok(PaymentMethod::Cash));
        assert!("cheque".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn statuses_serialize_uppercase() {
        assert_eq!(
            serde_json::to_string(&BillStatus::Completed).unwrap(),
            "\"COMPLETED\""
        );
        assert_eq!(
            serde_json::to_string(&PaymentStatus::Unpaid).unwrap(),
            "\"UNPAID\""
        );
        assert_eq!(
            serde_json::to_string(&HeldOrderStatus::Resumed).unwrap(),
            "\"RESUMED\""
        );
    }

    #[test]
    fn as_str_matches_serde() {
        for method in PaymentMethod::ALL {
            let json = serde_json::to_string(&method).unwrap();
            assert_eq!(json, format!("\"{}\"", method.as_str()));
        }
        assert_eq!("completed".parse::<BillStatus>(), Ok(BillStatus::Completed));
        assert_eq!("paid".parse::<PaymentStatus>(), Ok(PaymentStatus::Paid));
    }
}
