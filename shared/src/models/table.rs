//! Dining table enums

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Seating status of a dining table
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum TableStatus {
    #[default]
    Available,
    Occupied,
}

impl TableStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TableStatus::Available => "Available",
            TableStatus::Occupied => "Occupied",
        }
    }
}

impl FromStr for TableStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Available" => Ok(TableStatus::Available),
            "Occupied" => Ok(TableStatus::Occupied),
            other => Err(format!("Invalid table status: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_status_is_exact_match() {
        assert_eq!("Occupied".parse::<TableStatus>(), Ok(TableStatus::Occupied));
        assert!("occupied".parse::<TableStatus>().is_err());
        assert!("Reserved".parse::<TableStatus>().is_err());
        assert_eq!(
            serde_json::to_string(&TableStatus::Available).unwrap(),
            "\"Available\""
        );
    }
}
