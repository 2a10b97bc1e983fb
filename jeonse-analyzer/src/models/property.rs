//! Enriched property entries produced by the matcher

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Risk classification derived from the jeonse rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    /// No usable lease match, or the match looked corrupt
    Unknown,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Unknown => "unknown",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(RiskLevel::Low),
            "medium" => Ok(RiskLevel::Medium),
            "high" => Ok(RiskLevel::High),
            "unknown" => Ok(RiskLevel::Unknown),
            other => Err(format!("Unknown risk level: {}", other)),
        }
    }
}

/// Lease record paired with a sale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaseMatch {
    /// Deposit in 만원
    pub deposit: i64,
    pub deposit_formatted: String,
    pub monthly_rent: Option<i64>,
    pub deal_date: String,
    /// Heuristic score the pairing won with
    pub match_score: u32,
}

/// One sale record, its best lease match, and the derived risk view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedProperty {
    /// Display name, e.g. `래미안 (84.9㎡, 12층)`
    pub name: String,
    pub apt_name: String,
    pub address: String,
    pub dong_name: String,
    pub jibun: String,
    pub area: String,
    pub floor: String,
    pub build_year: String,
    pub deal_date: String,
    /// Sale price in 억/만원 display form
    pub price: String,
    /// Sale price in 만원
    pub price_raw: Option<i64>,
    /// Present only when the lease passed the plausibility checks
    pub lease: Option<LeaseMatch>,
    /// Deposit over sale price, percent, 2 decimals
    pub jeonse_rate: Option<f64>,
    pub risk_level: RiskLevel,
    pub risk_score: u32,
    pub warnings: Vec<String>,
    pub checklist: Vec<String>,
}

impl MatchedProperty {
    pub fn jeonse_price(&self) -> Option<i64> {
        self.lease.as_ref().map(|l| l.deposit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_level_serializes_lowercase() {
        let json = serde_json::to_string(&RiskLevel::High).unwrap();
        assert_eq!(json, "\"high\"");
    }

    #[test]
    fn test_risk_level_from_str() {
        assert_eq!("Medium".parse::<RiskLevel>().unwrap(), RiskLevel::Medium);
        assert!("severe".parse::<RiskLevel>().is_err());
    }
}
