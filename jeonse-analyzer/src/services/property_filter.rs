//! Consumer-side filtering of analysed properties

use serde::Deserialize;

use super::risk_advisor::{HIGH_RATE, MEDIUM_RATE};
use crate::models::{MatchedProperty, RiskLevel};

/// Optional criteria for narrowing an analysis result
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PropertyFilter {
    /// Lower sale price bound in 억
    pub min_price_eok: Option<f64>,
    /// Upper sale price bound in 억
    pub max_price_eok: Option<f64>,
    /// Substring of the display name, e.g. `오피스텔`
    pub property_type: Option<String>,
    pub risk_level: Option<RiskLevel>,
}

impl PropertyFilter {
    pub fn is_empty(&self) -> bool {
        self.min_price_eok.is_none()
            && self.max_price_eok.is_none()
            && self.property_type.as_deref().map_or(true, str::is_empty)
            && self.risk_level.is_none()
    }

    pub fn matches(&self, property: &MatchedProperty) -> bool {
        self.price_in_range(property)
            && self.type_matches(property)
            && self.risk_matches(property)
    }

    pub fn apply(&self, properties: Vec<MatchedProperty>) -> Vec<MatchedProperty> {
        properties.into_iter().filter(|p| self.matches(p)).collect()
    }

    /// Records without a price are never excluded by price
    fn price_in_range(&self, property: &MatchedProperty) -> bool {
        let Some(price) = property.price_raw.filter(|p| *p != 0) else {
            return true;
        };
        let eok = price as f64 / 10_000.0;
        self.min_price_eok.map_or(true, |min| eok >= min)
            && self.max_price_eok.map_or(true, |max| eok <= max)
    }

    fn type_matches(&self, property: &MatchedProperty) -> bool {
        match self.property_type.as_deref() {
            None | Some("") => true,
            Some(kind) => property.name.contains(kind),
        }
    }

    /// Bands on risk score, cross-checked against the rate when known
    fn risk_matches(&self, property: &MatchedProperty) -> bool {
        let score = property.risk_score;
        let rate = property.jeonse_rate;
        match self.risk_level {
            None | Some(RiskLevel::Unknown) => true,
            Some(RiskLevel::Low) => score < 40 && !rate.is_some_and(|r| r >= MEDIUM_RATE),
            Some(RiskLevel::Medium) => {
                (20..60).contains(&score)
                    && !rate.is_some_and(|r| !(MEDIUM_RATE..HIGH_RATE).contains(&r))
            }
            Some(RiskLevel::High) => score >= 60 || rate.is_some_and(|r| r >= HIGH_RATE),
        }
    }
}
