//! Transaction records returned by the registry
//!
//! Prices are integers in 10,000-won units (만원), the unit the registry
//! publishes. Free-text fields are kept verbatim; an absent field is an
//! empty string rather than `None` so that records compare cheaply.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// District-level administrative code (LAWD_CD) used as the registry key
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdministrativeCode(String);

impl AdministrativeCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AdministrativeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AdministrativeCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

/// Year-month reporting period, rendered as `YYYYMM`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    /// Returns `None` unless `month` is in 1..=12
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Parse a 6-digit `YYYYMM` string
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.len() != 6 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let year = s[..4].parse().ok()?;
        let month = s[4..].parse().ok()?;
        Self::new(year, month)
    }

    pub fn previous(self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// Current and immediately preceding period, newest first
    pub fn rolling_window(today: NaiveDate) -> [Period; 2] {
        let current = Self::containing(today);
        [current, current.previous()]
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}{:02}", self.year, self.month)
    }
}

/// Apartment sale record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SaleTransaction {
    pub apt_name: String,
    pub dong_name: String,
    /// Lot number (지번)
    pub jibun: String,
    /// Exclusive floor area in ㎡, free text
    pub area: String,
    pub floor: String,
    pub build_year: String,
    /// `YYYY-MM-DD`, or empty when the registry omitted it
    pub deal_date: String,
    /// Sale price in 만원
    pub price: Option<i64>,
    /// Price text as published, separators included
    pub price_raw: String,
    pub region_code: String,
}

/// Apartment lease record (jeonse or monthly rent)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RentTransaction {
    pub apt_name: String,
    pub dong_name: String,
    pub jibun: String,
    pub area: String,
    pub floor: String,
    pub build_year: String,
    pub deal_date: String,
    /// Lump-sum deposit in 만원
    pub deposit: Option<i64>,
    /// Monthly rent in 만원
    pub monthly_rent: Option<i64>,
    pub region_code: String,
}

impl RentTransaction {
    /// At least one of deposit or monthly rent must be present
    pub fn is_usable(&self) -> bool {
        self.deposit.is_some() || self.monthly_rent.is_some()
    }
}
