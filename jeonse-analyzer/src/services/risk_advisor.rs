//! Jeonse rate appraisal, warnings and contract checklist
//!
//! Thresholds are evaluated on the unrounded rate so that a deposit just
//! under 60% of the sale price stays `low` even though it displays as 60.0.

use crate::models::RiskLevel;
use crate::utils::format_rate;
use tracing::warn;

/// Rate at or above which risk is high
pub const HIGH_RATE: f64 = 80.0;
/// Rate at or above which the caution warning is issued
pub const CAUTION_RATE: f64 = 70.0;
/// Rate at or above which risk is medium
pub const MEDIUM_RATE: f64 = 60.0;
/// Deposits below this share of the sale price are treated as corrupt data
const MIN_DEPOSIT_RATIO: f64 = 0.01;
/// Sale prices below this (만원) trigger the below-market warning
const LOW_PRICE_MANWON: i64 = 10_000;
/// Buildings older than this many years trigger the ageing warnings
const OLD_BUILDING_YEARS: i32 = 30;

const BASELINE_CHECKLIST: [&str; 5] = [
    "등기부등본 확인",
    "건축물대장 확인",
    "임대인 신분증 확인",
    "선순위 세입자 확인",
    "집주인 세금 체납 조회",
];

/// Why no rate could be computed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unrated {
    /// No deposit to compare with
    NoLease,
    /// Sale price missing or not positive
    NoSalePrice,
    /// Deposit under 1% of the sale price
    ImplausibleDeposit,
}

/// Outcome of comparing a deposit with a sale price
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Appraisal {
    Rated {
        /// Unrounded deposit / price * 100
        raw_rate: f64,
        /// Two-decimal rounding for display and storage
        rate: f64,
        level: RiskLevel,
    },
    Unrated(Unrated),
}

impl Appraisal {
    pub fn level(&self) -> RiskLevel {
        match self {
            Appraisal::Rated { level, .. } => *level,
            Appraisal::Unrated(_) => RiskLevel::Unknown,
        }
    }

    pub fn rate(&self) -> Option<f64> {
        match self {
            Appraisal::Rated { rate, .. } => Some(*rate),
            Appraisal::Unrated(_) => None,
        }
    }

    fn raw_rate(&self) -> Option<f64> {
        match self {
            Appraisal::Rated { raw_rate, .. } => Some(*raw_rate),
            Appraisal::Unrated(_) => None,
        }
    }
}

/// Compare a deposit with a sale price (both in 만원)
pub fn appraise(sale_price: Option<i64>, deposit: Option<i64>) -> Appraisal {
    let deposit = match deposit {
        Some(d) if d > 0 => d,
        _ => return Appraisal::Unrated(Unrated::NoLease),
    };
    let price = match sale_price {
        Some(p) if p > 0 => p,
        _ => return Appraisal::Unrated(Unrated::NoSalePrice),
    };

    if (deposit as f64) < price as f64 * MIN_DEPOSIT_RATIO {
        warn!(deposit, price, "Deposit below 1% of sale price, ignoring as corrupt");
        return Appraisal::Unrated(Unrated::ImplausibleDeposit);
    }

    let raw_rate = deposit as f64 / price as f64 * 100.0;
    Appraisal::Rated {
        raw_rate,
        rate: (raw_rate * 100.0).round() / 100.0,
        level: classify(raw_rate),
    }
}

pub fn classify(rate: f64) -> RiskLevel {
    if rate >= HIGH_RATE {
        RiskLevel::High
    } else if rate >= MEDIUM_RATE {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

/// Facts about one property the advice is derived from
#[derive(Debug, Clone, Copy)]
pub struct PropertyFacts<'a> {
    pub name: &'a str,
    pub sale_price: Option<i64>,
    pub build_year: &'a str,
    pub appraisal: &'a Appraisal,
}

/// Derived advice for one property
#[derive(Debug, Clone, PartialEq)]
pub struct Advice {
    pub warnings: Vec<String>,
    pub checklist: Vec<String>,
    pub risk_score: u32,
}

/// Produces warnings and checklists against a fixed reference year
#[derive(Debug, Clone, Copy)]
pub struct RiskAdvisor {
    reference_year: i32,
}

impl RiskAdvisor {
    pub fn new(reference_year: i32) -> Self {
        Self { reference_year }
    }

    pub fn reference_year(&self) -> i32 {
        self.reference_year
    }

    pub fn advise(&self, facts: &PropertyFacts<'_>) -> Advice {
        let warnings = self.warnings(facts);
        let checklist = self.checklist(facts);
        let risk_score = risk_score(warnings.len(), facts.appraisal.raw_rate());
        Advice {
            warnings,
            checklist,
            risk_score,
        }
    }

    fn is_multi_unit(name: &str) -> bool {
        name.contains("빌라") || name.contains("오피스텔")
    }

    fn is_low_price(price: Option<i64>) -> bool {
        matches!(price, Some(p) if p > 0 && p < LOW_PRICE_MANWON)
    }

    fn is_old(&self, build_year: &str) -> bool {
        build_year
            .trim()
            .parse::<i32>()
            .map(|year| self.reference_year - year > OLD_BUILDING_YEARS)
            .unwrap_or(false)
    }

    pub fn warnings(&self, facts: &PropertyFacts<'_>) -> Vec<String> {
        let mut warnings = Vec::new();

        if Self::is_multi_unit(facts.name) {
            warnings.push("빌라/오피스텔은 아파트보다 전세사기 위험이 높을 수 있습니다.".to_string());
        }

        if let Appraisal::Rated { raw_rate, rate, .. } = facts.appraisal {
            let shown = format_rate(*rate);
            if *raw_rate >= HIGH_RATE {
                warnings.push(format!(
                    "전세가율이 {}%로 매우 높습니다. 전세사기 위험이 높을 수 있습니다.",
                    shown
                ));
            } else if *raw_rate >= CAUTION_RATE {
                warnings.push(format!("전세가율이 {}%로 높습니다. 계약 시 주의가 필요합니다.", shown));
            } else if *raw_rate >= MEDIUM_RATE {
                warnings.push(format!("전세가율이 {}%입니다. 일반적인 수준입니다.", shown));
            }
        }

        if Self::is_low_price(facts.sale_price) {
            warnings.push(
                "시세 대비 낮은 가격은 위험 신호일 수 있습니다. 주변 시세를 다시 확인하세요.".to_string(),
            );
        }

        if self.is_old(facts.build_year) {
            warnings.push("건축년도가 오래된 건물은 노후화로 인한 문제가 발생할 수 있습니다.".to_string());
        }

        warnings
    }

    pub fn checklist(&self, facts: &PropertyFacts<'_>) -> Vec<String> {
        let mut items: Vec<&str> = BASELINE_CHECKLIST.to_vec();

        match facts.appraisal.raw_rate() {
            Some(rate) if rate >= HIGH_RATE => items.extend([
                "⚠️ 전세가율이 매우 높습니다. 추가 담보 확인 필요",
                "전세금 반환 보증 보험 가입 여부 확인",
                "임대인 신용도 추가 조회",
            ]),
            Some(rate) if rate >= MEDIUM_RATE => {
                items.push("전세금 반환 보증 보험 가입 여부 확인")
            }
            _ => {}
        }

        if Self::is_multi_unit(facts.name) {
            items.extend([
                "건물 소유권 확인 (분양권/전매제한 확인)",
                "관리비 및 공용부담금 확인",
                "상가/주거 혼용 여부 확인",
                "화재보험 가입 여부 확인",
            ]);
        }

        if self.is_old(facts.build_year) {
            items.extend([
                "⚠️ 노후 건물입니다. 구조 안전 점검 필요",
                "리모델링/재건축 계획 확인",
                "배관 및 전기 시설 점검",
                "지하수 침수 이력 확인",
            ]);
        }

        if Self::is_low_price(facts.sale_price) {
            items.extend([
                "⚠️ 시세 대비 낮은 가격입니다. 추가 확인 필요",
                "은행 감정가 확인",
                "주변 유사 매물 시세 비교",
            ]);
        }

        if facts.appraisal.raw_rate().is_none() {
            items.extend([
                "⚠️ 전세 실거래 정보가 없습니다. 주변 시세 확인 필요",
                "부동산 중개사를 통한 시세 확인",
                "온라인 부동산 플랫폼 시세 비교",
            ]);
        }

        items.into_iter().map(str::to_string).collect()
    }
}

/// 20 points per warning, floored by the rate band
pub fn risk_score(warning_count: usize, raw_rate: Option<f64>) -> u32 {
    let base = (warning_count as u32).saturating_mul(20);
    match raw_rate {
        Some(rate) if rate >= HIGH_RATE => base.max(80),
        Some(rate) if rate >= MEDIUM_RATE => base.max(60),
        _ => base,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facts<'a>(name: &'a str, price: Option<i64>, year: &'a str, a: &'a Appraisal) -> PropertyFacts<'a> {
        PropertyFacts {
            name,
            sale_price: price,
            build_year: year,
            appraisal: a,
        }
    }

    #[test]
    fn test_rate_boundaries() {
        assert_eq!(appraise(Some(10_000_000), Some(8_000_000)).level(), RiskLevel::High);
        assert_eq!(appraise(Some(10_000_000), Some(8_000_000)).rate(), Some(80.0));
        assert_eq!(appraise(Some(10_000_000), Some(6_000_000)).level(), RiskLevel::Medium);
        assert_eq!(appraise(Some(10_000_000), Some(5_999_999)).level(), RiskLevel::Low);
    }

    #[test]
    fn test_rate_rounded_to_two_decimals() {
        assert_eq!(appraise(Some(30_000), Some(25_000)).rate(), Some(83.33));
    }

    #[test]
    fn test_corrupt_deposit_guard() {
        let a = appraise(Some(10_000_000), Some(50));
        assert_eq!(a, Appraisal::Unrated(Unrated::ImplausibleDeposit));
        assert_eq!(a.level(), RiskLevel::Unknown);
        assert_eq!(a.rate(), None);
    }

    #[test]
    fn test_zero_or_missing_inputs() {
        assert_eq!(appraise(Some(0), Some(5_000)), Appraisal::Unrated(Unrated::NoSalePrice));
        assert_eq!(appraise(None, Some(5_000)), Appraisal::Unrated(Unrated::NoSalePrice));
        assert_eq!(appraise(Some(10_000), None), Appraisal::Unrated(Unrated::NoLease));
        assert_eq!(appraise(Some(10_000), Some(0)), Appraisal::Unrated(Unrated::NoLease));
    }

    #[test]
    fn test_high_rate_warnings_and_checklist() {
        let advisor = RiskAdvisor::new(2025);
        let a = appraise(Some(50_000), Some(45_000));
        let advice = advisor.advise(&facts("래미안", Some(50_000), "2015", &a));

        assert_eq!(
            advice.warnings,
            vec!["전세가율이 90.0%로 매우 높습니다. 전세사기 위험이 높을 수 있습니다."]
        );
        assert_eq!(advice.checklist.len(), 8);
        assert_eq!(advice.checklist[5], "⚠️ 전세가율이 매우 높습니다. 추가 담보 확인 필요");
        assert_eq!(advice.risk_score, 80);
    }

    #[test]
    fn test_unrated_property_gets_market_checks() {
        let advisor = RiskAdvisor::new(2025);
        let a = Appraisal::Unrated(Unrated::NoLease);
        let advice = advisor.advise(&facts("은마", Some(250_000), "1979", &a));

        assert_eq!(
            advice.warnings,
            vec!["건축년도가 오래된 건물은 노후화로 인한 문제가 발생할 수 있습니다."]
        );
        assert!(advice.checklist.contains(&"부동산 중개사를 통한 시세 확인".to_string()));
        assert!(advice.checklist.contains(&"배관 및 전기 시설 점검".to_string()));
        assert_eq!(advice.risk_score, 20);
    }

    #[test]
    fn test_market_checks_come_last() {
        let advisor = RiskAdvisor::new(2025);
        let a = Appraisal::Unrated(Unrated::NoLease);
        let advice = advisor.advise(&facts("행복빌라", Some(9_000), "1980", &a));

        let tail: Vec<&str> = advice.checklist[advice.checklist.len() - 6..]
            .iter()
            .map(String::as_str)
            .collect();
        assert_eq!(
            tail,
            vec![
                "⚠️ 시세 대비 낮은 가격입니다. 추가 확인 필요",
                "은행 감정가 확인",
                "주변 유사 매물 시세 비교",
                "⚠️ 전세 실거래 정보가 없습니다. 주변 시세 확인 필요",
                "부동산 중개사를 통한 시세 확인",
                "온라인 부동산 플랫폼 시세 비교",
            ]
        );
        assert_eq!(advice.checklist.len(), 5 + 4 + 4 + 3 + 3);
    }

    #[test]
    fn test_villa_and_low_price() {
        let advisor = RiskAdvisor::new(2025);
        let a = appraise(Some(9_000), Some(6_500));
        let advice = advisor.advise(&facts("행복빌라 (40㎡, 2층)", Some(9_000), "2010", &a));

        assert_eq!(advice.warnings.len(), 3);
        assert!(advice.warnings[1].contains("72.22%로 높습니다"));
        assert_eq!(advice.risk_score, 60);
        assert!(advice.checklist.contains(&"화재보험 가입 여부 확인".to_string()));
        assert!(advice.checklist.contains(&"은행 감정가 확인".to_string()));
    }

    #[test]
    fn test_age_uses_reference_year() {
        let a = Appraisal::Unrated(Unrated::NoLease);
        let f = facts("x", None, "1995", &a);
        // 30 years is not yet old
        assert!(RiskAdvisor::new(2025).warnings(&f).is_empty());
        assert_eq!(RiskAdvisor::new(2026).warnings(&f).len(), 1);
    }

    #[test]
    fn test_just_under_sixty_stays_low() {
        let advisor = RiskAdvisor::new(2025);
        let a = appraise(Some(10_000_000), Some(5_999_999));
        let advice = advisor.advise(&facts("x", Some(10_000_000), "", &a));
        assert_eq!(a.rate(), Some(60.0));
        assert!(advice.warnings.is_empty());
        assert_eq!(advice.risk_score, 0);
    }

    #[test]
    fn test_risk_score_floors() {
        assert_eq!(risk_score(0, None), 0);
        assert_eq!(risk_score(1, Some(65.0)), 60);
        assert_eq!(risk_score(5, Some(85.0)), 100);
    }
}
