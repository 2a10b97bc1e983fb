//! Sale to lease pairing
//!
//! Leases are grouped by (apartment, neighbourhood) and each sale is scored
//! against the leases of its own building only. Output follows sale order.

use std::collections::HashMap;

use super::risk_advisor::{appraise, Appraisal, PropertyFacts, RiskAdvisor};
use crate::models::{LeaseMatch, MatchedProperty, RentTransaction, SaleTransaction};
use crate::utils::{first_number, format_price_eok, parse_deal_date};

/// Leases further than this from the sale do not win tie-breaks
const TIE_BREAK_WINDOW_DAYS: i64 = 180;

/// Heuristic agreement between a sale and a lease of the same building
pub fn match_score(sale: &SaleTransaction, rent: &RentTransaction) -> u32 {
    let mut score = 0;

    match (sale.jibun.is_empty(), rent.jibun.is_empty()) {
        (false, false) if sale.jibun == rent.jibun => score += 3,
        (true, true) => score += 1,
        _ => {}
    }

    if let (Some(a), Some(b)) = (first_number(&sale.area), first_number(&rent.area)) {
        let diff = (a - b).abs();
        if diff < 1.0 {
            score += 2;
        } else if diff < 5.0 {
            score += 1;
        }
    }

    if !sale.floor.is_empty() && sale.floor == rent.floor {
        score += 1;
    }

    score
}

/// Whether `candidate` should replace `current` on an equal score
///
/// A lease within the window of the sale beats one outside it; among leases
/// inside the window the most recent wins. Without dates the first seen
/// lease is kept.
fn wins_tie(sale: &SaleTransaction, candidate: &RentTransaction, current: &RentTransaction) -> bool {
    let Some(sale_date) = parse_deal_date(&sale.deal_date) else {
        return false;
    };
    let Some(candidate_date) = parse_deal_date(&candidate.deal_date) else {
        return false;
    };
    if (candidate_date - sale_date).num_days().abs() > TIE_BREAK_WINDOW_DAYS {
        return false;
    }

    match parse_deal_date(&current.deal_date) {
        None => true,
        Some(current_date) => {
            let current_in_window =
                (current_date - sale_date).num_days().abs() <= TIE_BREAK_WINDOW_DAYS;
            !current_in_window || candidate_date > current_date
        }
    }
}

/// Best lease for a sale among same-building candidates
///
/// Candidates without a positive deposit are ignored; a best score of zero
/// is no match.
pub fn best_lease<'a>(
    sale: &SaleTransaction,
    candidates: &[&'a RentTransaction],
) -> Option<(&'a RentTransaction, u32)> {
    let mut best: Option<(&'a RentTransaction, u32)> = None;

    for rent in candidates.iter().copied() {
        if !matches!(rent.deposit, Some(d) if d > 0) {
            continue;
        }
        let score = match_score(sale, rent);
        best = match best {
            None if score > 0 => Some((rent, score)),
            Some((_, best_score)) if score > best_score => Some((rent, score)),
            Some((current, best_score)) if score == best_score && wins_tie(sale, rent, current) => {
                Some((rent, score))
            }
            other => other,
        };
    }

    best
}

/// Pairs sales with leases and derives the risk view of each
#[derive(Debug, Clone, Copy)]
pub struct PropertyMatcher {
    advisor: RiskAdvisor,
}

impl PropertyMatcher {
    pub fn new(advisor: RiskAdvisor) -> Self {
        Self { advisor }
    }

    /// One entry per sale, in sale order
    ///
    /// `region` prefixes the assembled address.
    pub fn match_properties(
        &self,
        region: &str,
        sales: &[SaleTransaction],
        rents: &[RentTransaction],
    ) -> Vec<MatchedProperty> {
        let mut by_building: HashMap<(&str, &str), Vec<&RentTransaction>> = HashMap::new();
        for rent in rents {
            by_building
                .entry((rent.apt_name.as_str(), rent.dong_name.as_str()))
                .or_default()
                .push(rent);
        }

        sales
            .iter()
            .map(|sale| {
                let candidates = by_building
                    .get(&(sale.apt_name.as_str(), sale.dong_name.as_str()))
                    .map(Vec::as_slice)
                    .unwrap_or(&[]);
                let best = best_lease(sale, candidates);
                self.build_property(region, sale, best)
            })
            .collect()
    }

    fn build_property(
        &self,
        region: &str,
        sale: &SaleTransaction,
        best: Option<(&RentTransaction, u32)>,
    ) -> MatchedProperty {
        let name = if !sale.area.is_empty() && !sale.floor.is_empty() {
            format!("{} ({}㎡, {}층)", sale.apt_name, sale.area, sale.floor)
        } else {
            sale.apt_name.clone()
        };

        let appraisal = appraise(sale.price, best.and_then(|(rent, _)| rent.deposit));
        let lease = match (&appraisal, best) {
            (Appraisal::Rated { .. }, Some((rent, score))) => rent.deposit.map(|deposit| LeaseMatch {
                deposit,
                deposit_formatted: format_price_eok(Some(deposit)),
                monthly_rent: rent.monthly_rent,
                deal_date: rent.deal_date.clone(),
                match_score: score,
            }),
            _ => None,
        };

        let advice = self.advisor.advise(&PropertyFacts {
            name: &name,
            sale_price: sale.price,
            build_year: &sale.build_year,
            appraisal: &appraisal,
        });

        let price = if sale.price.is_some() || sale.price_raw.is_empty() {
            format_price_eok(sale.price)
        } else {
            sale.price_raw.clone()
        };

        MatchedProperty {
            address: format!("{} {} {}", region, sale.dong_name, sale.jibun)
                .trim()
                .to_string(),
            name,
            apt_name: sale.apt_name.clone(),
            dong_name: sale.dong_name.clone(),
            jibun: sale.jibun.clone(),
            area: sale.area.clone(),
            floor: sale.floor.clone(),
            build_year: sale.build_year.clone(),
            deal_date: sale.deal_date.clone(),
            price,
            price_raw: sale.price,
            lease,
            jeonse_rate: appraisal.rate(),
            risk_level: appraisal.level(),
            risk_score: advice.risk_score,
            warnings: advice.warnings,
            checklist: advice.checklist,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RiskLevel;

    fn sale(jibun: &str, area: &str, floor: &str, price: i64, date: &str) -> SaleTransaction {
        SaleTransaction {
            apt_name: "은마".to_string(),
            dong_name: "대치동".to_string(),
            jibun: jibun.to_string(),
            area: area.to_string(),
            floor: floor.to_string(),
            build_year: "2010".to_string(),
            deal_date: date.to_string(),
            price: Some(price),
            price_raw: price.to_string(),
            region_code: "11680".to_string(),
        }
    }

    fn rent(jibun: &str, area: &str, floor: &str, deposit: i64, date: &str) -> RentTransaction {
        RentTransaction {
            apt_name: "은마".to_string(),
            dong_name: "대치동".to_string(),
            jibun: jibun.to_string(),
            area: area.to_string(),
            floor: floor.to_string(),
            build_year: "2010".to_string(),
            deal_date: date.to_string(),
            deposit: Some(deposit),
            monthly_rent: Some(0),
            region_code: "11680".to_string(),
        }
    }

    fn matcher() -> PropertyMatcher {
        PropertyMatcher::new(RiskAdvisor::new(2025))
    }

    #[test]
    fn test_match_score_components() {
        let s = sale("316", "84.9", "5", 100_000, "");
        assert_eq!(match_score(&s, &rent("316", "84.5", "5", 1, "")), 6);
        assert_eq!(match_score(&s, &rent("316", "81.0", "7", 1, "")), 4);
        assert_eq!(match_score(&s, &rent("999", "60", "7", 1, "")), 0);
        assert_eq!(match_score(&s, &rent("", "84.9", "", 1, "")), 2);

        let no_jibun = sale("", "", "", 1, "");
        assert_eq!(match_score(&no_jibun, &rent("", "", "", 1, "")), 1);
    }

    #[test]
    fn test_strictly_higher_score_wins() {
        let s = sale("316", "84.9", "5", 100_000, "2024-03-01");
        let weak = rent("316", "60", "9", 50_000, "2024-03-02");
        let strong = rent("316", "84.9", "5", 70_000, "2023-01-01");
        let best = best_lease(&s, &[&weak, &strong]).unwrap();
        assert_eq!(best.0.deposit, Some(70_000));
        assert_eq!(best.1, 6);
    }

    #[test]
    fn test_tie_prefers_recent_lease_in_window() {
        let s = sale("316", "84.9", "5", 100_000, "2024-03-01");
        let older = rent("316", "84.9", "5", 60_000, "2024-01-10");
        let newer = rent("316", "84.9", "5", 65_000, "2024-02-20");
        let outside = rent("316", "84.9", "5", 90_000, "2025-03-01");

        let best = best_lease(&s, &[&older, &newer, &outside]).unwrap();
        assert_eq!(best.0.deposit, Some(65_000));
    }

    #[test]
    fn test_tie_in_window_beats_first_seen_outside() {
        let s = sale("316", "84.9", "5", 100_000, "2024-03-01");
        let far = rent("316", "84.9", "5", 60_000, "2022-01-01");
        let near = rent("316", "84.9", "5", 65_000, "2024-01-01");
        let best = best_lease(&s, &[&far, &near]).unwrap();
        assert_eq!(best.0.deposit, Some(65_000));
    }

    #[test]
    fn test_tie_without_dates_keeps_first() {
        let s = sale("316", "84.9", "5", 100_000, "");
        let first = rent("316", "84.9", "5", 60_000, "2024-01-10");
        let second = rent("316", "84.9", "5", 65_000, "2024-02-20");
        let best = best_lease(&s, &[&first, &second]).unwrap();
        assert_eq!(best.0.deposit, Some(60_000));
    }

    #[test]
    fn test_tie_with_malformed_dates_keeps_first() {
        let s = sale("316", "84.9", "5", 100_000, "2024-가-01");
        let first = rent("316", "84.9", "5", 60_000, "2024-01-10");
        let second = rent("316", "84.9", "5", 65_000, "2024-나-20");
        let best = best_lease(&s, &[&first, &second]).unwrap();
        assert_eq!(best.0.deposit, Some(60_000));

        let properties = matcher().match_properties("대치동", &[s], &[first, second]);
        assert_eq!(properties.len(), 1);
        assert_eq!(properties[0].jeonse_price(), Some(60_000));
    }

    #[test]
    fn test_zero_score_is_no_match() {
        let s = sale("316", "84.9", "5", 100_000, "");
        let unrelated = rent("999", "30", "1", 60_000, "");
        assert!(best_lease(&s, &[&unrelated]).is_none());
    }

    #[test]
    fn test_leases_without_deposit_are_skipped() {
        let s = sale("316", "84.9", "5", 100_000, "");
        let mut monthly = rent("316", "84.9", "5", 0, "");
        monthly.deposit = None;
        assert!(best_lease(&s, &[&monthly]).is_none());
    }

    #[test]
    fn test_match_properties_end_to_end() {
        let sales = vec![
            sale("316", "84.9", "5", 100_000, "2024-03-01"),
            SaleTransaction {
                apt_name: "래미안".to_string(),
                ..sale("1", "59", "3", 150_000, "2024-03-02")
            },
        ];
        let rents = vec![rent("316", "84.9", "5", 85_000, "2024-02-01")];

        let props = matcher().match_properties("강남구", &sales, &rents);
        assert_eq!(props.len(), 2);

        let first = &props[0];
        assert_eq!(first.name, "은마 (84.9㎡, 5층)");
        assert_eq!(first.address, "강남구 대치동 316");
        assert_eq!(first.price, "10.0억");
        assert_eq!(first.jeonse_rate, Some(85.0));
        assert_eq!(first.risk_level, RiskLevel::High);
        assert_eq!(first.jeonse_price(), Some(85_000));
        assert_eq!(first.lease.as_ref().unwrap().deposit_formatted, "8.5억");

        let second = &props[1];
        assert_eq!(second.risk_level, RiskLevel::Unknown);
        assert!(second.lease.is_none());
        assert_eq!(second.jeonse_rate, None);
    }

    #[test]
    fn test_corrupt_lease_drops_rate() {
        let sales = vec![sale("316", "84.9", "5", 10_000_000, "")];
        let rents = vec![rent("316", "84.9", "5", 50, "")];
        let props = matcher().match_properties("강남구", &sales, &rents);
        assert_eq!(props[0].risk_level, RiskLevel::Unknown);
        assert_eq!(props[0].jeonse_rate, None);
        assert!(props[0].lease.is_none());
    }

    #[test]
    fn test_matching_is_deterministic() {
        let sales = vec![
            sale("316", "84.9", "5", 100_000, "2024-03-01"),
            sale("316", "76.8", "2", 90_000, "2024-03-09"),
        ];
        let rents = vec![
            rent("316", "84.9", "5", 60_000, "2024-01-10"),
            rent("316", "76.8", "2", 65_000, "2024-02-20"),
            rent("316", "84.9", "5", 70_000, "2024-02-25"),
        ];
        let m = matcher();
        assert_eq!(
            m.match_properties("강남구", &sales, &rents),
            m.match_properties("강남구", &sales, &rents)
        );
    }

    #[test]
    fn test_unparsed_price_shows_raw_text() {
        let mut s = sale("316", "", "", 1, "");
        s.price = None;
        s.price_raw = "비공개".to_string();
        let props = matcher().match_properties("강남구", &[s], &[]);
        assert_eq!(props[0].price, "비공개");
        assert_eq!(props[0].name, "은마");
    }
}
