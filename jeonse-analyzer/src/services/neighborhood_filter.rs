//! Fuzzy neighbourhood matching for transaction lists
//!
//! The registry spells neighbourhoods inconsistently (`청담동`, `청담`,
//! `종로1가`), so matching tolerates a missing suffix and partial names.

use crate::models::{RentTransaction, SaleTransaction};

/// Records that carry a neighbourhood name
pub trait HasNeighborhood {
    fn neighborhood(&self) -> &str;
}

impl HasNeighborhood for SaleTransaction {
    fn neighborhood(&self) -> &str {
        &self.dong_name
    }
}

impl HasNeighborhood for RentTransaction {
    fn neighborhood(&self) -> &str {
        &self.dong_name
    }
}

const SUFFIXES: [char; 3] = ['동', '가', '리'];

fn strip_suffix(name: &str) -> &str {
    let name = name.trim();
    name.strip_suffix(SUFFIXES).unwrap_or(name).trim()
}

/// Whether a record's neighbourhood matches the wanted one
///
/// Records with an empty neighbourhood never match.
pub fn matches_neighborhood(candidate: &str, wanted: &str) -> bool {
    let candidate = candidate.trim();
    let wanted = wanted.trim();
    if candidate.is_empty() || wanted.is_empty() {
        return false;
    }

    if candidate == wanted || candidate.ends_with(wanted) {
        return true;
    }

    let wanted_stem = strip_suffix(wanted);
    if wanted_stem.is_empty() {
        return false;
    }
    let candidate_stem = strip_suffix(candidate);

    candidate_stem == wanted_stem
        || SUFFIXES
            .iter()
            .any(|s| candidate.ends_with(&format!("{}{}", wanted_stem, s)))
        || (!candidate_stem.is_empty()
            && (candidate_stem.contains(wanted_stem) || wanted_stem.contains(candidate_stem)))
}

/// Records matching `wanted`; may be empty
pub fn filter_strict<T: HasNeighborhood + Clone>(records: &[T], wanted: Option<&str>) -> Vec<T> {
    match wanted {
        None => records.to_vec(),
        Some(wanted) => records
            .iter()
            .filter(|r| matches_neighborhood(r.neighborhood(), wanted))
            .cloned()
            .collect(),
    }
}

/// Records matching `wanted`, or all of them when none match
pub fn filter_or_all<T: HasNeighborhood + Clone>(records: Vec<T>, wanted: Option<&str>) -> Vec<T> {
    let filtered = filter_strict(&records, wanted);
    if filtered.is_empty() {
        records
    } else {
        filtered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sale(dong: &str) -> SaleTransaction {
        SaleTransaction {
            dong_name: dong.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_exact_and_suffix_tolerant() {
        assert!(matches_neighborhood("청담동", "청담동"));
        assert!(matches_neighborhood("청담동", "청담"));
        assert!(matches_neighborhood("청담", "청담동"));
        assert!(matches_neighborhood("종로1가", "종로1가"));
    }

    #[test]
    fn test_containment() {
        assert!(matches_neighborhood("석촌동", "석촌"));
        assert!(matches_neighborhood("잠실본동", "잠실동"));
    }

    #[test]
    fn test_non_matches() {
        assert!(!matches_neighborhood("대치동", "청담동"));
        assert!(!matches_neighborhood("", "청담동"));
        assert!(!matches_neighborhood("청담동", ""));
    }

    #[test]
    fn test_only_trailing_suffix_is_stripped() {
        // 가양동 keeps its inner 가
        assert!(matches_neighborhood("가양동", "가양"));
        assert!(!matches_neighborhood("양평동", "가양동"));
    }

    #[test]
    fn test_filter_or_all_never_empties() {
        let records = vec![sale("대치동"), sale("역삼동")];
        let filtered = filter_or_all(records.clone(), Some("청담동"));
        assert_eq!(filtered, records);
    }

    #[test]
    fn test_filter_or_all_narrows_when_possible() {
        let records = vec![sale("대치동"), sale("역삼동"), sale("")];
        let filtered = filter_or_all(records, Some("대치동"));
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].dong_name, "대치동");
    }

    #[test]
    fn test_filter_strict_can_empty() {
        let records = vec![sale("대치동")];
        assert!(filter_strict(&records, Some("청담동")).is_empty());
        assert_eq!(filter_strict(&records, None).len(), 1);
    }
}
