//! Lenient parsing of registry field values

use chrono::NaiveDate;

/// Parse an amount such as `"125,000"` or `" 3,500 "`
///
/// Separators and whitespace are stripped; anything else unparsable is `None`.
pub fn parse_amount(raw: &str) -> Option<i64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse().ok()
}

/// First numeric token of a free-text value (`"전용 84.97㎡"` -> 84.97)
pub fn first_number(raw: &str) -> Option<f64> {
    let start = raw.find(|c: char| c.is_ascii_digit())?;
    let rest = &raw[start..];
    let mut seen_dot = false;
    let end = rest
        .char_indices()
        .find(|(_, c)| {
            if *c == '.' && !seen_dot {
                seen_dot = true;
                return false;
            }
            !c.is_ascii_digit()
        })
        .map(|(i, _)| i)
        .unwrap_or(rest.len());
    rest[..end].trim_end_matches('.').parse().ok()
}

/// Parse `YYYY-MM-DD` or `YYYYMMDD`
pub fn parse_deal_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y%m%d"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("125,000"), Some(125_000));
        assert_eq!(parse_amount("  3,500 "), Some(3_500));
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("미공개"), None);
    }

    #[test]
    fn test_first_number() {
        assert_eq!(first_number("84.97"), Some(84.97));
        assert_eq!(first_number("59.9㎡"), Some(59.9));
        assert_eq!(first_number("약 102.3.1"), Some(102.3));
        assert_eq!(first_number("85."), Some(85.0));
        assert_eq!(first_number("㎡"), None);
        assert_eq!(first_number(""), None);
    }

    #[test]
    fn test_parse_deal_date() {
        assert_eq!(parse_deal_date("2024-03-07"), NaiveDate::from_ymd_opt(2024, 3, 7));
        assert_eq!(parse_deal_date("20240307"), NaiveDate::from_ymd_opt(2024, 3, 7));
        assert_eq!(parse_deal_date("2024-3"), None);
        assert_eq!(parse_deal_date("2024-02-30"), None);
    }

    #[test]
    fn test_parse_deal_date_rejects_non_ascii() {
        assert_eq!(parse_deal_date("2024-가-01"), None);
        assert_eq!(parse_deal_date("2024가01"), None);
        assert_eq!(parse_deal_date("이천이십사년삼월"), None);
    }
}
