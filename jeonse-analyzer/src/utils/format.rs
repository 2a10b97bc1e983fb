//! Display formatting for prices and rates

/// Format a 만원 amount as `N.N억` or `N만원`
pub fn format_price_eok(manwon: Option<i64>) -> String {
    match manwon {
        None | Some(0) => "가격 정보 없음".to_string(),
        Some(v) if v >= 10_000 => format!("{:.1}억", v as f64 / 10_000.0),
        Some(v) => format!("{}만원", v),
    }
}

/// Render a rounded rate the way users expect: `80.0`, `83.33`, `61.5`
pub fn format_rate(rate: f64) -> String {
    if rate.fract() == 0.0 {
        format!("{:.1}", rate)
    } else {
        format!("{}", rate)
    }
}
