//! Lenient field coercion for the stringly-typed delivery feed.

use chrono::NaiveDate;

/// Parse a numeric-looking field, tolerating currency and percent
/// formatting ("$1,234.56", "3.5%"). Anything unparsable coerces to 0.
pub fn to_number(raw: &str) -> f64 {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | '%'))
        .collect();
    cleaned.parse::<f64>().unwrap_or(0.0)
}

/// [`to_number`] truncated to a count. The feed formats counts with
/// thousands separators and occasionally as decimals.
pub fn to_count(raw: &str) -> i64 {
    to_number(raw) as i64
}

/// Count coercion that keeps "absent" distinct from 0: `None` for blank or
/// non-numeric fields.
pub(crate) fn to_count_opt(raw: &str) -> Option<i64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | '%'))
        .collect();
    cleaned.parse::<f64>().ok().map(|n| n as i64)
}

/// Parse a delivery date. The feed mixes `M/D/YYYY`, `M/D/YY`, and ISO
/// `YYYY-MM-DD`; the `"Totals"` summary sentinel and anything else
/// unparsable return `None`.
pub fn parse_delivery_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }
    // %Y parses "25" as the year 25 AD, not 2025.
    let format = match trimmed.rsplit('/').next() {
        Some(year) if year.trim().len() <= 2 => "%m/%d/%y",
        _ => "%m/%d/%Y",
    };
    NaiveDate::parse_from_str(trimmed, format).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_number_strips_currency_formatting() {
        assert!((to_number("$1,234.56") - 1234.56).abs() < 1e-9);
        assert!((to_number("3.5%") - 3.5).abs() < 1e-9);
        assert!((to_number(" 42 ") - 42.0).abs() < 1e-9);
        assert!((to_number("-12.5") + 12.5).abs() < 1e-9);
    }

    #[test]
    fn to_number_defaults_to_zero() {
        assert_eq!(to_number(""), 0.0);
        assert_eq!(to_number("n/a"), 0.0);
        assert_eq!(to_number("Totals"), 0.0);
    }

    #[test]
    fn to_count_truncates() {
        assert_eq!(to_count("1,234"), 1234);
        assert_eq!(to_count("12.9"), 12);
        assert_eq!(to_count("oops"), 0);
    }

    #[test]
    fn to_count_opt_keeps_absent_distinct() {
        assert_eq!(to_count_opt(""), None);
        assert_eq!(to_count_opt("n/a"), None);
        assert_eq!(to_count_opt("50,000"), Some(50_000));
    }

    #[test]
    fn parses_the_slash_date_family() {
        let expected = NaiveDate::from_ymd_opt(2025, 9, 5).expect("valid");
        assert_eq!(parse_delivery_date("9/5/2025"), Some(expected));
        assert_eq!(parse_delivery_date("09/05/2025"), Some(expected));
        assert_eq!(parse_delivery_date("9/5/25"), Some(expected));
        assert_eq!(parse_delivery_date(" 9/5/2025 "), Some(expected));
    }

    #[test]
    fn parses_iso_dates() {
        let expected = NaiveDate::from_ymd_opt(2025, 9, 5).expect("valid");
        assert_eq!(parse_delivery_date("2025-09-05"), Some(expected));
    }

    #[test]
    fn rejects_the_totals_sentinel_and_garbage() {
        assert_eq!(parse_delivery_date("Totals"), None);
        assert_eq!(parse_delivery_date(""), None);
        assert_eq!(parse_delivery_date("13/45/2025"), None);
        assert_eq!(parse_delivery_date("soon"), None);
    }
}
