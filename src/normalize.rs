//! Normalization of scraped portal text into stable values.
//!
//! The portal renders numbers and dates in whatever format the current
//! front-end version fancies, so everything funnels through here.

use chrono::NaiveDate;

use crate::prelude::*;

/// Tried in order; the US portal renders `%m/%d/%Y`, so it beats `%d/%m/%Y`.
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%Y", "%d/%m/%Y", "%b %d, %Y"];

/// Parses a decimal out of scraped text, dropping everything that is not a
/// digit or a decimal point: `"$1,234.56"` → `1234.56`.
pub fn decimal(raw: &str) -> Option<f64> {
    let numeric: String =
        raw.chars().filter(|char| char.is_ascii_digit() || *char == '.').collect();
    numeric.parse().ok()
}

/// Cost text with the leading currency symbol stripped, kept as a string.
pub(crate) fn currency(raw: &str) -> Option<String> {
    let value = raw.trim().trim_start_matches(['$', '€', '£']).trim_start().to_owned();
    contains_digit(&value).then_some(value)
}

/// Usage text with the trailing unit suffix discarded: `"437 kWh"` → `"437"`.
/// The unit is inferred from the category, never attached to the value.
pub(crate) fn usage(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let end = trimmed
        .find(|char: char| !(char.is_ascii_digit() || char == '.' || char == ','))
        .unwrap_or(trimmed.len());
    let value = trimmed[..end].to_owned();
    contains_digit(&value).then_some(value)
}

/// Re-emits a recognized date as canonical `YYYY-MM-DD`; an unrecognized
/// string passes through unchanged rather than being discarded.
#[must_use]
pub fn date(raw: &str) -> String {
    let trimmed = raw.trim();
    try_date(trimmed).unwrap_or_else(|| {
        debug!(raw = trimmed, "unrecognized date format, passing through");
        trimmed.to_owned()
    })
}

/// Next-meter-reading text as rendered by the dashboard, which prefixes the
/// date with a label: `"Next meter reading: Mar 14, 2026"`.
pub(crate) fn reading_date(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some((_, suffix)) = trimmed.split_once(':')
        && let Some(parsed) = try_date(suffix.trim())
    {
        return Some(parsed);
    }
    Some(date(trimmed))
}

fn try_date(raw: &str) -> Option<String> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
        .map(|date| date.format("%Y-%m-%d").to_string())
}

fn contains_digit(value: &str) -> bool {
    value.chars().any(|char| char.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_decimal_strips_currency_and_separators() {
        assert_relative_eq!(decimal("$123.45").unwrap(), 123.45);
        assert_relative_eq!(decimal("123.45").unwrap(), 123.45);
        assert_relative_eq!(decimal("1,234.56").unwrap(), 1234.56);
    }

    #[test]
    fn test_decimal_rejects_non_numeric() {
        assert!(decimal("").is_none());
        assert!(decimal("n/a").is_none());
        assert!(decimal("..").is_none());
    }

    #[test]
    fn test_currency_strips_leading_symbol_only() {
        assert_eq!(currency("$123.45").as_deref(), Some("123.45"));
        assert_eq!(currency("  $ 1,234.56 ").as_deref(), Some("1,234.56"));
        assert_eq!(currency("123.45").as_deref(), Some("123.45"));
        assert!(currency("$").is_none());
        assert!(currency("").is_none());
    }

    #[test]
    fn test_usage_discards_unit_suffix() {
        assert_eq!(usage("437 kWh").as_deref(), Some("437"));
        assert_eq!(usage("56 therms").as_deref(), Some("56"));
        assert_eq!(usage("1,234.5 kWh").as_deref(), Some("1,234.5"));
        assert!(usage("kWh").is_none());
    }

    #[test]
    fn test_date_canonicalizes_known_formats() {
        assert_eq!(date("2024-03-01"), "2024-03-01");
        assert_eq!(date("03/01/2024"), "2024-03-01");
        assert_eq!(date("Mar 01, 2024"), "2024-03-01");
        assert_eq!(date("25/12/2024"), "2024-12-25");
    }

    #[test]
    fn test_date_passes_through_unparseable_text() {
        assert_eq!(date("next month"), "next month");
    }

    #[test]
    fn test_reading_date_strips_label() {
        assert_eq!(
            reading_date("Next meter reading: Mar 14, 2026").as_deref(),
            Some("2026-03-14"),
        );
        assert_eq!(reading_date("03/01/2024").as_deref(), Some("2024-03-01"));
        assert_eq!(reading_date("next month").as_deref(), Some("next month"));
        assert!(reading_date("   ").is_none());
    }
}
