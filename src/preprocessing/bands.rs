//! Parsing of ordinal band labels such as `0-17`, `55+` and `4+`

use crate::error::{FeatureError, Result};

pub(crate) const BAND_PATTERN: &str = "number[-number|+]";
pub(crate) const STAY_PATTERN: &str = "number[+]";

fn parse_number(text: &str) -> Option<u32> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// Leading numeric value of a band label.
///
/// Accepts `N`, `N-M` and `N+`. The upper bound of `N-M` must parse but is
/// otherwise ignored.
pub fn band_lower_bound(column: &str, label: &str) -> Result<u32> {
    let invalid = || FeatureError::FormatError {
        column: column.to_string(),
        value: label.to_string(),
        expected: BAND_PATTERN,
    };

    let text = label.trim();
    let lower = if let Some(open) = text.strip_suffix('+') {
        open
    } else if let Some((lower, upper)) = text.split_once('-') {
        parse_number(upper).ok_or_else(invalid)?;
        lower
    } else {
        text
    };

    parse_number(lower).ok_or_else(invalid)
}

/// Years in the current city: a number with an optional trailing `+`
pub fn stay_years(column: &str, value: &str) -> Result<i64> {
    let text = value.trim();
    let digits = text.strip_suffix('+').unwrap_or(text);
    parse_number(digits)
        .map(i64::from)
        .ok_or_else(|| FeatureError::FormatError {
            column: column.to_string(),
            value: value.to_string(),
            expected: STAY_PATTERN,
        })
}
