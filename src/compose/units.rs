//! Computed-style lengths to pixels.

use crate::{Error, Result};

/// Initial font-size context, in pixels
pub const DEFAULT_FONT_SIZE: f64 = 10.0;

/// CSS keywords that are legal values of length properties but carry no
/// length. They are not lengths and never reach [`resolve_length`] from the
/// height heuristic.
pub const LENGTH_KEYWORDS: [&str; 9] = [
    "auto",
    "normal",
    "none",
    "initial",
    "inherit",
    "unset",
    "max-content",
    "min-content",
    "fit-content",
];

pub fn is_length_keyword(value: &str) -> bool {
    let v = value.trim();
    LENGTH_KEYWORDS.iter().any(|k| v.eq_ignore_ascii_case(k))
}

/// Resolve a computed-style length to pixels.
///
/// - absent, empty or `undefined` is 0
/// - `NNpx` keeps the integer part of `NN`
/// - anything containing `em` is `NN * font_size`
/// - a bare `0` is 0
///
/// Every other form fails with [`Error::UnsupportedLengthUnit`].
pub fn resolve_length(value: Option<&str>, font_size: f64) -> Result<f64> {
    let Some(raw) = value else {
        return Ok(0.0);
    };
    let v = raw.trim();
    if v.is_empty() || v == "undefined" {
        return Ok(0.0);
    }

    let unsupported = || Error::UnsupportedLengthUnit {
        value: raw.to_string(),
    };

    if v.ends_with("px") {
        return leading_number(v).map(f64::trunc).ok_or_else(unsupported);
    }
    if v.contains("em") {
        return leading_number(v)
            .map(|n| n * font_size)
            .ok_or_else(unsupported);
    }
    if v.parse::<f64>().map(|n| n == 0.0).unwrap_or(false) {
        return Ok(0.0);
    }
    Err(unsupported())
}

/// Longest numeric prefix of `s`, parsed
fn leading_number(s: &str) -> Option<f64> {
    let end = s
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || c == '.' || ((c == '-' || c == '+') && i == 0)))
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    s[..end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_values_are_zero() {
        assert_eq!(resolve_length(None, 10.0).unwrap(), 0.0);
        assert_eq!(resolve_length(Some("undefined"), 10.0).unwrap(), 0.0);
        assert_eq!(resolve_length(Some(""), 10.0).unwrap(), 0.0);
    }

    #[test]
    fn pixels_truncate_to_integer() {
        assert_eq!(resolve_length(Some("12px"), 10.0).unwrap(), 12.0);
        assert_eq!(resolve_length(Some("12.9px"), 10.0).unwrap(), 12.0);
        assert_eq!(resolve_length(Some("-4px"), 10.0).unwrap(), -4.0);
    }

    #[test]
    fn ems_scale_with_font_size() {
        assert_eq!(resolve_length(Some("1.5em"), 10.0).unwrap(), 15.0);
        assert_eq!(resolve_length(Some("2em"), 16.0).unwrap(), 32.0);
        assert_eq!(resolve_length(Some("1rem"), 12.0).unwrap(), 12.0);
    }

    #[test]
    fn unitless_zero_is_accepted() {
        assert_eq!(resolve_length(Some("0"), 10.0).unwrap(), 0.0);
    }

    #[test]
    fn other_units_fail_loudly() {
        for bad in ["12pt", "50%", "auto", "3", "px", "em"] {
            let err = resolve_length(Some(bad), 10.0).unwrap_err();
            assert_eq!(
                err,
                Error::UnsupportedLengthUnit {
                    value: bad.to_string()
                }
            );
        }
    }

    #[test]
    fn keywords_are_recognised() {
        assert!(is_length_keyword("auto"));
        assert!(is_length_keyword(" Normal "));
        assert!(!is_length_keyword("12px"));
    }
}
