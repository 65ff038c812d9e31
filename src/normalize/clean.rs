//! Per-cell cleanup: null sentinels and whole-float suffixes.

use once_cell::sync::Lazy;
use regex::Regex;

/// Textual stand-ins for "no value" that are scrubbed to the empty string.
pub const NULL_SENTINELS: [&str; 7] = ["nan", "None", "NaN", "NaT", "<NA>", "NULL", "null"];

static WHOLE_FLOAT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.0$").expect("valid regex"));

/// Whether `value` is exactly one of [`NULL_SENTINELS`].
pub fn is_null_sentinel(value: &str) -> bool {
    NULL_SENTINELS.contains(&value)
}

/// Drop the `.0` from a whole number that went through a float ("123.0").
///
/// Anything else comes back unchanged.
pub fn strip_float_suffix(value: &str) -> &str {
    if WHOLE_FLOAT.is_match(value) {
        &value[..value.len() - 2]
    } else {
        value
    }
}

/// Clean one already-stringified cell.
pub fn clean_cell(value: &str) -> String {
    if is_null_sentinel(value) {
        return String::new();
    }
    strip_float_suffix(value).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinels_become_empty() {
        for token in NULL_SENTINELS {
            assert_eq!(clean_cell(token), "", "token {token}");
        }
    }

    #[test]
    fn test_sentinels_match_whole_cell_only() {
        assert_eq!(clean_cell("nano"), "nano");
        assert_eq!(clean_cell(" null"), " null");
        assert_eq!(clean_cell("NA"), "NA");
        assert_eq!(clean_cell("Null"), "Null");
    }

    #[test]
    fn test_whole_float_suffix() {
        assert_eq!(clean_cell("123.0"), "123");
        assert_eq!(clean_cell("0.0"), "0");
        assert_eq!(clean_cell("7.0"), "7");
    }

    #[test]
    fn test_other_numbers_untouched() {
        assert_eq!(clean_cell("123.45"), "123.45");
        assert_eq!(clean_cell("1.50"), "1.50");
        assert_eq!(clean_cell("123.00"), "123.00");
        assert_eq!(clean_cell("-7.0"), "-7.0");
        assert_eq!(clean_cell(".0"), ".0");
        assert_eq!(clean_cell("abc.0"), "abc.0");
        assert_eq!(clean_cell("1.0.0"), "1.0.0");
        assert_eq!(clean_cell("10.05"), "10.05");
    }

    #[test]
    fn test_empty_stays_empty() {
        assert_eq!(clean_cell(""), "");
    }
}
