//! CLI input validation functions.
//!
//! These validators are used by clap's `value_parser` attribute to validate
//! user input at parse time, providing immediate feedback for invalid values.

use super::types::DueChange;
use chrono::{DateTime, NaiveDate};

/// Validate a fiber title.
///
/// Titles are single-line and may not be blank or contain control
/// characters other than tab.
pub fn validate_title(s: &str) -> Result<String, String> {
    let s = s.trim();

    if s.is_empty() {
        return Err("Title cannot be empty".to_string());
    }

    if s.contains('\n') || s.contains('\r') {
        return Err("Title cannot contain newline characters".to_string());
    }

    if let Some(pos) = s.chars().position(|c| {
        let code = c as u32;
        (code < 0x20 && code != 0x09) || (0x7F..=0x9F).contains(&code)
    }) {
        return Err(format!(
            "Title contains invalid control character at position {pos}"
        ));
    }

    Ok(s.to_string())
}

/// Validate a single tag.
pub fn validate_tag(s: &str) -> Result<String, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Tag cannot be empty".to_string());
    }
    if s.chars().any(char::is_whitespace) {
        return Err(format!("Tag cannot contain whitespace: '{s}'"));
    }
    Ok(s.to_string())
}

/// Parse a due date given as `YYYY-MM-DD`.
///
/// A full RFC 3339 timestamp is accepted as well and reduced to its date.
pub fn parse_due_date(s: &str) -> Result<NaiveDate, String> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(s).map(|dt| dt.date_naive()))
        .map_err(|_| format!("invalid due date '{s}' (use YYYY-MM-DD)"))
}

/// Parse the `--due` argument of `edit`, where an empty value clears the date.
pub fn parse_due_change(s: &str) -> Result<DueChange, String> {
    if s.trim().is_empty() {
        Ok(DueChange::Clear)
    } else {
        parse_due_date(s).map(DueChange::Set)
    }
}

/// Split comma-separated tag input: `"claim, tapestry:foo"` becomes
/// `["claim", "tapestry:foo"]`. Empty entries are dropped.
pub fn split_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    // ========== Title Tests ==========

    #[rstest]
    #[case::simple("Write the docs", "Write the docs")]
    #[case::trimmed("  padded  ", "padded")]
    #[case::tab("with\ttab", "with\ttab")]
    fn test_validate_title_accepts(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(validate_title(input).unwrap(), expected);
    }

    #[rstest]
    #[case::empty("", "cannot be empty")]
    #[case::blank("   ", "cannot be empty")]
    #[case::newline("two\nlines", "newline")]
    #[case::control("bell\u{7}", "control character")]
    fn test_validate_title_rejects(#[case] input: &str, #[case] expected: &str) {
        let err = validate_title(input).unwrap_err();
        assert!(err.contains(expected), "got: {err}");
    }

    // ========== Tag Tests ==========

    #[test]
    fn test_validate_tag() {
        assert_eq!(validate_tag(" tapestry:foo ").unwrap(), "tapestry:foo");
        assert!(validate_tag("").is_err());
        assert!(validate_tag("two words").is_err());
    }

    #[rstest]
    #[case::single("claim", vec!["claim"])]
    #[case::spaced("claim, tapestry:foo", vec!["claim", "tapestry:foo"])]
    #[case::empty_entries(",a,,b,", vec!["a", "b"])]
    #[case::blank("  ", vec![])]
    fn test_split_tags(#[case] input: &str, #[case] expected: Vec<&str>) {
        assert_eq!(split_tags(input), expected);
    }

    // ========== Due Date Tests ==========

    #[test]
    fn test_parse_due_date() {
        let expected = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        assert_eq!(parse_due_date("2026-03-14").unwrap(), expected);
        assert_eq!(parse_due_date("2026-03-14T09:00:00Z").unwrap(), expected);

        let err = parse_due_date("next tuesday").unwrap_err();
        assert!(err.contains("YYYY-MM-DD"));
    }

    #[test]
    fn test_parse_due_change() {
        assert_eq!(parse_due_change("").unwrap(), DueChange::Clear);
        assert_eq!(
            parse_due_change("2026-01-02").unwrap(),
            DueChange::Set(NaiveDate::from_ymd_opt(2026, 1, 2).unwrap())
        );
        assert!(parse_due_change("02/01/2026").is_err());
    }
}
