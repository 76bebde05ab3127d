//! Small string helpers shared by the scraper and the reports.

use once_cell::sync::Lazy;
use regex::Regex;

static LEADING_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([0-9]{4}-[0-9]{2}-[0-9]{2})").expect("valid date regex"));

/// Truncate a string for logging purposes.
///
/// Long strings are cut to at most `max` bytes, on a character boundary, with
/// `"…(+N bytes)"` appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…(+{} bytes)", &s[..end], s.len() - end)
}

/// The `YYYY-MM-DD` prefix of a timestamp attribute such as
/// `2024-03-05 14:22:10` or `2024-03-05T14:22:10+03:00`.
pub fn leading_date(timestamp: &str) -> Option<String> {
    LEADING_DATE
        .captures(timestamp)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_for_log_short_string() {
        let s = "Hello, world!";
        assert_eq!(truncate_for_log(s, 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_for_log_multibyte_boundary() {
        // 'ş' is two bytes; cutting at 1 must back off to 0.
        assert_eq!(truncate_for_log("şş", 1), "…(+4 bytes)");
    }

    #[test]
    fn test_leading_date() {
        assert_eq!(leading_date("2024-03-05 14:22:10").as_deref(), Some("2024-03-05"));
        assert_eq!(
            leading_date("2024-03-05T14:22:10+03:00").as_deref(),
            Some("2024-03-05")
        );
        assert_eq!(leading_date(" 2023-12-31").as_deref(), Some("2023-12-31"));
        assert_eq!(leading_date("5 Mart 2024"), None);
        assert_eq!(leading_date(""), None);
    }

    #[test]
    fn test_leading_date_rejects_non_ascii_digits() {
        // Arabic-Indic digits
        assert_eq!(leading_date("٢٠٢٤-٠٣-٠٥"), None);
        // Fullwidth digits
        assert_eq!(leading_date("２０２４-０３-０５"), None);
    }
}
