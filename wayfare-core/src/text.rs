//! Small pattern helpers shared by the parsers.
//!
//! Patterns are literals compiled at the call site; an invalid pattern simply
//! never matches.

use regex::Regex;

pub fn is_match(pattern: &str, text: &str) -> bool {
    Regex::new(pattern)
        .map(|re| re.is_match(text))
        .unwrap_or(false)
}

/// Capture group `group` of the first match of `pattern`.
pub fn capture(pattern: &str, text: &str, group: usize) -> Option<String> {
    let re = Regex::new(pattern).ok()?;
    let caps = re.captures(text)?;
    caps.get(group).map(|m| m.as_str().to_string())
}

/// All capture groups of the first match (index 0 is the whole match).
pub fn captures(pattern: &str, text: &str) -> Option<Vec<Option<String>>> {
    let re = Regex::new(pattern).ok()?;
    let caps = re.captures(text)?;
    Some(
        caps.iter()
            .map(|m| m.map(|m| m.as_str().to_string()))
            .collect(),
    )
}

pub fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse an amount such as `₹4,500` into a number.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '₹' | ',' | ' '))
        .collect();
    cleaned.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("rahul SHARMA"), "Rahul Sharma");
        assert_eq!(title_case("  asha   rao "), "Asha Rao");
    }

    #[test]
    fn test_parse_amount_strips_symbols() {
        assert_eq!(parse_amount("₹4,500"), Some(4500.0));
        assert_eq!(parse_amount("abc"), None);
    }

    #[test]
    fn test_invalid_pattern_never_matches() {
        assert!(!is_match("(", "anything"));
        assert!(capture("(", "anything", 1).is_none());
    }
}
