//! Natural-language date extraction.
//!
//! Recognises ISO dates, `DD/MM/YYYY` and `DD-MM-YYYY`, `today`, `tomorrow`
//! and `[this|next] <weekday>`. Anything else yields `None`.

use chrono::{Datelike, Duration, Local, NaiveDate, Weekday};

use crate::text;

/// Resolve a date phrase relative to the local calendar date.
pub fn parse_relative_date(phrase: &str) -> Option<String> {
    parse_relative_date_from(phrase, Local::now().date_naive())
}

/// Resolve a date phrase relative to `today`, returning `YYYY-MM-DD`.
pub fn parse_relative_date_from(phrase: &str, today: NaiveDate) -> Option<String> {
    resolve(phrase, today).map(|d| d.format("%Y-%m-%d").to_string())
}

fn resolve(phrase: &str, today: NaiveDate) -> Option<NaiveDate> {
    let lower = phrase.to_lowercase();

    if let Some(caps) = text::captures(r"\b(\d{4})-(\d{1,2})-(\d{1,2})\b", &lower) {
        return ymd(caps.get(1)?, caps.get(2)?, caps.get(3)?);
    }

    if let Some(caps) = text::captures(r"\b(\d{1,2})[/-](\d{1,2})[/-](\d{4})\b", &lower) {
        return ymd(caps.get(3)?, caps.get(2)?, caps.get(1)?);
    }

    if text::is_match(r"\btoday\b", &lower) {
        return Some(today);
    }

    if text::is_match(r"\btomorrow\b", &lower) {
        return today.checked_add_signed(Duration::days(1));
    }

    let caps = text::captures(
        r"\b(?:(this|next)\s+)?(monday|tuesday|wednesday|thursday|friday|saturday|sunday)\b",
        &lower,
    )?;
    let target: Weekday = caps.get(2)?.as_deref()?.parse().ok()?;
    let next = caps.get(1).and_then(|m| m.as_deref()) == Some("next");

    let offset = (target.num_days_from_monday() as i64 - today.weekday().num_days_from_monday() as i64)
        .rem_euclid(7);
    let mut date = today.checked_add_signed(Duration::days(offset))?;

    // "next" must land in a later calendar week than today.
    if next && date.iso_week() == today.iso_week() {
        date = date.checked_add_signed(Duration::days(7))?;
    }
    Some(date)
}

fn ymd(year: &Option<String>, month: &Option<String>, day: &Option<String>) -> Option<NaiveDate> {
    let year = year.as_deref()?.parse().ok()?;
    let month = month.as_deref()?.parse().ok()?;
    let day = day.as_deref()?.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Wednesday
    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, 5).unwrap()
    }

    #[test]
    fn test_iso_date_is_returned_verbatim() {
        assert_eq!(
            parse_relative_date_from("2025-11-03", today()).as_deref(),
            Some("2025-11-03")
        );
        assert_eq!(parse_relative_date("2025-11-03").as_deref(), Some("2025-11-03"));
    }

    #[test]
    fn test_day_first_formats() {
        assert_eq!(
            parse_relative_date_from("on 09/12/2025", today()).as_deref(),
            Some("2025-12-09")
        );
        assert_eq!(
            parse_relative_date_from("09-12-2025", today()).as_deref(),
            Some("2025-12-09")
        );
    }

    #[test]
    fn test_tomorrow_is_today_plus_one() {
        assert_eq!(
            parse_relative_date_from("flights tomorrow", today()).as_deref(),
            Some("2025-11-06")
        );
        let expected = (Local::now().date_naive() + Duration::days(1))
            .format("%Y-%m-%d")
            .to_string();
        assert_eq!(parse_relative_date("tomorrow"), Some(expected));
    }

    #[test]
    fn test_bare_and_this_weekday_take_nearest_occurrence() {
        assert_eq!(parse_relative_date_from("friday", today()).as_deref(), Some("2025-11-07"));
        assert_eq!(
            parse_relative_date_from("this wednesday", today()).as_deref(),
            Some("2025-11-05")
        );
        assert_eq!(parse_relative_date_from("monday", today()).as_deref(), Some("2025-11-10"));
    }

    #[test]
    fn test_next_weekday_skips_current_week() {
        assert_eq!(
            parse_relative_date_from("next friday", today()).as_deref(),
            Some("2025-11-14")
        );
        assert_eq!(
            parse_relative_date_from("next wednesday", today()).as_deref(),
            Some("2025-11-12")
        );
        assert_eq!(
            parse_relative_date_from("next monday", today()).as_deref(),
            Some("2025-11-10")
        );
    }

    #[test]
    fn test_malformed_input_is_none() {
        assert!(parse_relative_date_from("2025-13-40", today()).is_none());
        assert!(parse_relative_date_from("sometime soon", today()).is_none());
        assert!(parse_relative_date_from("", today()).is_none());
    }
}
