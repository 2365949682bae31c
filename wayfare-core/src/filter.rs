//! Result filter: applies budget, time-of-day, airline and sort directives
//! from a free-text phrase to a flight result set.
//!
//! Filters apply in a fixed order; sort directives always run last. The input
//! slice is never modified; a new vector is returned.

use crate::models::Flight;
use crate::text;

const UNDER_PATTERN: &str = r"(?:under|below|less than|<)\s*₹?\s*([0-9][0-9,]*)";
const RANGE_PATTERN: &str = r"₹?\s*([0-9][0-9,]*)\s*(?:-|to|–)\s*₹?\s*([0-9][0-9,]*)";
const URGENCY_PATTERN: &str = r"\b(earliest|immediate|asap|soon|now|today|tonight)\b";
const CHEAP_PATTERN: &str = r"\b(cheap|cheapest|lowest|budget|sort by price)\b";
const AFTER_PATTERN: &str = r"\bafter\s+([0-2]?\d(?::[0-5]\d)?\s*(?:am|pm)?)\b";
const BEFORE_PATTERN: &str = r"\bbefore\s+([0-2]?\d(?::[0-5]\d)?\s*(?:am|pm)?)\b";
const ONLY_PATTERN: &str = r"\bonly\s+([a-z][a-z ]*)";
const EXCLUDE_PATTERN: &str = r"\bno\s+([a-z][a-z ]*)";

/// Trailing words dropped from an airline phrase ("only indigo flights").
const AIRLINE_FILLER: &[&str] = &["flights", "flight", "ones", "one", "please", "airline", "airlines"];

/// Words that end an airline phrase because another directive starts there.
const DIRECTIVE_WORDS: &[&str] = &[
    "under", "below", "less", "between", "after", "before", "morning", "evening", "cheap",
    "cheapest", "lowest", "budget", "sort", "earliest", "immediate", "asap", "soon", "now",
    "today", "tonight", "only", "no", "and", "but", "with",
];

/// True when the phrase carries at least one recognised directive.
pub fn has_directive(phrase: &str) -> bool {
    let lower = phrase.to_lowercase();
    [
        UNDER_PATTERN,
        RANGE_PATTERN,
        URGENCY_PATTERN,
        CHEAP_PATTERN,
        r"\b(morning|evening)\b",
        AFTER_PATTERN,
        BEFORE_PATTERN,
        ONLY_PATTERN,
        EXCLUDE_PATTERN,
    ]
    .iter()
    .any(|p| text::is_match(p, &lower))
}

pub fn apply_filters(results: &[Flight], phrase: &str) -> Vec<Flight> {
    let lower = phrase.to_lowercase();
    let mut filtered: Vec<Flight> = results.to_vec();

    if let Some(limit) = text::capture(UNDER_PATTERN, &lower, 1).and_then(|s| text::parse_amount(&s)) {
        filtered.retain(|f| f.price.is_some_and(|p| p <= limit));
    }

    if let Some(caps) = text::captures(RANGE_PATTERN, &lower) {
        let a = caps.get(1).and_then(|m| m.as_deref()).and_then(text::parse_amount);
        let b = caps.get(2).and_then(|m| m.as_deref()).and_then(text::parse_amount);
        if let (Some(a), Some(b)) = (a, b) {
            let (low, high) = (a.min(b), a.max(b));
            filtered.retain(|f| f.price.is_some_and(|p| p >= low && p <= high));
        }
    }

    if text::is_match(r"\bevening\b", &lower) {
        filtered.retain(|f| departure_hour(f).is_some_and(|h| h >= 17));
    }
    if text::is_match(r"\bmorning\b", &lower) {
        filtered.retain(|f| departure_hour(f).is_some_and(|h| h < 12));
    }

    if let Some(hour) = text::capture(AFTER_PATTERN, &lower, 1).and_then(|s| parse_hour(&s)) {
        filtered.retain(|f| departure_hour(f).is_some_and(|h| h >= hour));
    }
    if let Some(hour) = text::capture(BEFORE_PATTERN, &lower, 1).and_then(|s| parse_hour(&s)) {
        filtered.retain(|f| departure_hour(f).is_some_and(|h| h <= hour));
    }

    if let Some(airline) = text::capture(ONLY_PATTERN, &lower, 1).and_then(|s| airline_phrase(&s)) {
        filtered.retain(|f| f.airline.to_lowercase().contains(&airline));
    }
    if let Some(airline) = text::capture(EXCLUDE_PATTERN, &lower, 1).and_then(|s| airline_phrase(&s)) {
        filtered.retain(|f| !f.airline.to_lowercase().contains(&airline));
    }

    // Sorts last; both are stable.
    if text::is_match(URGENCY_PATTERN, &lower) {
        filtered.sort_by_key(|f| departure_hour(f).unwrap_or(u32::MAX));
    }
    if text::is_match(CHEAP_PATTERN, &lower) {
        filtered.sort_by(|a, b| {
            a.price
                .unwrap_or(0.0)
                .partial_cmp(&b.price.unwrap_or(0.0))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    }

    filtered
}

fn airline_phrase(raw: &str) -> Option<String> {
    let mut words: Vec<&str> = raw
        .split_whitespace()
        .take_while(|w| !DIRECTIVE_WORDS.contains(w))
        .collect();
    while words.last().is_some_and(|w| AIRLINE_FILLER.contains(w)) {
        words.pop();
    }
    if words.is_empty() {
        None
    } else {
        Some(words.join(" "))
    }
}

/// Hour (0-23) a flight departs, or `None` when the time can't be read.
///
/// Accepts `H[:MM]am/pm`, 24-hour `HH:MM`, and a bare leading hour.
pub fn departure_hour(flight: &Flight) -> Option<u32> {
    let t = flight.departure_time.trim().to_lowercase();
    if t.is_empty() {
        return None;
    }

    if let Some(caps) = text::captures(r"\b(1[0-2]|0?\d)(?::([0-5]\d))?\s*(am|pm)\b", &t) {
        let hour: u32 = caps.get(1)?.as_deref()?.parse().ok()?;
        return Some(to_24h(hour, caps.get(3)?.as_deref()?));
    }

    if let Some(h) = text::capture(r"^([01]?\d|2[0-3]):[0-5]\d", &t, 1) {
        return h.parse().ok();
    }

    text::capture(r"^([0-2]?\d)", &t, 1)
        .and_then(|h| h.parse().ok())
        .filter(|h| *h < 24)
}

/// Parse the hour out of a phrase such as `7pm`, `19:30` or `10`.
pub fn parse_hour(raw: &str) -> Option<u32> {
    let caps = text::captures(r"\b([0-2]?\d)(?::([0-5]\d))?\s*(am|pm)?\b", &raw.to_lowercase())?;
    let hour: u32 = caps.get(1)?.as_deref()?.parse().ok()?;
    let hour = match caps.get(3).and_then(|m| m.as_deref()) {
        Some(meridiem) => to_24h(hour, meridiem),
        None => hour,
    };
    (hour <= 23).then_some(hour)
}

fn to_24h(hour: u32, meridiem: &str) -> u32 {
    match meridiem {
        "pm" if hour < 12 => hour + 12,
        "am" if hour == 12 => 0,
        _ => hour,
    }
}
