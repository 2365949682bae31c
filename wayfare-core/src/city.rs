//! City resolver: maps free-text city or airport mentions to a catalog entry.
//!
//! Strategies run in a fixed order and the first hit wins:
//! 1. three-letter alphabetic token (treated as an IATA code)
//! 2. case-insensitive exact city name
//! 3. fuzzy match, tight threshold
//! 4. fuzzy match, loose threshold
//! 5. fuzzy match on each alphabetic token
//! 6. substring containment either way
//!
//! Fuzzy scores are approximate-substring edit distances normalised by the
//! query length: 0.0 is a perfect match, 1.0 shares nothing.

use crate::catalog::CityCatalog;
use crate::models::City;
use crate::text;

/// Tight threshold; keeps false positives down.
pub const STRICT_THRESHOLD: f64 = 0.35;

/// Loose threshold for typo-heavy input.
pub const LOOSE_THRESHOLD: f64 = 0.6;

pub struct CityResolver {
    catalog: CityCatalog,
}

impl CityResolver {
    pub fn new(catalog: CityCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &CityCatalog {
        &self.catalog
    }

    pub fn resolve(&self, input: &str) -> Option<City> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return None;
        }

        if text::is_match(r"^[A-Za-z]{3}$", trimmed) {
            // Known codes and three-letter city names map to their catalog entry;
            // anything else is trusted as a raw code.
            if let Some(c) = self.catalog.by_code(trimmed).or_else(|| self.catalog.by_name(trimmed)) {
                return Some(c.clone());
            }
            let code = trimmed.to_uppercase();
            return Some(City::new(code.clone(), code));
        }

        if let Some(c) = self.catalog.by_name(trimmed) {
            return Some(c.clone());
        }

        if let Some(c) = self.fuzzy(trimmed, STRICT_THRESHOLD) {
            return Some(c);
        }

        if let Some(c) = self.fuzzy(trimmed, LOOSE_THRESHOLD) {
            return Some(c);
        }

        for token in trimmed
            .split(|c: char| !c.is_ascii_alphabetic())
            .filter(|t| !t.is_empty())
        {
            if let Some(c) = self.fuzzy(token, STRICT_THRESHOLD) {
                return Some(c);
            }
        }

        let lower = trimmed.to_lowercase();
        self.catalog
            .entries()
            .iter()
            .find(|c| {
                let city = c.city.to_lowercase();
                let iata = c.iata.to_lowercase();
                city.contains(&lower)
                    || iata.contains(&lower)
                    || lower.contains(&city)
                    || lower.contains(&iata)
            })
            .cloned()
    }

    /// Best catalog entry whose name or code scores within `threshold`.
    /// Ties keep catalog order.
    fn fuzzy(&self, query: &str, threshold: f64) -> Option<City> {
        let query = query.to_lowercase();
        let mut best: Option<(f64, &City)> = None;
        for entry in self.catalog.entries() {
            let score = match_score(&query, &entry.city.to_lowercase())
                .min(match_score(&query, &entry.iata.to_lowercase()));
            if score > threshold {
                continue;
            }
            match best {
                Some((s, _)) if s <= score => {}
                _ => best = Some((score, entry)),
            }
        }
        best.map(|(_, c)| c.clone())
    }
}

/// Edit distance between `pattern` and its closest substring of `target`,
/// divided by the pattern length.
pub fn match_score(pattern: &str, target: &str) -> f64 {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = target.chars().collect();
    if p.is_empty() {
        return 1.0;
    }

    // Row i holds the best edit distance of p[..i] ending at each target position;
    // row 0 is all zeros so a match may start anywhere.
    let mut prev = vec![0usize; t.len() + 1];
    for (i, pc) in p.iter().enumerate() {
        let mut cur = vec![i + 1; t.len() + 1];
        for (j, tc) in t.iter().enumerate() {
            let substitution = prev[j] + usize::from(pc != tc);
            cur[j + 1] = substitution.min(prev[j + 1] + 1).min(cur[j] + 1);
        }
        prev = cur;
    }

    let distance = prev.iter().copied().min().unwrap_or(p.len());
    (distance as f64 / p.len() as f64).min(1.0)
}
