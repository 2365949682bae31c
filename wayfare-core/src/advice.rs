//! Cheapest / earliest / balanced picks over a result set.

use serde::Serialize;

use crate::filter::departure_hour;
use crate::models::Flight;

const PRICE_WEIGHT: f64 = 0.6;
const TIME_WEIGHT: f64 = 0.4;
const NEUTRAL_TIME_SCORE: f64 = 0.5;

#[derive(Debug, Clone, Serialize)]
pub struct Advice<'a> {
    pub cheapest: Option<&'a Flight>,
    pub earliest: Option<&'a Flight>,
    pub balanced: Option<&'a Flight>,
}

/// `None` for an empty set.
pub fn suggest(flights: &[Flight]) -> Option<Advice<'_>> {
    if flights.is_empty() {
        return None;
    }

    let mut cheapest: Option<&Flight> = None;
    for f in flights {
        let price = f.price.unwrap_or(f64::INFINITY);
        if cheapest.map_or(true, |c| price < c.price.unwrap_or(f64::INFINITY)) {
            cheapest = Some(f);
        }
    }

    let mut earliest: Option<(u32, &Flight)> = None;
    for f in flights {
        if let Some(h) = departure_hour(f) {
            if earliest.map_or(true, |(best, _)| h < best) {
                earliest = Some((h, f));
            }
        }
    }

    Some(Advice {
        cheapest,
        earliest: earliest.map(|(_, f)| f),
        balanced: balanced(flights),
    })
}

fn balanced(flights: &[Flight]) -> Option<&Flight> {
    let mut prices: Vec<f64> = flights.iter().filter_map(|f| f.price).collect();
    if prices.is_empty() {
        return None;
    }
    prices.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let median = prices[prices.len() / 2];
    let divisor = if median == 0.0 { 1.0 } else { median };

    let mut best: Option<(f64, &Flight)> = None;
    for f in flights {
        let price_score = 1.0 - (f.price.unwrap_or(median) - median).abs() / divisor;
        let time_score = departure_hour(f)
            .map(|h| 1.0 - (h as f64 - 12.0).abs() / 12.0)
            .unwrap_or(NEUTRAL_TIME_SCORE);
        let score = PRICE_WEIGHT * price_score + TIME_WEIGHT * time_score;
        if best.map_or(true, |(s, _)| score > s) {
            best = Some((score, f));
        }
    }
    best.map(|(_, f)| f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::tests::flight;

    #[test]
    fn test_empty_set_has_no_advice() {
        assert!(suggest(&[]).is_none());
    }

    #[test]
    fn test_cheapest_and_earliest() {
        let flights = vec![
            flight("A1", "A", "09:00", Some(5000.0)),
            flight("B2", "B", "05:30", Some(3000.0)),
            flight("C3", "C", "TBA", Some(3000.0)),
            flight("D4", "D", "14:00", None),
        ];
        let advice = suggest(&flights).unwrap();
        assert_eq!(advice.cheapest.unwrap().flight_number, "B2");
        assert_eq!(advice.earliest.unwrap().flight_number, "B2");
    }

    #[test]
    fn test_earliest_ignores_unparseable_times() {
        let flights = vec![
            flight("A1", "A", "TBA", Some(1000.0)),
            flight("B2", "B", "18:00", Some(2000.0)),
        ];
        assert_eq!(suggest(&flights).unwrap().earliest.unwrap().flight_number, "B2");
    }

    #[test]
    fn test_balanced_prefers_median_price_near_noon() {
        let flights = vec![
            flight("A1", "A", "06:00", Some(2000.0)),
            flight("B2", "B", "12:00", Some(4000.0)),
            flight("C3", "C", "23:00", Some(9000.0)),
        ];
        assert_eq!(suggest(&flights).unwrap().balanced.unwrap().flight_number, "B2");
    }

    #[test]
    fn test_balanced_ties_keep_first() {
        let flights = vec![
            flight("A1", "A", "10:00", Some(4000.0)),
            flight("B2", "B", "14:00", Some(4000.0)),
        ];
        assert_eq!(suggest(&flights).unwrap().balanced.unwrap().flight_number, "A1");
    }

    #[test]
    fn test_balanced_needs_a_priced_flight() {
        let flights = vec![flight("A1", "A", "10:00", None)];
        let advice = suggest(&flights).unwrap();
        assert!(advice.balanced.is_none());
        assert_eq!(advice.cheapest.unwrap().flight_number, "A1");
    }
}
