//! Greedy, preference-scored seat assignment.
//!
//! Passengers are seated one at a time in input order. Each gets the
//! highest-scoring seat still free at their turn; there is no backtracking, so
//! a group can fail to seat even when some other assignment would have fit.
//! A failure for any passenger fails the whole allocation.
//!
//! Score per candidate seat:
//! - seat type: +10 on match, +1 baseline for no preference
//! - zone: front/back +8, near wings +9, near exit (front ∪ wings) +6,
//!   +1 baseline for no preference
//! - proximity to seats already given to this group: `max(0, 10 - d) × 0.02`
//!   where `d` is the row distance to the nearest one
//! - `(rows - row) × 0.01` so earlier rows win ties

use std::collections::HashSet;

use crate::catalog::LayoutCatalog;
use crate::models::{Flight, Passenger, SeatType, SeatZone, TravelClass};

const GENERIC_COLUMNS: &[&str] = &["A", "B", "C", "D", "E", "F"];
const GENERIC_ROWS: usize = 30;

const SEAT_TYPE_MATCH: f64 = 10.0;
const NO_PREF: f64 = 1.0;
const FRONT_BACK_MATCH: f64 = 8.0;
const WINGS_MATCH: f64 = 9.0;
const EXIT_MATCH: f64 = 6.0;
const PROXIMITY_STEP: f64 = 0.02;
const PROXIMITY_REACH: f64 = 10.0;
const ROW_BIAS: f64 = 0.01;

/// Resolved cabin grid for one flight and class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cabin {
    pub columns: Vec<String>,
    pub rows: usize,
    pub class: TravelClass,
}

impl Cabin {
    /// Aircraft-specific layout when the catalog has one for this class, otherwise
    /// a generic six-abreast cabin sized from the flight's seat count.
    pub fn for_flight(flight: &Flight, class: TravelClass, layouts: &LayoutCatalog) -> Self {
        let columns: Vec<String> = layouts
            .cabin(&flight.aircraft.layout_key(), class)
            .filter(|c| !c.layout.is_empty())
            .map(|c| c.layout.clone())
            .unwrap_or_else(|| GENERIC_COLUMNS.iter().map(|c| c.to_string()).collect());

        let total = flight
            .seats
            .for_class(class)
            .map(|n| n as usize)
            .unwrap_or(columns.len() * GENERIC_ROWS);
        let rows = total.div_ceil(columns.len());

        Self { columns, rows, class }
    }

    pub fn seat_id(&self, row: usize, col: usize) -> String {
        format!("{}{}{}", self.class.seat_prefix(), row, self.columns[col])
    }

    /// Window at either edge, aisle on the two columns beside the midpoint.
    pub fn seat_type(&self, col: usize) -> SeatType {
        let last = self.columns.len().saturating_sub(1);
        let mid = self.columns.len() / 2;
        if col == 0 || col == last {
            SeatType::Window
        } else if col + 1 == mid || col == mid {
            SeatType::Aisle
        } else {
            SeatType::Middle
        }
    }

    fn front_end(&self) -> usize {
        ((self.rows as f64 * 0.25).ceil() as usize).max(1)
    }

    fn back_start(&self) -> usize {
        ((self.rows as f64 * 0.75).floor() as usize + 1).max(1)
    }

    fn wings(&self) -> (usize, usize) {
        let start = ((self.rows as f64 * 0.35).floor() as usize).max(1);
        let end = ((self.rows as f64 * 0.65).ceil() as usize).min(self.rows);
        (start, end)
    }

    fn zone_score(&self, row: usize, zone: SeatZone) -> f64 {
        let (wing_start, wing_end) = self.wings();
        let in_wings = row >= wing_start && row <= wing_end;
        match zone {
            SeatZone::NoPref => NO_PREF,
            SeatZone::Front if row <= self.front_end() => FRONT_BACK_MATCH,
            SeatZone::Back if row >= self.back_start() => FRONT_BACK_MATCH,
            SeatZone::NearWings if in_wings => WINGS_MATCH,
            SeatZone::NearExit if row <= self.front_end() || in_wings => EXIT_MATCH,
            _ => 0.0,
        }
    }

    fn base_score(&self, row: usize, col: usize, passenger: &Passenger) -> f64 {
        let pref = passenger.seat_pref;
        let type_score = match pref.seat_type {
            SeatType::NoPref => NO_PREF,
            wanted if wanted == self.seat_type(col) => SEAT_TYPE_MATCH,
            _ => 0.0,
        };
        let bias = (self.rows.saturating_sub(row)) as f64 * ROW_BIAS;
        type_score + self.zone_score(row, pref.location) + bias
    }
}

/// Assign one seat per passenger, in input order, avoiding `booked`.
/// Returns `None` if anyone cannot be seated; partial results are never returned.
pub fn assign_seats(
    flight: &Flight,
    passengers: &[Passenger],
    booked: &[String],
    class: TravelClass,
    layouts: &LayoutCatalog,
) -> Option<Vec<String>> {
    let cabin = Cabin::for_flight(flight, class, layouts);
    let mut used: HashSet<String> = booked.iter().cloned().collect();
    let mut assigned_rows: Vec<usize> = Vec::with_capacity(passengers.len());
    let mut assigned: Vec<String> = Vec::with_capacity(passengers.len());

    for passenger in passengers {
        let mut best: Option<(f64, String, usize)> = None;
        for row in 1..=cabin.rows {
            let proximity = assigned_rows
                .iter()
                .map(|r| r.abs_diff(row))
                .min()
                .map(|d| ((PROXIMITY_REACH - d as f64) * PROXIMITY_STEP).max(0.0))
                .unwrap_or(0.0);

            for col in 0..cabin.columns.len() {
                let seat = cabin.seat_id(row, col);
                if used.contains(&seat) {
                    continue;
                }
                let score = cabin.base_score(row, col, passenger) + proximity;
                if best.as_ref().map_or(true, |(s, _, _)| score > *s) {
                    best = Some((score, seat, row));
                }
            }
        }

        let (_, seat, row) = best?;
        used.insert(seat.clone());
        assigned_rows.push(row);
        assigned.push(seat);
    }

    Some(assigned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::tests::flight;
    use crate::models::{Aircraft, SeatCapacity, SeatPreference};

    fn passenger(seat_type: SeatType, location: SeatZone) -> Passenger {
        Passenger {
            seat_pref: SeatPreference {
                seat_type,
                location,
            },
            ..Passenger::default()
        }
    }

    fn small_flight(economy: u32) -> Flight {
        let mut f = flight("6E201", "IndiGo", "06:15", Some(4200.0));
        f.seats = SeatCapacity {
            economy: Some(economy),
            business: None,
            first: None,
        };
        f
    }

    #[test]
    fn test_generic_layout_when_aircraft_unknown() {
        let mut f = small_flight(20);
        f.aircraft = Aircraft {
            make: "Unknown".to_string(),
            model: "X".to_string(),
        };
        let cabin = Cabin::for_flight(&f, TravelClass::Economy, &LayoutCatalog::default());
        assert_eq!(cabin.columns.len(), 6);
        assert_eq!(cabin.rows, 4);
    }

    #[test]
    fn test_catalog_layout_is_used() {
        let mut f = small_flight(36);
        f.aircraft = Aircraft {
            make: "Airbus".to_string(),
            model: "ATR 72-600".to_string(),
        };
        let cabin = Cabin::for_flight(&f, TravelClass::Economy, &LayoutCatalog::default());
        assert_eq!(cabin.columns, vec!["A", "B", "C", "D"]);
        assert_eq!(cabin.rows, 9);
        assert_eq!(cabin.seat_type(0), SeatType::Window);
        assert_eq!(cabin.seat_type(1), SeatType::Aisle);
        assert_eq!(cabin.seat_type(2), SeatType::Aisle);
        assert_eq!(cabin.seat_type(3), SeatType::Window);
    }

    #[test]
    fn test_six_abreast_classification() {
        let cabin = Cabin::for_flight(&small_flight(60), TravelClass::Economy, &LayoutCatalog::empty());
        let types: Vec<_> = (0..6).map(|c| cabin.seat_type(c)).collect();
        assert_eq!(
            types,
            vec![
                SeatType::Window,
                SeatType::Middle,
                SeatType::Aisle,
                SeatType::Aisle,
                SeatType::Middle,
                SeatType::Window
            ]
        );
    }

    #[test]
    fn test_window_front_preference() {
        let f = small_flight(120);
        let seats = assign_seats(
            &f,
            &[passenger(SeatType::Window, SeatZone::Front)],
            &[],
            TravelClass::Economy,
            &LayoutCatalog::empty(),
        )
        .unwrap();
        assert_eq!(seats, vec!["E1A"]);
    }

    #[test]
    fn test_back_aisle_preference() {
        let f = small_flight(120);
        let seats = assign_seats(
            &f,
            &[passenger(SeatType::Aisle, SeatZone::Back)],
            &[],
            TravelClass::Economy,
            &LayoutCatalog::empty(),
        )
        .unwrap();
        // 20 rows; back zone starts at row 16
        assert_eq!(seats, vec!["E16C"]);
    }

    #[test]
    fn test_group_is_distinct_and_avoids_booked() {
        let f = small_flight(120);
        let booked = vec!["E1A".to_string(), "E1F".to_string()];
        let group = vec![
            passenger(SeatType::Window, SeatZone::NoPref),
            passenger(SeatType::Window, SeatZone::NoPref),
            passenger(SeatType::NoPref, SeatZone::NoPref),
        ];
        let seats =
            assign_seats(&f, &group, &booked, TravelClass::Economy, &LayoutCatalog::empty()).unwrap();

        assert_eq!(seats.len(), group.len());
        let unique: HashSet<_> = seats.iter().collect();
        assert_eq!(unique.len(), seats.len());
        assert!(seats.iter().all(|s| !booked.contains(s)));
        assert_eq!(seats[0], "E2A");
        assert_eq!(seats[1], "E2F");
    }

    #[test]
    fn test_exhaustion_fails_whole_allocation() {
        let f = small_flight(6);
        let booked: Vec<String> = ["E1A", "E1B", "E1C", "E1D", "E1E"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let group = vec![Passenger::default(), Passenger::default()];
        assert!(assign_seats(&f, &group, &booked, TravelClass::Economy, &LayoutCatalog::empty()).is_none());
    }

    #[test]
    fn test_business_seats_use_class_prefix() {
        let mut f = small_flight(60);
        f.seats.business = Some(8);
        let seats = assign_seats(
            &f,
            &[Passenger::default()],
            &[],
            TravelClass::Business,
            &LayoutCatalog::default(),
        )
        .unwrap();
        assert!(seats[0].starts_with('B'));
    }
}
