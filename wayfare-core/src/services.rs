//! Collaborator contracts consumed by the dialogue engine, plus in-memory
//! implementations used by tests and by the `memory` storage backend.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::error::{StoreError, WayfareError};
use crate::models::{BookingRecord, Flight, NewBooking, PaymentStatus};

// ============================================================================
// Traits
// ============================================================================

/// Read-only flight search.
#[async_trait]
pub trait FlightLookup: Send + Sync {
    /// Flights between two IATA codes, in the store's natural order.
    async fn find_by_route(&self, from: &str, to: &str) -> Result<Vec<Flight>, StoreError>;

    /// Case-insensitive lookup by flight number.
    async fn find_by_code(&self, code: &str) -> Result<Option<Flight>, StoreError>;

    /// Backend name for logging.
    fn name(&self) -> &str;
}

/// Booking persistence.
#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn list_booked_seats(&self, flight_id: &str) -> Result<Vec<String>, StoreError>;

    /// Persist a booking and return its id.
    async fn create_booking(&self, booking: NewBooking) -> Result<String, StoreError>;

    async fn update_payment_status(
        &self,
        booking_id: &str,
        status: PaymentStatus,
        payment: Option<serde_json::Value>,
    ) -> Result<BookingRecord, StoreError>;

    async fn get_booking(&self, booking_id: &str) -> Result<Option<BookingRecord>, StoreError>;

    fn name(&self) -> &str;
}

// ============================================================================
// In-memory flights
// ============================================================================

#[derive(Default)]
pub struct InMemoryFlightStore {
    flights: RwLock<Vec<Flight>>,
}

impl InMemoryFlightStore {
    pub fn new(flights: Vec<Flight>) -> Self {
        Self {
            flights: RwLock::new(flights),
        }
    }

    /// Seed from a JSON array of flight records.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, WayfareError> {
        let raw = std::fs::read_to_string(path)?;
        let flights: Vec<Flight> = serde_json::from_str(&raw)?;
        Ok(Self::new(flights))
    }

    pub async fn insert(&self, flight: Flight) {
        self.flights.write().await.push(flight);
    }

    pub async fn len(&self) -> usize {
        self.flights.read().await.len()
    }
}

#[async_trait]
impl FlightLookup for InMemoryFlightStore {
    async fn find_by_route(&self, from: &str, to: &str) -> Result<Vec<Flight>, StoreError> {
        let flights = self.flights.read().await;
        Ok(flights
            .iter()
            .filter(|f| {
                f.departure_city_code.eq_ignore_ascii_case(from)
                    && f.arrival_city_code.eq_ignore_ascii_case(to)
            })
            .cloned()
            .collect())
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Flight>, StoreError> {
        let flights = self.flights.read().await;
        Ok(flights
            .iter()
            .find(|f| f.flight_number.eq_ignore_ascii_case(code.trim()))
            .cloned())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

// ============================================================================
// In-memory bookings
// ============================================================================

#[derive(Default)]
pub struct InMemoryBookingStore {
    bookings: RwLock<HashMap<String, BookingRecord>>,
}

impl InMemoryBookingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.bookings.read().await.len()
    }
}

#[async_trait]
impl BookingStore for InMemoryBookingStore {
    async fn list_booked_seats(&self, flight_id: &str) -> Result<Vec<String>, StoreError> {
        let bookings = self.bookings.read().await;
        Ok(bookings
            .values()
            .filter(|b| b.flight_id == flight_id)
            .flat_map(|b| b.selected_seats.iter().cloned())
            .collect())
    }

    async fn create_booking(&self, booking: NewBooking) -> Result<String, StoreError> {
        let mut bookings = self.bookings.write().await;

        let conflicts: Vec<String> = bookings
            .values()
            .filter(|b| b.flight_id == booking.flight_id)
            .flat_map(|b| b.selected_seats.iter())
            .filter(|s| booking.selected_seats.contains(s))
            .cloned()
            .collect();
        if !conflicts.is_empty() {
            return Err(StoreError::SeatConflict(conflicts));
        }

        let id = uuid::Uuid::new_v4().to_string();
        bookings.insert(
            id.clone(),
            BookingRecord {
                id: id.clone(),
                user_id: booking.user_id,
                flight_id: booking.flight_id,
                passengers: booking.passengers,
                selected_seats: booking.selected_seats,
                total_amount: booking.total_amount,
                travel_class: booking.travel_class,
                payment_status: booking.payment_status,
                payment: booking.payment,
                created_at: Utc::now(),
            },
        );
        tracing::debug!(booking_id = %id, "Booking stored in memory");
        Ok(id)
    }

    async fn update_payment_status(
        &self,
        booking_id: &str,
        status: PaymentStatus,
        payment: Option<serde_json::Value>,
    ) -> Result<BookingRecord, StoreError> {
        let mut bookings = self.bookings.write().await;
        let record = bookings
            .get_mut(booking_id)
            .ok_or_else(|| StoreError::NotFound(format!("booking {}", booking_id)))?;
        record.payment_status = status;
        if payment.is_some() {
            record.payment = payment;
        }
        Ok(record.clone())
    }

    async fn get_booking(&self, booking_id: &str) -> Result<Option<BookingRecord>, StoreError> {
        Ok(self.bookings.read().await.get(booking_id).cloned())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::tests::flight;
    use crate::models::TravelClass;

    fn new_booking(flight_id: &str, seats: &[&str]) -> NewBooking {
        NewBooking {
            user_id: "user-1".to_string(),
            flight_id: flight_id.to_string(),
            passengers: Vec::new(),
            selected_seats: seats.iter().map(|s| s.to_string()).collect(),
            total_amount: 4200.0,
            travel_class: TravelClass::Economy,
            payment_status: PaymentStatus::Pending,
            payment: None,
        }
    }

    #[tokio::test]
    async fn test_find_by_route_ignores_case() {
        let store = InMemoryFlightStore::new(vec![flight("6E201", "IndiGo", "06:15", Some(4200.0))]);
        assert_eq!(store.find_by_route("maa", "del").await.unwrap().len(), 1);
        assert!(store.find_by_route("DEL", "MAA").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_find_by_code_ignores_case() {
        let store = InMemoryFlightStore::new(vec![flight("6E201", "IndiGo", "06:15", Some(4200.0))]);
        assert!(store.find_by_code("6e201").await.unwrap().is_some());
        assert!(store.find_by_code("AI540").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_booked_seats_are_per_flight() {
        let store = InMemoryBookingStore::new();
        store.create_booking(new_booking("f1", &["E1A", "E1B"])).await.unwrap();
        store.create_booking(new_booking("f2", &["E1A"])).await.unwrap();

        let mut seats = store.list_booked_seats("f1").await.unwrap();
        seats.sort();
        assert_eq!(seats, vec!["E1A", "E1B"]);
    }

    #[tokio::test]
    async fn test_double_booking_is_rejected() {
        let store = InMemoryBookingStore::new();
        store.create_booking(new_booking("f1", &["E1A"])).await.unwrap();
        match store.create_booking(new_booking("f1", &["E1A", "E2A"])).await {
            Err(StoreError::SeatConflict(seats)) => assert_eq!(seats, vec!["E1A"]),
            other => panic!("expected seat conflict, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_update_payment_status() {
        let store = InMemoryBookingStore::new();
        let id = store.create_booking(new_booking("f1", &["E1A"])).await.unwrap();
        let record = store
            .update_payment_status(&id, PaymentStatus::Paid, Some(serde_json::json!({"ref": "p-1"})))
            .await
            .unwrap();
        assert_eq!(record.payment_status, PaymentStatus::Paid);
        assert_eq!(record.payment.unwrap()["ref"], "p-1");

        assert!(matches!(
            store.update_payment_status("missing", PaymentStatus::Paid, None).await,
            Err(StoreError::NotFound(_))
        ));
    }
}
