//! Postgres-backed flight lookup and booking store.
//!
//! Expects two tables:
//! - `flights(id, airline, flight_number, departure_city, departure_city_code,
//!   arrival_city, arrival_city_code, departure_time, arrival_time, price,
//!   seats_economy, seats_business, seats_first, aircraft_make, aircraft_model)`
//! - `bookings(id, user_id, flight_id, passengers JSONB, selected_seats TEXT[],
//!   total_amount, travel_class, payment_status, payment JSONB, created_at)`

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::error::StoreError;
use crate::models::{
    Aircraft, BookingRecord, Flight, NewBooking, PaymentStatus, SeatCapacity, TravelClass,
};
use crate::services::{BookingStore, FlightLookup};

const FLIGHT_COLUMNS: &str = "id, airline, flight_number, departure_city, departure_city_code, \
     arrival_city, arrival_city_code, departure_time, arrival_time, price, \
     seats_economy, seats_business, seats_first, aircraft_make, aircraft_model";

const BOOKING_COLUMNS: &str = "id, user_id, flight_id, passengers, selected_seats, total_amount, \
     travel_class, payment_status, payment, created_at";

#[derive(sqlx::FromRow)]
struct FlightRow {
    id: String,
    airline: String,
    flight_number: String,
    departure_city: Option<String>,
    departure_city_code: String,
    arrival_city: Option<String>,
    arrival_city_code: String,
    departure_time: String,
    arrival_time: String,
    price: Option<f64>,
    seats_economy: Option<i32>,
    seats_business: Option<i32>,
    seats_first: Option<i32>,
    aircraft_make: Option<String>,
    aircraft_model: Option<String>,
}

impl From<FlightRow> for Flight {
    fn from(row: FlightRow) -> Self {
        let seats = |n: Option<i32>| n.and_then(|n| u32::try_from(n).ok());
        Flight {
            id: row.id,
            airline: row.airline,
            flight_number: row.flight_number,
            departure_city: row.departure_city,
            departure_city_code: row.departure_city_code,
            arrival_city: row.arrival_city,
            arrival_city_code: row.arrival_city_code,
            departure_time: row.departure_time,
            arrival_time: row.arrival_time,
            price: row.price,
            seats: SeatCapacity {
                economy: seats(row.seats_economy),
                business: seats(row.seats_business),
                first: seats(row.seats_first),
            },
            aircraft: Aircraft {
                make: row.aircraft_make.unwrap_or_default(),
                model: row.aircraft_model.unwrap_or_default(),
            },
        }
    }
}

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: String,
    user_id: String,
    flight_id: String,
    passengers: serde_json::Value,
    selected_seats: Vec<String>,
    total_amount: f64,
    travel_class: String,
    payment_status: String,
    payment: Option<serde_json::Value>,
    created_at: DateTime<Utc>,
}

impl TryFrom<BookingRow> for BookingRecord {
    type Error = StoreError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        let passengers = serde_json::from_value(row.passengers)
            .map_err(|e| StoreError::Backend(format!("passengers column: {}", e)))?;
        let travel_class = TravelClass::parse(&row.travel_class)
            .ok_or_else(|| StoreError::Backend(format!("unknown travel class {}", row.travel_class)))?;
        let payment_status = PaymentStatus::parse(&row.payment_status).ok_or_else(|| {
            StoreError::Backend(format!("unknown payment status {}", row.payment_status))
        })?;
        Ok(BookingRecord {
            id: row.id,
            user_id: row.user_id,
            flight_id: row.flight_id,
            passengers,
            selected_seats: row.selected_seats,
            total_amount: row.total_amount,
            travel_class,
            payment_status,
            payment: row.payment,
            created_at: row.created_at,
        })
    }
}

// ============================================================================
// PgFlightStore
// ============================================================================

#[derive(Clone)]
pub struct PgFlightStore {
    pool: PgPool,
}

impl PgFlightStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FlightLookup for PgFlightStore {
    async fn find_by_route(&self, from: &str, to: &str) -> Result<Vec<Flight>, StoreError> {
        let sql = format!(
            "SELECT {FLIGHT_COLUMNS} FROM flights \
             WHERE UPPER(departure_city_code) = UPPER($1) AND UPPER(arrival_city_code) = UPPER($2) \
             ORDER BY departure_time"
        );
        let rows = sqlx::query_as::<_, FlightRow>(&sql)
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Flight::from).collect())
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Flight>, StoreError> {
        let sql = format!(
            "SELECT {FLIGHT_COLUMNS} FROM flights WHERE UPPER(flight_number) = UPPER($1) LIMIT 1"
        );
        let row = sqlx::query_as::<_, FlightRow>(&sql)
            .bind(code.trim())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Flight::from))
    }

    fn name(&self) -> &str {
        "postgres"
    }
}

// ============================================================================
// PgBookingStore
// ============================================================================

#[derive(Clone)]
pub struct PgBookingStore {
    pool: PgPool,
}

impl PgBookingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingStore for PgBookingStore {
    async fn list_booked_seats(&self, flight_id: &str) -> Result<Vec<String>, StoreError> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT DISTINCT unnest(selected_seats) FROM bookings \
             WHERE flight_id = $1 AND payment_status <> 'Failed'",
        )
        .bind(flight_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|(s,)| s).collect())
    }

    async fn create_booking(&self, booking: NewBooking) -> Result<String, StoreError> {
        let mut tx = self.pool.begin().await?;

        // Serialize bookings per flight so the conflict check below holds.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(&booking.flight_id)
            .execute(&mut *tx)
            .await?;

        let conflicts: Vec<(String,)> = sqlx::query_as(
            "SELECT DISTINCT seat FROM bookings, unnest(selected_seats) AS seat \
             WHERE flight_id = $1 AND payment_status <> 'Failed' AND seat = ANY($2)",
        )
        .bind(&booking.flight_id)
        .bind(&booking.selected_seats)
        .fetch_all(&mut *tx)
        .await?;
        if !conflicts.is_empty() {
            return Err(StoreError::SeatConflict(
                conflicts.into_iter().map(|(s,)| s).collect(),
            ));
        }

        let passengers = serde_json::to_value(&booking.passengers)
            .map_err(|e| StoreError::Backend(format!("passengers: {}", e)))?;
        let id = uuid::Uuid::new_v4().to_string();

        sqlx::query(
            "INSERT INTO bookings (id, user_id, flight_id, passengers, selected_seats, total_amount, \
             travel_class, payment_status, payment, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, now())",
        )
        .bind(&id)
        .bind(&booking.user_id)
        .bind(&booking.flight_id)
        .bind(passengers)
        .bind(&booking.selected_seats)
        .bind(booking.total_amount)
        .bind(booking.travel_class.as_str())
        .bind(booking.payment_status.as_str())
        .bind(&booking.payment)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::info!(booking_id = %id, flight_id = %booking.flight_id, "Booking created");
        Ok(id)
    }

    async fn update_payment_status(
        &self,
        booking_id: &str,
        status: PaymentStatus,
        payment: Option<serde_json::Value>,
    ) -> Result<BookingRecord, StoreError> {
        let sql = format!(
            "UPDATE bookings SET payment_status = $2, payment = COALESCE($3, payment) \
             WHERE id = $1 RETURNING {BOOKING_COLUMNS}"
        );
        let row = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(booking_id)
            .bind(status.as_str())
            .bind(payment)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("booking {}", booking_id)))?;
        row.try_into()
    }

    async fn get_booking(&self, booking_id: &str) -> Result<Option<BookingRecord>, StoreError> {
        let sql = format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1");
        let row = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(booking_id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(BookingRecord::try_from).transpose()
    }

    fn name(&self) -> &str {
        "postgres"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flight_row_maps_negative_capacity_to_none() {
        let row = FlightRow {
            id: "f1".to_string(),
            airline: "IndiGo".to_string(),
            flight_number: "6E201".to_string(),
            departure_city: None,
            departure_city_code: "MAA".to_string(),
            arrival_city: None,
            arrival_city_code: "DEL".to_string(),
            departure_time: "06:15".to_string(),
            arrival_time: "09:05".to_string(),
            price: Some(4200.0),
            seats_economy: Some(180),
            seats_business: Some(-1),
            seats_first: None,
            aircraft_make: Some("Airbus".to_string()),
            aircraft_model: None,
        };
        let flight = Flight::from(row);
        assert_eq!(flight.seats.economy, Some(180));
        assert_eq!(flight.seats.business, None);
        assert_eq!(flight.aircraft.layout_key(), "Airbus");
    }

    #[test]
    fn test_booking_row_rejects_unknown_status() {
        let row = BookingRow {
            id: "b1".to_string(),
            user_id: "u1".to_string(),
            flight_id: "f1".to_string(),
            passengers: serde_json::json!([]),
            selected_seats: vec!["E1A".to_string()],
            total_amount: 4200.0,
            travel_class: "Economy".to_string(),
            payment_status: "Refunded".to_string(),
            payment: None,
            created_at: Utc::now(),
        };
        assert!(matches!(BookingRecord::try_from(row), Err(StoreError::Backend(_))));
    }
}
