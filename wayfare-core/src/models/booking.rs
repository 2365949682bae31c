use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Passenger, TravelClass};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Paid => "Paid",
            PaymentStatus::Failed => "Failed",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "Pending" => Some(PaymentStatus::Pending),
            "Paid" => Some(PaymentStatus::Paid),
            "Failed" => Some(PaymentStatus::Failed),
            _ => None,
        }
    }
}

/// Booking payload handed to the booking store for persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBooking {
    pub user_id: String,
    pub flight_id: String,
    pub passengers: Vec<Passenger>,
    pub selected_seats: Vec<String>,
    pub total_amount: f64,
    pub travel_class: TravelClass,
    pub payment_status: PaymentStatus,
    pub payment: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRecord {
    pub id: String,
    pub user_id: String,
    pub flight_id: String,
    pub passengers: Vec<Passenger>,
    pub selected_seats: Vec<String>,
    pub total_amount: f64,
    pub travel_class: TravelClass,
    pub payment_status: PaymentStatus,
    pub payment: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}
