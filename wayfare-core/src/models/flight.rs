use serde::{Deserialize, Serialize};

/// Flight record as returned by the flight lookup. Read-only to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flight {
    pub id: String,
    pub airline: String,
    pub flight_number: String,
    #[serde(default)]
    pub departure_city: Option<String>,
    pub departure_city_code: String,
    #[serde(default)]
    pub arrival_city: Option<String>,
    pub arrival_city_code: String,
    pub departure_time: String,
    pub arrival_time: String,
    pub price: Option<f64>,
    #[serde(default)]
    pub seats: SeatCapacity,
    #[serde(default)]
    pub aircraft: Aircraft,
}

impl Flight {
    /// Fare for `passengers` travellers; a missing price counts as zero.
    pub fn fare_for(&self, passengers: usize) -> f64 {
        self.price.unwrap_or(0.0) * passengers as f64
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatCapacity {
    pub economy: Option<u32>,
    pub business: Option<u32>,
    pub first: Option<u32>,
}

impl SeatCapacity {
    pub fn for_class(&self, class: TravelClass) -> Option<u32> {
        match class {
            TravelClass::Economy => self.economy,
            TravelClass::Business => self.business,
            TravelClass::First => self.first,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aircraft {
    pub make: String,
    pub model: String,
}

impl Aircraft {
    /// Key into the aircraft layout catalog, e.g. "Airbus A320".
    pub fn layout_key(&self) -> String {
        format!("{} {}", self.make, self.model).trim().to_string()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TravelClass {
    #[default]
    Economy,
    Business,
    First,
}

impl TravelClass {
    /// Lowercase key used by seat capacities and cabin layouts.
    pub fn key(&self) -> &'static str {
        match self {
            TravelClass::Economy => "economy",
            TravelClass::Business => "business",
            TravelClass::First => "first",
        }
    }

    /// Seat identifier prefix, e.g. `E` in `E12A`.
    pub fn seat_prefix(&self) -> char {
        match self {
            TravelClass::Economy => 'E',
            TravelClass::Business => 'B',
            TravelClass::First => 'F',
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TravelClass::Economy => "Economy",
            TravelClass::Business => "Business",
            TravelClass::First => "First",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "economy" => Some(TravelClass::Economy),
            "business" => Some(TravelClass::Business),
            "first" => Some(TravelClass::First),
            _ => None,
        }
    }
}
