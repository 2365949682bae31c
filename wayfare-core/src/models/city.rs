use serde::{Deserialize, Serialize};

/// A resolved (city, IATA) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    pub city: String,
    pub iata: String,
}

impl City {
    pub fn new(city: impl Into<String>, iata: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            iata: iata.into(),
        }
    }
}
