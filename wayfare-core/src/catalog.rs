//! Static reference data: the city → IATA table and per-aircraft cabin layouts.
//!
//! Both catalogs ship with built-in defaults and can be replaced by JSON files
//! named in `[catalog]`. They are loaded once at startup and never mutated.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::WayfareError;
use crate::models::{City, TravelClass};

const DEFAULT_CITIES: &[(&str, &str)] = &[
    ("Delhi", "DEL"),
    ("Mumbai", "BOM"),
    ("Bengaluru", "BLR"),
    ("Chennai", "MAA"),
    ("Kolkata", "CCU"),
    ("Hyderabad", "HYD"),
    ("Ahmedabad", "AMD"),
    ("Pune", "PNQ"),
    ("Goa", "GOI"),
    ("Jaipur", "JAI"),
    ("Lucknow", "LKO"),
    ("Kochi", "COK"),
    ("Thiruvananthapuram", "TRV"),
    ("Guwahati", "GAU"),
    ("Bhubaneswar", "BBI"),
    ("Patna", "PAT"),
    ("Indore", "IDR"),
    ("Nagpur", "NAG"),
    ("Chandigarh", "IXC"),
    ("Coimbatore", "CJB"),
    ("Srinagar", "SXR"),
    ("Varanasi", "VNS"),
    ("Amritsar", "ATQ"),
    ("Visakhapatnam", "VTZ"),
    ("Madurai", "IXM"),
    ("Mangaluru", "IXE"),
    ("Ranchi", "IXR"),
    ("Raipur", "RPR"),
    ("Bhopal", "BHO"),
    ("Vadodara", "BDQ"),
    ("Udaipur", "UDR"),
    ("Dehradun", "DED"),
    ("Leh", "IXL"),
    ("Port Blair", "IXZ"),
    ("Tiruchirappalli", "TRZ"),
    ("Vijayawada", "VGA"),
    ("Tirupati", "TIR"),
    ("Surat", "STV"),
    ("Jammu", "IXJ"),
    ("Imphal", "IMF"),
    ("Agartala", "IXA"),
    ("Bagdogra", "IXB"),
    ("Dibrugarh", "DIB"),
    ("Jodhpur", "JDH"),
    ("Aurangabad", "IXU"),
    ("Rajkot", "RAJ"),
    ("Hubballi", "HBX"),
    ("Belagavi", "IXG"),
    ("Mysuru", "MYQ"),
    ("Kozhikode", "CCJ"),
    ("Kannur", "CNN"),
    ("Dubai", "DXB"),
    ("Abu Dhabi", "AUH"),
    ("Sharjah", "SHJ"),
    ("Doha", "DOH"),
    ("Muscat", "MCT"),
    ("Riyadh", "RUH"),
    ("Jeddah", "JED"),
    ("Singapore", "SIN"),
    ("Kuala Lumpur", "KUL"),
    ("Bangkok", "BKK"),
    ("Colombo", "CMB"),
    ("Kathmandu", "KTM"),
    ("Dhaka", "DAC"),
    ("Hong Kong", "HKG"),
    ("Tokyo", "NRT"),
    ("Sydney", "SYD"),
    ("London", "LHR"),
    ("Paris", "CDG"),
    ("Frankfurt", "FRA"),
    ("New York", "JFK"),
    ("San Francisco", "SFO"),
    ("Toronto", "YYZ"),
];

// ============================================================================
// City catalog
// ============================================================================

#[derive(Debug, Clone)]
pub struct CityCatalog {
    entries: Vec<City>,
}

impl Default for CityCatalog {
    fn default() -> Self {
        Self {
            entries: DEFAULT_CITIES
                .iter()
                .map(|(city, iata)| City::new(*city, *iata))
                .collect(),
        }
    }
}

impl CityCatalog {
    pub fn new(entries: Vec<City>) -> Self {
        Self { entries }
    }

    /// Load a JSON object of `{"City": "IATA", ...}`.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, WayfareError> {
        let raw = std::fs::read_to_string(path)?;
        let map: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&raw)?;
        let entries = map
            .into_iter()
            .filter_map(|(city, code)| code.as_str().map(|c| City::new(city, c.to_uppercase())))
            .collect();
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[City] {
        &self.entries
    }

    pub fn by_code(&self, iata: &str) -> Option<&City> {
        self.entries.iter().find(|c| c.iata.eq_ignore_ascii_case(iata))
    }

    pub fn by_name(&self, name: &str) -> Option<&City> {
        self.entries.iter().find(|c| c.city.eq_ignore_ascii_case(name))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// Aircraft layout catalog
// ============================================================================

/// Column arrangement of one cabin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CabinLayout {
    pub layout: Vec<String>,
    pub seats_per_row: usize,
}

impl CabinLayout {
    pub fn new(columns: &[&str]) -> Self {
        Self {
            layout: columns.iter().map(|c| c.to_string()).collect(),
            seats_per_row: columns.len(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AircraftLayout {
    pub economy: Option<CabinLayout>,
    pub business: Option<CabinLayout>,
    pub first: Option<CabinLayout>,
}

impl AircraftLayout {
    pub fn cabin(&self, class: TravelClass) -> Option<&CabinLayout> {
        match class {
            TravelClass::Economy => self.economy.as_ref(),
            TravelClass::Business => self.business.as_ref(),
            TravelClass::First => self.first.as_ref(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LayoutCatalog {
    layouts: HashMap<String, AircraftLayout>,
}

impl Default for LayoutCatalog {
    fn default() -> Self {
        let narrow = || AircraftLayout {
            economy: Some(CabinLayout::new(&["A", "B", "C", "D", "E", "F"])),
            business: Some(CabinLayout::new(&["A", "C", "D", "F"])),
            first: None,
        };
        let turboprop = || AircraftLayout {
            economy: Some(CabinLayout::new(&["A", "B", "C", "D"])),
            business: Some(CabinLayout::new(&["A", "D"])),
            first: None,
        };

        let mut layouts = HashMap::new();
        layouts.insert(
            "Boeing 787 Dreamliner".to_string(),
            AircraftLayout {
                economy: Some(CabinLayout::new(&["A", "B", "C", "D", "E", "F", "G", "H", "J"])),
                business: Some(CabinLayout::new(&["A", "C", "D", "F"])),
                first: Some(CabinLayout::new(&["A", "D", "G", "J"])),
            },
        );
        for key in [
            "Boeing 737 MAX",
            "Boeing 737",
            "Airbus A320",
            "Airbus A320neo",
            "Airbus A321",
            "Airbus A321neo",
            "Airbus A319",
        ] {
            layouts.insert(key.to_string(), narrow());
        }
        for key in ["Airbus ATR 42-600", "Airbus ATR 72-600"] {
            layouts.insert(key.to_string(), turboprop());
        }
        Self { layouts }
    }
}

impl LayoutCatalog {
    pub fn empty() -> Self {
        Self {
            layouts: HashMap::new(),
        }
    }

    /// Load a JSON object of `{"<make> <model>": {"economy": {...}, ...}}`.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, WayfareError> {
        let raw = std::fs::read_to_string(path)?;
        let layouts: HashMap<String, AircraftLayout> = serde_json::from_str(&raw)?;
        Ok(Self { layouts })
    }

    pub fn get(&self, key: &str) -> Option<&AircraftLayout> {
        self.layouts.get(key)
    }

    pub fn cabin(&self, key: &str, class: TravelClass) -> Option<&CabinLayout> {
        self.get(key).and_then(|l| l.cabin(class))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_cities_have_unique_codes() {
        let catalog = CityCatalog::default();
        let mut codes: Vec<_> = catalog.entries().iter().map(|c| c.iata.clone()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), catalog.len());
    }

    #[test]
    fn test_lookup_by_code_and_name_ignores_case() {
        let catalog = CityCatalog::default();
        assert_eq!(catalog.by_code("maa").unwrap().city, "Chennai");
        assert_eq!(catalog.by_name("DELHI").unwrap().iata, "DEL");
    }

    #[test]
    fn test_layout_catalog_knows_dreamliner_first_class() {
        let catalog = LayoutCatalog::default();
        let first = catalog
            .cabin("Boeing 787 Dreamliner", TravelClass::First)
            .unwrap();
        assert_eq!(first.layout, vec!["A", "D", "G", "J"]);
        assert!(catalog.cabin("Airbus A320", TravelClass::First).is_none());
    }

    #[test]
    fn test_layout_json_round_trips_camel_case() {
        let raw = r#"{"Embraer E190": {"economy": {"layout": ["A","C","D","F"], "seatsPerRow": 4}}}"#;
        let layouts: HashMap<String, AircraftLayout> = serde_json::from_str(raw).unwrap();
        let e190 = &layouts["Embraer E190"];
        assert_eq!(e190.economy.as_ref().unwrap().seats_per_row, 4);
        assert!(e190.business.is_none());
    }
}
