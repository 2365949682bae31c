use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PassengerType {
    #[default]
    Adult,
    Child,
    Infant,
}

impl PassengerType {
    /// Under 2 is an infant, 2 to 11 a child, everyone else an adult.
    pub fn from_age(age: u8) -> Self {
        match age {
            0..=1 => PassengerType::Infant,
            2..=11 => PassengerType::Child,
            _ => PassengerType::Adult,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PassengerType::Adult => "adult",
            PassengerType::Child => "child",
            PassengerType::Infant => "infant",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeatType {
    Window,
    Aisle,
    Middle,
    #[default]
    NoPref,
}

/// Cabin zone a passenger would like to sit in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeatZone {
    Front,
    Back,
    NearWings,
    NearExit,
    #[default]
    NoPref,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatPreference {
    pub seat_type: SeatType,
    pub location: SeatZone,
}

/// Passenger record, filled in field by field during the dialogue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Passenger {
    pub full_name: Option<String>,
    pub age: Option<u8>,
    pub gender: Option<Gender>,
    #[serde(rename = "type")]
    pub kind: PassengerType,
    #[serde(default)]
    pub seat_pref: SeatPreference,
}

impl Passenger {
    pub fn is_complete(&self) -> bool {
        self.full_name.is_some() && self.age.is_some() && self.gender.is_some()
    }

    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or("(unnamed)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passenger_type_from_age_boundaries() {
        assert_eq!(PassengerType::from_age(1), PassengerType::Infant);
        assert_eq!(PassengerType::from_age(2), PassengerType::Child);
        assert_eq!(PassengerType::from_age(11), PassengerType::Child);
        assert_eq!(PassengerType::from_age(12), PassengerType::Adult);
    }

    #[test]
    fn test_passenger_serializes_type_field() {
        let p = Passenger {
            full_name: Some("Asha Rao".to_string()),
            age: Some(7),
            gender: Some(Gender::Female),
            kind: PassengerType::Child,
            seat_pref: SeatPreference {
                seat_type: SeatType::Window,
                location: SeatZone::NearWings,
            },
        };
        let v = serde_json::to_value(&p).unwrap();
        assert_eq!(v["type"], "child");
        assert_eq!(v["fullName"], "Asha Rao");
        assert_eq!(v["seatPref"]["seatType"], "window");
        assert_eq!(v["seatPref"]["location"], "near_wings");
    }
}
