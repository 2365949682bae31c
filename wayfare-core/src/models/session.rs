use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{City, Flight};
use crate::draft::{BookingDraft, BookingState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

/// Last resolved route. Survives across turns until a new search replaces it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchContext {
    pub from_city: Option<City>,
    pub to_city: Option<City>,
    pub date: Option<String>,
}

/// One conversation's state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub history: Vec<Turn>,
    pub context: SearchContext,
    pub last_search_results: Vec<Flight>,
    pub booking: BookingState,
    pub created_at: DateTime<Utc>,
    pub last_active_at: DateTime<Utc>,
}

impl Session {
    pub fn new(id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            history: Vec::new(),
            context: SearchContext::default(),
            last_search_results: Vec::new(),
            booking: BookingState::Idle,
            created_at: now,
            last_active_at: now,
        }
    }

    pub fn push_user(&mut self, content: &str) {
        self.history.push(Turn {
            role: Role::User,
            content: content.to_string(),
        });
    }

    pub fn push_assistant(&mut self, content: &str) {
        self.history.push(Turn {
            role: Role::Assistant,
            content: content.to_string(),
        });
    }

    pub fn selected_flight(&self) -> Option<&Flight> {
        self.booking.selected_flight()
    }

    pub fn draft(&self) -> Option<&BookingDraft> {
        match &self.booking {
            BookingState::Drafting(draft) => Some(draft),
            _ => None,
        }
    }

    /// Drop the selected flight and any draft, keeping search results.
    pub fn clear_booking(&mut self) {
        self.booking = BookingState::Idle;
    }
}
