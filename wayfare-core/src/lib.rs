pub mod advice;
pub mod catalog;
pub mod city;
pub mod config;
pub mod dates;
pub mod db;
pub mod draft;
pub mod engine;
pub mod error;
pub mod filter;
pub mod help;
pub mod intent;
pub mod ipc;
pub mod models;
pub mod pg_store;
pub mod seats;
pub mod services;
pub mod session_store;
pub mod text;

pub use catalog::{CityCatalog, LayoutCatalog};
pub use city::CityResolver;
pub use config::WayfareConfig;
pub use draft::{BookingDraft, BookingState, DraftView, Stage};
pub use engine::{AuthUser, DialogueEngine, EngineSettings, Navigation, PaymentOutcome, Reply};
pub use error::{AssistantError, StoreError, WayfareError};
pub use help::{HelpConfig, HelpContext, HelpError, HelpResponder, OpenRouterHelpClient};
pub use pg_store::{PgBookingStore, PgFlightStore};
pub use services::{BookingStore, FlightLookup, InMemoryBookingStore, InMemoryFlightStore};
pub use session_store::{InMemorySessionStore, SessionStore};
