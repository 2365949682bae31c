//! Collaborator wiring shared by both transports.

use std::sync::Arc;

use sqlx::PgPool;
use wayfare_core::config::StorageBackend;
use wayfare_core::models::Flight;
use wayfare_core::{
    BookingStore, CityCatalog, CityResolver, DialogueEngine, EngineSettings, FlightLookup,
    HelpConfig, InMemoryBookingStore, InMemoryFlightStore, InMemorySessionStore, LayoutCatalog,
    OpenRouterHelpClient, PgBookingStore, PgFlightStore, WayfareConfig,
};

pub struct AppState {
    pub engine: DialogueEngine,
    pub config: WayfareConfig,
    /// Present only for the postgres storage backend.
    pub pool: Option<PgPool>,
}

impl AppState {
    /// Build the engine and its collaborators from configuration.
    pub async fn from_config(config: WayfareConfig) -> anyhow::Result<Self> {
        let cities = match &config.catalog.cities_file {
            Some(path) => CityCatalog::from_json_file(path)?,
            None => CityCatalog::default(),
        };
        let layouts = match &config.catalog.layouts_file {
            Some(path) => LayoutCatalog::from_json_file(path)?,
            None => LayoutCatalog::default(),
        };

        let (flights, bookings, pool): (Arc<dyn FlightLookup>, Arc<dyn BookingStore>, _) =
            match config.storage.backend {
                StorageBackend::Postgres => {
                    let pool = wayfare_core::db::create_pool(&config.database).await?;
                    (
                        Arc::new(PgFlightStore::new(pool.clone())),
                        Arc::new(PgBookingStore::new(pool.clone())),
                        Some(pool),
                    )
                }
                StorageBackend::Memory => {
                    let flights = match &config.storage.flights_file {
                        Some(path) => InMemoryFlightStore::from_json_file(path)?,
                        None => InMemoryFlightStore::default(),
                    };
                    tracing::info!(flights = flights.len().await, "Using in-memory storage");
                    (
                        Arc::new(flights),
                        Arc::new(InMemoryBookingStore::new()),
                        None,
                    )
                }
            };

        let mut engine = DialogueEngine::new(
            CityResolver::new(cities),
            layouts,
            flights,
            bookings,
            Arc::new(InMemorySessionStore::new()),
        )
        .with_settings(EngineSettings::from(&config.assistant));

        if config.assistant.llm_enabled {
            let help_config = HelpConfig::new(
                None,
                config.assistant.llm_model.clone(),
                config.assistant.llm_base_url.clone(),
            );
            match OpenRouterHelpClient::new(help_config) {
                Ok(client) => {
                    tracing::info!(model = %config.assistant.llm_model, "Help responder enabled");
                    engine = engine.with_help(Arc::new(client));
                }
                Err(e) => tracing::warn!("Help responder disabled: {}", e),
            }
        }

        Ok(Self {
            engine,
            config,
            pool,
        })
    }

    /// In-memory state seeded with `flights`, default catalogs and no help
    /// responder.
    pub fn in_memory(config: WayfareConfig, flights: Vec<Flight>) -> Self {
        let engine = DialogueEngine::new(
            CityResolver::new(CityCatalog::default()),
            LayoutCatalog::default(),
            Arc::new(InMemoryFlightStore::new(flights)),
            Arc::new(InMemoryBookingStore::new()),
            Arc::new(InMemorySessionStore::new()),
        )
        .with_settings(EngineSettings::from(&config.assistant));

        Self {
            engine,
            config,
            pool: None,
        }
    }
}
