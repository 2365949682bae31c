use thiserror::Error;

#[derive(Error, Debug)]
pub enum WayfareError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Catalog error: {0}")]
    Catalog(#[from] serde_json::Error),

    #[error("Other error: {0}")]
    Other(String),
}

/// Failures raised by the flight lookup and booking store collaborators.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Seat conflict: {0:?} already booked")]
    SeatConflict(Vec<String>),

    #[error("Collaborator call timed out after {0}s")]
    Timeout(u64),

    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Engine-level failures. User input problems never surface here; they are
/// answered with a re-prompt instead.
#[derive(Error, Debug)]
pub enum AssistantError {
    #[error("assistant failed: {0}")]
    Collaborator(#[from] StoreError),

    #[error("No booking draft for session {0}")]
    NoDraft(String),

    #[error("Authentication required to create booking")]
    Unauthorized,

    #[error("Invalid seat selection: {0}")]
    InvalidSeats(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),
}

impl AssistantError {
    /// True for failures of an external dependency rather than of the request.
    pub fn is_collaborator_failure(&self) -> bool {
        matches!(self, AssistantError::Collaborator(_))
    }
}
