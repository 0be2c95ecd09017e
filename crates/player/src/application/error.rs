//! Application-level errors and response parsing helpers

use serde::de::DeserializeOwned;
use serde_json::Value;

use ttrpg_domain::DomainError;

use crate::ports::outbound::ApiError;

/// Errors surfaced to callers of the combat application layer
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CombatError {
    /// The controller's event loop has exited; no further commands are accepted.
    #[error("Combat controller has stopped")]
    ControllerClosed,

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Invalid encounter: {0}")]
    InvalidEncounter(#[from] DomainError),
}

/// Typed decoding of raw JSON responses.
pub trait ParseResponse {
    fn parse<T: DeserializeOwned>(self) -> Result<T, ApiError>;
}

impl ParseResponse for Value {
    fn parse<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        serde_json::from_value(self).map_err(|e| ApiError::ParseError(e.to_string()))
    }
}
