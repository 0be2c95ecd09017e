//! Unified error types for the domain layer
//!
//! Constructors in this crate validate their inputs and return
//! [`DomainError`] instead of panicking, so adapters can surface bad server
//! data without crashing the client.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A numeric identifier could not be parsed
    #[error("Invalid ID format: {0}")]
    InvalidId(String),

    /// A turn-order identifier matched neither the player nor the NPC pattern
    #[error("Unknown actor identifier: {0}")]
    InvalidActorId(String),

    /// An encounter must have at least one participant in its turn order
    #[error("Encounter {encounter} has an empty turn order")]
    EmptyTurnOrder { encounter: String },

    /// The turn cursor points past the end of the turn order
    #[error("Turn index {index} is out of range for {len} participants")]
    TurnIndexOutOfRange { index: usize, len: usize },

    /// Generic validation failure
    #[error("Validation failed: {0}")]
    Validation(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
