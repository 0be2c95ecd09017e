//! TTRPG Player crate.
//!
//! Combat client for the story engine: the combat controller service, its
//! ports, the HTTP adapter and a terminal presentation.

pub mod application;
pub mod config;
pub mod infrastructure;
pub mod ports;
pub mod ui;

// Re-export commonly used entrypoints
pub use application::api::CombatApi;
pub use application::services::combat::{
    CombatConfig, CombatController, CombatHandle, CombatOutcome, CombatView, PlayerCommand,
};
pub use config::{ConfigError, PlayerConfig};
