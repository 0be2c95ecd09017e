//! Application services

pub mod combat;

pub use combat::{CombatConfig, CombatController, CombatHandle};
