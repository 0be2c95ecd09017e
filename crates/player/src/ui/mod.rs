//! Presentation layer
//!
//! Reads `CombatView` snapshots and turns input into `PlayerCommand`s. No
//! combat logic lives here.

pub mod terminal;
