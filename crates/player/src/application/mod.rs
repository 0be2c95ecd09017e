pub mod api;
pub mod error;
pub mod services;

pub use error::{CombatError, ParseResponse};
