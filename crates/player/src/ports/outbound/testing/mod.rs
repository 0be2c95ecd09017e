//! Hand-written test doubles for the outbound ports.
//!
//! `MockCombatServicePort` (mockall) covers call expectations; these fakes
//! cover scripted multi-step flows where the world changes between calls.

mod fake_raw_api;
mod scripted_combat_service;

pub use fake_raw_api::{FakeRawApi, RecordedCall};
pub use scripted_combat_service::ScriptedCombatService;
