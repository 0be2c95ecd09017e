//! Outbound ports - Interfaces for external services
//!
//! These ports define the contracts that infrastructure adapters must implement,
//! allowing the combat controller to talk to the story engine without
//! depending on concrete implementations.

pub mod api_port;
pub mod combat_service_port;
pub mod raw_api_port;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use api_port::ApiError;
pub use combat_service_port::CombatServicePort;
pub use raw_api_port::RawApiPort;

#[cfg(any(test, feature = "testing"))]
pub use combat_service_port::MockCombatServicePort;
