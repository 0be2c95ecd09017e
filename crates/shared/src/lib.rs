//! TTRPG Shared - Wire types for the story engine's REST API
//!
//! This crate contains the request and response bodies exchanged with the
//! story engine, plus conversions into domain snapshots:
//! - Combat action requests and their resolutions
//! - Encounter creation
//! - Character and location context
//!
//! # Design Principles
//!
//! 1. **No business logic** - Pure data types and serialization
//! 2. **Lenient reads** - Unknown fields are ignored and optional fields default,
//!    because the services evolve independently of the client

pub mod character_sheet;
pub mod location;
pub mod requests;
pub mod responses;

pub use character_sheet::{
    AbilitiesData, AbilityEntryData, CharacterContextResponse, CharacterSheetData,
    CombatStatsData, InventoryItemData,
};
pub use location::{LocationContextResponse, NpcInstanceData};
pub use requests::{CombatStartRequest, PlayerActionRequest};
pub use responses::{
    ActionResponse, CombatEncounterResponse, CombatParticipantResponse, ErrorDetail,
};
