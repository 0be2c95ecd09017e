//! Domain vocabulary for turn-based combat encounters.
//!
//! Everything here is plain data with validated constructors. The rules that
//! decide hits and damage live in the story engine; this crate only models
//! what the client is told about an encounter.

pub mod entities;
pub mod error;
pub mod ids;
pub mod value_objects;

pub use entities::{
    Ability, ActorKind, CharacterSnapshot, CursorMove, Encounter, InventoryEntry,
    LocationSnapshot, NpcSnapshot, Participant, Side,
};
pub use error::DomainError;
pub use ids::{ActorId, ActorRef, CharacterId, EncounterId, LocationId, NpcInstanceId};
pub use value_objects::{
    ActionKind, EventLog, HitPoints, PendingAction, DEFAULT_EVENT_LOG_CAPACITY,
};
