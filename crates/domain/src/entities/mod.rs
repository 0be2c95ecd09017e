//! Domain entities - Core combat objects with identity

mod encounter;
mod participant;

pub use encounter::{CursorMove, Encounter};
pub use participant::{
    Ability, ActorKind, CharacterSnapshot, InventoryEntry, LocationSnapshot, NpcSnapshot,
    Participant, Side,
};
