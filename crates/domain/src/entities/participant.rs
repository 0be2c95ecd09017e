//! Participant entities - Combatants as last fetched from the service
//!
//! A participant is either a player character or an NPC instance. Both are
//! read-only snapshots; a fresh set replaces the old one after every action.

use serde::{Deserialize, Serialize};

use crate::{ActorId, CharacterId, HitPoints, LocationId, NpcInstanceId};

/// A usable ability on a character sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ability {
    pub id: String,
    pub name: String,
}

/// One inventory slot on a character sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryEntry {
    pub item_id: String,
    pub quantity: u32,
}

/// Player character state from the character context endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterSnapshot {
    pub id: CharacterId,
    pub name: String,
    pub hit_points: HitPoints,
    pub abilities: Vec<Ability>,
    pub inventory: Vec<InventoryEntry>,
}

/// NPC instance state from a location's NPC list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NpcSnapshot {
    pub id: NpcInstanceId,
    pub template_id: String,
    pub name_override: Option<String>,
    pub hit_points: HitPoints,
    pub behavior_tags: Vec<String>,
}

impl NpcSnapshot {
    /// Custom name when the instance has one, otherwise the template id.
    pub fn display_name(&self) -> &str {
        self.name_override
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.template_id)
    }
}

/// A location with the NPC instances currently present in it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationSnapshot {
    pub id: LocationId,
    pub name: String,
    pub npcs: Vec<NpcSnapshot>,
}

impl LocationSnapshot {
    pub fn find_npc(&self, id: NpcInstanceId) -> Option<&NpcSnapshot> {
        self.npcs.iter().find(|npc| npc.id == id)
    }
}

/// Which side of the fight a participant is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Players,
    Opponents,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorKind {
    Player,
    Npc,
}

impl ActorKind {
    pub fn side(self) -> Side {
        match self {
            Self::Player => Side::Players,
            Self::Npc => Side::Opponents,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Player => "player",
            Self::Npc => "npc",
        }
    }
}

/// A combatant, tagged with the turn-order identifier it was fetched for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "actor_type", rename_all = "snake_case")]
pub enum Participant {
    Player {
        actor_id: ActorId,
        character: CharacterSnapshot,
    },
    #[serde(rename = "npc")]
    NonPlayer { actor_id: ActorId, npc: NpcSnapshot },
}

impl Participant {
    pub fn player(actor_id: ActorId, character: CharacterSnapshot) -> Self {
        Self::Player {
            actor_id,
            character,
        }
    }

    pub fn npc(actor_id: ActorId, npc: NpcSnapshot) -> Self {
        Self::NonPlayer { actor_id, npc }
    }

    pub fn actor_id(&self) -> &ActorId {
        match self {
            Self::Player { actor_id, .. } | Self::NonPlayer { actor_id, .. } => actor_id,
        }
    }

    pub fn kind(&self) -> ActorKind {
        match self {
            Self::Player { .. } => ActorKind::Player,
            Self::NonPlayer { .. } => ActorKind::Npc,
        }
    }

    pub fn side(&self) -> Side {
        self.kind().side()
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Player { character, .. } => &character.name,
            Self::NonPlayer { npc, .. } => npc.display_name(),
        }
    }

    pub fn hit_points(&self) -> HitPoints {
        match self {
            Self::Player { character, .. } => character.hit_points,
            Self::NonPlayer { npc, .. } => npc.hit_points,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.hit_points().is_alive()
    }

    pub fn as_character(&self) -> Option<&CharacterSnapshot> {
        match self {
            Self::Player { character, .. } => Some(character),
            Self::NonPlayer { .. } => None,
        }
    }
}
