use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Numeric identifiers assigned by the story engine's database.
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            pub const fn new(value: u64) -> Self {
                Self(value)
            }

            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for u64 {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl FromStr for $name {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim()
                    .parse::<u64>()
                    .map(Self)
                    .map_err(|_| DomainError::InvalidId(format!("{}: {s}", stringify!($name))))
            }
        }
    };
}

define_id!(EncounterId);
define_id!(LocationId);
define_id!(CharacterId);
define_id!(NpcInstanceId);

const PLAYER_PREFIX: &str = "player_";
const NPC_PREFIX: &str = "npc_";

/// Turn-order identifier as issued by the story engine (`player_1`, `npc_12`).
///
/// The raw string is kept as-is so that identifiers the client does not
/// understand can still be displayed and compared.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(String);

impl ActorId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn player(character_id: CharacterId) -> Self {
        Self(format!("{PLAYER_PREFIX}{character_id}"))
    }

    pub fn npc(instance_id: NpcInstanceId) -> Self {
        Self(format!("{NPC_PREFIX}{instance_id}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Classify this identifier by its prefix.
    pub fn resolve(&self) -> Result<ActorRef, DomainError> {
        if let Some(rest) = self.0.strip_prefix(PLAYER_PREFIX) {
            return rest
                .parse::<CharacterId>()
                .map(ActorRef::Player)
                .map_err(|_| DomainError::InvalidActorId(self.0.clone()));
        }
        if let Some(rest) = self.0.strip_prefix(NPC_PREFIX) {
            return rest
                .parse::<NpcInstanceId>()
                .map(ActorRef::Npc)
                .map_err(|_| DomainError::InvalidActorId(self.0.clone()));
        }
        Err(DomainError::InvalidActorId(self.0.clone()))
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ActorId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ActorId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// What a turn-order identifier points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActorRef {
    Player(CharacterId),
    Npc(NpcInstanceId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_player_and_npc_prefixes() {
        assert_eq!(
            ActorId::from("player_1").resolve().unwrap(),
            ActorRef::Player(CharacterId::new(1))
        );
        assert_eq!(
            ActorId::from("npc_12").resolve().unwrap(),
            ActorRef::Npc(NpcInstanceId::new(12))
        );
    }

    #[test]
    fn rejects_unknown_or_malformed_identifiers() {
        for raw in ["trap_3", "player_", "npc_x", "", "PLAYER_1"] {
            let err = ActorId::from(raw).resolve().unwrap_err();
            assert!(matches!(err, DomainError::InvalidActorId(ref id) if id == raw));
        }
    }

    #[test]
    fn constructors_round_trip_through_resolve() {
        let id = ActorId::npc(NpcInstanceId::new(5));
        assert_eq!(id.as_str(), "npc_5");
        assert_eq!(id.resolve().unwrap(), ActorRef::Npc(NpcInstanceId::new(5)));
        assert_eq!(ActorId::player(CharacterId::new(7)).to_string(), "player_7");
    }

    #[test]
    fn actor_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&ActorId::from("npc_5")).unwrap();
        assert_eq!(json, "\"npc_5\"");
    }
}
