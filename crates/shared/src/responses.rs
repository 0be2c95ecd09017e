//! Response bodies returned by the story engine's combat endpoints

use serde::{Deserialize, Serialize};

use ttrpg_domain::{ActorId, DomainError, Encounter, EncounterId, LocationId};

/// Result of a player action or an NPC turn.
///
/// `POST /v1/combat/{id}/player_action` and `POST /v1/combat/{id}/npc_action`
/// share this shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResponse {
    /// Whether the action was processed (a miss still counts as success)
    pub success: bool,
    /// Primary outcome message ("Hit!", "Miss!", or a rejection reason)
    #[serde(default)]
    pub message: String,
    /// Step-by-step description of what happened
    #[serde(default)]
    pub log: Vec<String>,
    /// Authoritative turn cursor after the action
    #[serde(default)]
    pub new_turn_index: Option<usize>,
    #[serde(default)]
    pub combat_over: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage_dealt: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_hp_remaining: Option<i64>,
    /// Rules-engine outcome tag such as "hit" or "critical_hit"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<String>,
}

impl ActionResponse {
    pub fn resolved(log: Vec<String>, new_turn_index: Option<usize>) -> Self {
        Self {
            success: true,
            message: String::new(),
            log,
            new_turn_index,
            combat_over: false,
            damage_dealt: None,
            target_hp_remaining: None,
            outcome: None,
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            ..Self::resolved(Vec::new(), None)
        }
    }

    pub fn with_combat_over(mut self) -> Self {
        self.combat_over = true;
        self
    }
}

/// Participant row in an encounter response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatParticipantResponse {
    pub actor_id: String,
    pub actor_type: String,
    #[serde(default)]
    pub initiative_roll: i64,
}

/// Encounter as created by `POST /v1/combat/start`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatEncounterResponse {
    pub id: EncounterId,
    pub location_id: LocationId,
    /// "active", "players_win", "npcs_win", ...
    #[serde(default)]
    pub status: String,
    pub turn_order: Vec<String>,
    pub current_turn_index: usize,
    #[serde(default)]
    pub participants: Vec<CombatParticipantResponse>,
}

impl CombatEncounterResponse {
    pub fn into_encounter(self) -> Result<Encounter, DomainError> {
        Encounter::new(
            self.id,
            self.location_id,
            self.turn_order.into_iter().map(ActorId::from).collect(),
            self.current_turn_index,
        )
    }
}

/// FastAPI error body (`{"detail": ...}`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub detail: serde_json::Value,
}

impl ErrorDetail {
    /// The detail as display text; validation errors arrive as JSON arrays.
    pub fn message(&self) -> String {
        match &self.detail {
            serde_json::Value::String(text) => text.clone(),
            other => other.to_string(),
        }
    }
}
