//! Request payloads sent to the story engine's combat endpoints

use serde::{Deserialize, Serialize};

use ttrpg_domain::{ActionKind, ActorId, CharacterId, LocationId, PendingAction};

/// Body of `POST /v1/combat/{combat_id}/player_action`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerActionRequest {
    pub action: ActionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ability_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,
}

impl PlayerActionRequest {
    /// Normalize a pending action aimed at `target` into the wire payload.
    pub fn from_pending(pending: &PendingAction, target: &ActorId) -> Self {
        Self {
            action: pending.kind(),
            target_id: Some(target.to_string()),
            ability_id: pending.ability_id().map(str::to_string),
            item_id: pending.item_id().map(str::to_string),
        }
    }

    pub fn wait() -> Self {
        Self {
            action: ActionKind::Wait,
            target_id: None,
            ability_id: None,
            item_id: None,
        }
    }
}

/// Body of `POST /v1/combat/start`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatStartRequest {
    pub location_id: LocationId,
    pub player_ids: Vec<String>,
    pub npc_template_ids: Vec<String>,
}

impl CombatStartRequest {
    pub fn new(
        location_id: LocationId,
        players: impl IntoIterator<Item = CharacterId>,
        npc_template_ids: Vec<String>,
    ) -> Self {
        Self {
            location_id,
            player_ids: players
                .into_iter()
                .map(|id| ActorId::player(id).to_string())
                .collect(),
            npc_template_ids,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use ttrpg_domain::{Ability, InventoryEntry};

    #[test]
    fn attack_payload_omits_unused_fields() {
        let body = PlayerActionRequest::from_pending(&PendingAction::attack(), &"npc_5".into());
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"action": "attack", "target_id": "npc_5"})
        );
    }

    #[test]
    fn ability_and_item_payloads_carry_subject_ids() {
        let ability = PendingAction::ability(&Ability {
            id: "fireball".into(),
            name: "Fireball".into(),
        });
        let body = PlayerActionRequest::from_pending(&ability, &"npc_2".into());
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"action": "use_ability", "target_id": "npc_2", "ability_id": "fireball"})
        );

        let item = PendingAction::item(&InventoryEntry {
            item_id: "potion_health_small".into(),
            quantity: 1,
        });
        let body = PlayerActionRequest::from_pending(&item, &"npc_2".into());
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"action": "use_item", "target_id": "npc_2", "item_id": "potion_health_small"})
        );
    }

    #[test]
    fn wait_payload_has_no_target() {
        assert_eq!(
            serde_json::to_value(PlayerActionRequest::wait()).unwrap(),
            json!({"action": "wait"})
        );
    }

    #[test]
    fn start_request_uses_player_prefixed_ids() {
        let body = CombatStartRequest::new(
            LocationId::new(4),
            [CharacterId::new(1)],
            vec!["goblin_scout".into()],
        );
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"location_id": 4, "player_ids": ["player_1"], "npc_template_ids": ["goblin_scout"]})
        );
    }
}
