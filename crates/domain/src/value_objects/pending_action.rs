use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Ability, InventoryEntry};

/// Action vocabulary understood by the combat service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Attack,
    UseAbility,
    UseItem,
    Wait,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Attack => "attack",
            Self::UseAbility => "use_ability",
            Self::UseItem => "use_item",
            Self::Wait => "wait",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An action the player has picked but not yet aimed.
///
/// Lives only between choosing the action and choosing its target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingAction {
    kind: ActionKind,
    /// Ability id or item id, depending on `kind`
    subject_id: Option<String>,
    label: String,
}

impl PendingAction {
    pub fn attack() -> Self {
        Self {
            kind: ActionKind::Attack,
            subject_id: None,
            label: "Attack".to_string(),
        }
    }

    pub fn ability(ability: &Ability) -> Self {
        Self {
            kind: ActionKind::UseAbility,
            subject_id: Some(ability.id.clone()),
            label: format!("Ability: {}", ability.name),
        }
    }

    pub fn item(entry: &InventoryEntry) -> Self {
        Self {
            kind: ActionKind::UseItem,
            subject_id: Some(entry.item_id.clone()),
            label: format!("Item: {}", entry.item_id),
        }
    }

    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn ability_id(&self) -> Option<&str> {
        match self.kind {
            ActionKind::UseAbility => self.subject_id.as_deref(),
            _ => None,
        }
    }

    pub fn item_id(&self) -> Option<&str> {
        match self.kind {
            ActionKind::UseItem => self.subject_id.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_match_menu_wording() {
        let ability = Ability {
            id: "fireball".into(),
            name: "Fireball".into(),
        };
        let item = InventoryEntry {
            item_id: "potion_health_small".into(),
            quantity: 2,
        };
        assert_eq!(PendingAction::attack().label(), "Attack");
        assert_eq!(PendingAction::ability(&ability).label(), "Ability: Fireball");
        assert_eq!(
            PendingAction::item(&item).label(),
            "Item: potion_health_small"
        );
    }

    #[test]
    fn subject_id_is_exposed_only_for_matching_kind() {
        let ability = Ability {
            id: "cleave".into(),
            name: "Cleave".into(),
        };
        let pending = PendingAction::ability(&ability);
        assert_eq!(pending.ability_id(), Some("cleave"));
        assert_eq!(pending.item_id(), None);
        assert_eq!(PendingAction::attack().ability_id(), None);
    }
}
