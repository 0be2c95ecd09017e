//! Immutable snapshots published to the presentation layer

use ttrpg_domain::{ActorId, ActorKind, EncounterId};

use super::state::{CombatOutcome, CombatState, Menu, MenuKind};
use super::transitions::PlayerCommand;

/// One row of the participant list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantView {
    pub actor_id: ActorId,
    pub kind: ActorKind,
    pub name: String,
    /// `cur / max`
    pub hp: String,
    pub alive: bool,
    pub active: bool,
}

/// A selectable menu entry and the command it issues
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuOption {
    pub label: String,
    pub command: PlayerCommand,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuView {
    pub kind: MenuKind,
    pub title: String,
    pub options: Vec<MenuOption>,
}

impl MenuView {
    /// Whether any option is offered at all; waiting and terminal states have none.
    pub fn is_interactive(&self) -> bool {
        !self.options.is_empty()
    }
}

/// Everything a renderer needs after a state change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombatView {
    pub encounter_id: EncounterId,
    pub active_actor: ActorId,
    pub is_local_turn: bool,
    pub processing: bool,
    pub participants: Vec<ParticipantView>,
    pub menu: MenuView,
    /// Newest first
    pub log: Vec<String>,
    pub outcome: Option<CombatOutcome>,
    pub ended: bool,
}

impl CombatView {
    pub fn from_state(state: &CombatState) -> Self {
        let active = state.encounter().active_actor();
        let participants = state
            .participants()
            .iter()
            .map(|p| ParticipantView {
                actor_id: p.actor_id().clone(),
                kind: p.kind(),
                name: p.name().to_string(),
                hp: p.hit_points().to_string(),
                alive: p.is_alive(),
                active: p.actor_id() == active,
            })
            .collect();

        Self {
            encounter_id: state.encounter().id(),
            active_actor: active.clone(),
            is_local_turn: state.is_local_turn(),
            processing: state.is_processing(),
            participants,
            menu: menu_view(state),
            log: state.log().to_vec(),
            outcome: state.outcome(),
            ended: state.is_ended(),
        }
    }

    pub fn participant(&self, actor_id: &str) -> Option<&ParticipantView> {
        self.participants
            .iter()
            .find(|p| p.actor_id.as_str() == actor_id)
    }
}

fn option(label: impl Into<String>, command: PlayerCommand, enabled: bool) -> MenuOption {
    MenuOption {
        label: label.into(),
        command,
        enabled,
    }
}

fn menu_view(state: &CombatState) -> MenuView {
    let enabled = !state.is_processing() && state.outcome().is_none();
    let character = state.local_character();
    let menu = state.menu();

    let (title, options) = match menu {
        Menu::Loading => ("Loading Combat...".to_string(), Vec::new()),
        Menu::Main => {
            let has_abilities = character.is_some_and(|c| !c.abilities.is_empty());
            let has_items = character.is_some_and(|c| !c.inventory.is_empty());
            (
                "Choose Action:".to_string(),
                vec![
                    option("Attack", PlayerCommand::Attack, enabled),
                    option("Use Ability", PlayerCommand::OpenAbilities, enabled && has_abilities),
                    option("Use Item", PlayerCommand::OpenItems, enabled && has_items),
                ],
            )
        }
        Menu::SelectAbility => {
            let mut options: Vec<_> = character
                .map(|c| c.abilities.as_slice())
                .unwrap_or_default()
                .iter()
                .map(|a| option(&a.name, PlayerCommand::ChooseAbility(a.id.clone()), enabled))
                .collect();
            options.push(option("Back", PlayerCommand::Back, enabled));
            ("Choose Ability:".to_string(), options)
        }
        Menu::SelectItem => {
            let mut options: Vec<_> = character
                .map(|c| c.inventory.as_slice())
                .unwrap_or_default()
                .iter()
                .map(|i| {
                    option(
                        format!("{} (x{})", i.item_id, i.quantity),
                        PlayerCommand::ChooseItem(i.item_id.clone()),
                        enabled,
                    )
                })
                .collect();
            options.push(option("Back", PlayerCommand::Back, enabled));
            ("Choose Item:".to_string(), options)
        }
        Menu::SelectTarget(pending) => {
            let mut options: Vec<_> = state
                .living_opponents()
                .map(|p| {
                    option(
                        format!("{} (HP: {})", p.actor_id(), p.hit_points()),
                        PlayerCommand::ChooseTarget(p.actor_id().clone()),
                        enabled,
                    )
                })
                .collect();
            options.push(option("Back", PlayerCommand::Back, enabled));
            (format!("Select Target for {}:", pending.label()), options)
        }
        Menu::WaitingOnOpponent => (
            format!("Waiting for {}...", state.encounter().active_actor()),
            Vec::new(),
        ),
        Menu::UnknownActor(actor_id) => (format!("Unknown actor state: {actor_id}"), Vec::new()),
        Menu::CombatOver(outcome) => (outcome.message().to_string(), Vec::new()),
    };

    MenuView {
        kind: menu.kind(),
        title,
        options,
    }
}
