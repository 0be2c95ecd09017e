//! Transition table for the combat controller
//!
//! `apply` folds one event into [`CombatState`] and returns the effects the
//! controller must run. It never performs I/O, so every transition can be
//! exercised directly in tests.

use ttrpg_domain::{ActorId, CursorMove, PendingAction};
use ttrpg_shared::{ActionResponse, PlayerActionRequest};

use super::refresh::Roster;
use super::state::{CombatState, Menu, MenuKind, Phase};
use crate::ports::outbound::ApiError;

/// A player's menu choice
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerCommand {
    Attack,
    OpenAbilities,
    OpenItems,
    ChooseAbility(String),
    ChooseItem(String),
    ChooseTarget(ActorId),
    Back,
}

/// Fieldless discriminant of [`PlayerCommand`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Attack,
    OpenAbilities,
    OpenItems,
    ChooseAbility,
    ChooseItem,
    ChooseTarget,
    Back,
}

impl CommandKind {
    pub const ALL: [CommandKind; 7] = [
        CommandKind::Attack,
        CommandKind::OpenAbilities,
        CommandKind::OpenItems,
        CommandKind::ChooseAbility,
        CommandKind::ChooseItem,
        CommandKind::ChooseTarget,
        CommandKind::Back,
    ];
}

impl PlayerCommand {
    pub fn kind(&self) -> CommandKind {
        match self {
            Self::Attack => CommandKind::Attack,
            Self::OpenAbilities => CommandKind::OpenAbilities,
            Self::OpenItems => CommandKind::OpenItems,
            Self::ChooseAbility(_) => CommandKind::ChooseAbility,
            Self::ChooseItem(_) => CommandKind::ChooseItem,
            Self::ChooseTarget(_) => CommandKind::ChooseTarget,
            Self::Back => CommandKind::Back,
        }
    }
}

/// Where a legal menu command leads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuStep {
    To(MenuKind),
    Submit,
}

/// The static menu table. `None` means the command is not offered in `from`.
pub fn menu_transition(from: MenuKind, command: CommandKind) -> Option<MenuStep> {
    use CommandKind as C;
    use MenuKind as M;

    match (from, command) {
        (M::Main, C::Attack) => Some(MenuStep::To(M::SelectTarget)),
        (M::Main, C::OpenAbilities) => Some(MenuStep::To(M::SelectAbility)),
        (M::Main, C::OpenItems) => Some(MenuStep::To(M::SelectItem)),
        (M::SelectAbility, C::ChooseAbility) => Some(MenuStep::To(M::SelectTarget)),
        (M::SelectItem, C::ChooseItem) => Some(MenuStep::To(M::SelectTarget)),
        (M::SelectTarget, C::ChooseTarget) => Some(MenuStep::Submit),
        (M::SelectAbility | M::SelectItem | M::SelectTarget, C::Back) => {
            Some(MenuStep::To(M::Main))
        }
        _ => None,
    }
}

/// Why a command was ignored
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandRejected {
    #[error("combat is over")]
    CombatOver,
    #[error("a request is already in flight")]
    Busy,
    #[error("it is not the local player's turn")]
    NotYourTurn,
    #[error("{command:?} is not available in {menu:?}")]
    NotOffered { menu: MenuKind, command: CommandKind },
    #[error("no {0} available")]
    NothingToChoose(&'static str),
    #[error("unknown choice: {0}")]
    UnknownChoice(String),
    #[error("{0} is not a living opponent")]
    InvalidTarget(ActorId),
}

/// Everything the controller's event queue carries
#[derive(Debug, Clone)]
pub enum CombatEvent {
    Start,
    Command(PlayerCommand),
    ActionSubmitted(Result<ActionResponse, ApiError>),
    OpponentTurnResolved(Result<ActionResponse, ApiError>),
    ParticipantsRefreshed(Roster),
    RetryOpponentTurn,
    SettleElapsed,
    Exit,
}

/// Work requested by a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    SubmitAction(PlayerActionRequest),
    ResolveOpponentTurn,
    RefreshParticipants,
    ScheduleOpponentRetry,
    /// Start the settle timer that ends the controller
    ScheduleExit,
    /// Cancel everything still running and stop
    Teardown,
}

pub fn apply(state: &mut CombatState, event: CombatEvent) -> Vec<Effect> {
    if state.ended {
        tracing::debug!(?event, "Event after combat ended, discarding");
        return Vec::new();
    }

    match event {
        CombatEvent::Start => start(state),
        CombatEvent::Command(command) => match handle_command(state, command) {
            Ok(effects) => effects,
            Err(rejected) => {
                tracing::debug!(reason = %rejected, "Command rejected");
                Vec::new()
            }
        },
        CombatEvent::ActionSubmitted(result) => action_submitted(state, result),
        CombatEvent::OpponentTurnResolved(result) => opponent_turn_resolved(state, result),
        CombatEvent::ParticipantsRefreshed(roster) => participants_refreshed(state, roster),
        CombatEvent::RetryOpponentTurn => retry_opponent_turn(state),
        CombatEvent::SettleElapsed => {
            if state.outcome.is_some() {
                state.ended = true;
                vec![Effect::Teardown]
            } else {
                Vec::new()
            }
        }
        CombatEvent::Exit => {
            state.ended = true;
            vec![Effect::Teardown]
        }
    }
}

fn start(state: &mut CombatState) -> Vec<Effect> {
    if state.menu != Menu::Loading || state.phase != Phase::Idle {
        return Vec::new();
    }
    state.log.push("Combat started!");
    state.phase = Phase::Refreshing;
    vec![Effect::RefreshParticipants]
}

/// Apply one menu command, or explain why it was ignored.
pub fn handle_command(
    state: &mut CombatState,
    command: PlayerCommand,
) -> Result<Vec<Effect>, CommandRejected> {
    if state.outcome.is_some() {
        return Err(CommandRejected::CombatOver);
    }
    if state.is_processing() {
        return Err(CommandRejected::Busy);
    }
    if !state.is_local_turn() {
        return Err(CommandRejected::NotYourTurn);
    }

    let menu = state.menu.kind();
    let step = menu_transition(menu, command.kind()).ok_or(CommandRejected::NotOffered {
        menu,
        command: command.kind(),
    })?;

    match (step, command) {
        (MenuStep::To(MenuKind::Main), _) => {
            state.menu = Menu::Main;
        }
        (MenuStep::To(MenuKind::SelectAbility), _) => {
            let has_abilities = state
                .local_character()
                .is_some_and(|c| !c.abilities.is_empty());
            if !has_abilities {
                return Err(CommandRejected::NothingToChoose("abilities"));
            }
            state.menu = Menu::SelectAbility;
        }
        (MenuStep::To(MenuKind::SelectItem), _) => {
            let has_items = state
                .local_character()
                .is_some_and(|c| !c.inventory.is_empty());
            if !has_items {
                return Err(CommandRejected::NothingToChoose("items"));
            }
            state.menu = Menu::SelectItem;
        }
        (MenuStep::To(MenuKind::SelectTarget), PlayerCommand::Attack) => {
            state.menu = Menu::SelectTarget(PendingAction::attack());
        }
        (MenuStep::To(MenuKind::SelectTarget), PlayerCommand::ChooseAbility(ability_id)) => {
            let pending = state
                .local_character()
                .and_then(|c| c.abilities.iter().find(|a| a.id == ability_id))
                .map(PendingAction::ability)
                .ok_or(CommandRejected::UnknownChoice(ability_id))?;
            state.menu = Menu::SelectTarget(pending);
        }
        (MenuStep::To(MenuKind::SelectTarget), PlayerCommand::ChooseItem(item_id)) => {
            let pending = state
                .local_character()
                .and_then(|c| c.inventory.iter().find(|i| i.item_id == item_id))
                .map(PendingAction::item)
                .ok_or(CommandRejected::UnknownChoice(item_id))?;
            state.menu = Menu::SelectTarget(pending);
        }
        (MenuStep::Submit, PlayerCommand::ChooseTarget(target)) => {
            if !state.is_living_opponent(&target) {
                return Err(CommandRejected::InvalidTarget(target));
            }
            let Menu::SelectTarget(pending) = std::mem::replace(&mut state.menu, Menu::Main)
            else {
                return Err(CommandRejected::NotOffered {
                    menu,
                    command: CommandKind::ChooseTarget,
                });
            };
            tracing::info!(
                action = %pending.kind(),
                target = %target,
                "Submitting player action"
            );
            state.phase = Phase::Submitting;
            return Ok(vec![Effect::SubmitAction(
                PlayerActionRequest::from_pending(&pending, &target),
            )]);
        }
        (step, command) => {
            tracing::warn!(?step, ?command, "Menu table and command handling disagree");
            return Err(CommandRejected::NotOffered {
                menu,
                command: command.kind(),
            });
        }
    }

    Ok(Vec::new())
}

fn action_submitted(
    state: &mut CombatState,
    result: Result<ActionResponse, ApiError>,
) -> Vec<Effect> {
    if state.phase != Phase::Submitting {
        tracing::debug!("Stale action response, discarding");
        return Vec::new();
    }
    state.phase = Phase::Idle;
    state.menu = Menu::Main;

    match result {
        Ok(response) if response.success => resolved(state, response),
        Ok(response) => {
            for line in &response.log {
                tracing::debug!(line = %line, "Service log (rejected action)");
            }
            tracing::warn!(message = %response.message, "Action rejected by service");
            state.log.push(format!("Action failed: {}", response.message));
            Vec::new()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Action submission failed");
            state.log.push(format!("Action failed: {e}"));
            Vec::new()
        }
    }
}

fn opponent_turn_resolved(
    state: &mut CombatState,
    result: Result<ActionResponse, ApiError>,
) -> Vec<Effect> {
    if state.phase != Phase::ResolvingOpponent {
        tracing::debug!("Stale opponent turn response, discarding");
        return Vec::new();
    }
    state.phase = Phase::Idle;

    let message = match result {
        Ok(response) if response.success => return resolved(state, response),
        Ok(response) => response.message,
        Err(e) => e.to_string(),
    };
    tracing::warn!(
        actor_id = %state.encounter.active_actor(),
        error = %message,
        "Opponent turn failed, will retry"
    );
    state.log.push(format!("Opponent turn failed: {message}"));
    vec![Effect::ScheduleOpponentRetry]
}

/// Shared tail of a successful player action or opponent turn.
fn resolved(state: &mut CombatState, response: ActionResponse) -> Vec<Effect> {
    for line in &response.log {
        tracing::debug!(line = %line, "Service log");
    }
    state.log.push_batch(response.log);

    if response.combat_over {
        tracing::info!("Service reports combat over, awaiting refresh");
    } else {
        match state.encounter.advance(response.new_turn_index) {
            CursorMove::Optimistic(index) if response.new_turn_index.is_some() => {
                tracing::warn!(
                    reported = ?response.new_turn_index,
                    fallback = index,
                    "Reported turn index out of range, wrapping"
                );
            }
            movement => {
                tracing::debug!(index = movement.index(), "Turn cursor moved");
            }
        }
    }

    state.menu = if state.is_local_turn() {
        Menu::Main
    } else {
        Menu::WaitingOnOpponent
    };
    state.phase = Phase::Refreshing;
    vec![Effect::RefreshParticipants]
}

fn participants_refreshed(state: &mut CombatState, roster: Roster) -> Vec<Effect> {
    if state.phase != Phase::Refreshing {
        tracing::debug!("Stale participant refresh, discarding");
        return Vec::new();
    }
    state.phase = Phase::Idle;

    for failure in &roster.failures {
        state.log.push(format!(
            "Error fetching data for {}: {}",
            failure.actor_id, failure.reason
        ));
    }
    state.unconfirmed_sides = roster.unconfirmed_sides();
    let encounter = &state.encounter;
    state.participants = roster
        .participants
        .into_iter()
        .filter(|p| encounter.contains(p.actor_id()))
        .collect();
    state.refreshed = true;

    if let Some(effect) = check_combat_end(state) {
        return vec![effect];
    }
    if state.outcome.is_some() {
        return Vec::new();
    }
    evaluate_turn(state)
}

/// Decide the outcome from the current cache.
///
/// Logs the result and asks for the exit timer exactly once per encounter;
/// later calls are no-ops.
pub fn check_combat_end(state: &mut CombatState) -> Option<Effect> {
    if state.outcome.is_some() {
        return None;
    }
    let outcome = state.decide_outcome()?;

    tracing::info!(outcome = %outcome, "Combat over");
    state.outcome = Some(outcome);
    state.menu = Menu::CombatOver(outcome);
    state.log.push(outcome.message());
    Some(Effect::ScheduleExit)
}

/// The identifier under the cursor alone decides what happens next.
fn evaluate_turn(state: &mut CombatState) -> Vec<Effect> {
    let active = state.encounter.active_actor().clone();

    if active == state.local_actor {
        state.menu = Menu::Main;
        return Vec::new();
    }

    match active.resolve() {
        Ok(_) => {
            tracing::debug!(actor_id = %active, "Opponent turn");
            state.menu = Menu::WaitingOnOpponent;
            state.phase = Phase::ResolvingOpponent;
            vec![Effect::ResolveOpponentTurn]
        }
        Err(_) => {
            tracing::warn!(actor_id = %active, "Active participant is not a known actor type");
            state.log.push(format!("Unknown actor state: {active}"));
            state.menu = Menu::UnknownActor(active);
            Vec::new()
        }
    }
}

fn retry_opponent_turn(state: &mut CombatState) -> Vec<Effect> {
    if state.menu != Menu::WaitingOnOpponent
        || state.phase != Phase::Idle
        || state.outcome.is_some()
    {
        return Vec::new();
    }
    state.phase = Phase::ResolvingOpponent;
    vec![Effect::ResolveOpponentTurn]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::combat::refresh::FetchFailure;
    use crate::application::services::combat::state::CombatOutcome;
    use crate::application::services::combat::view::CombatView;
    use ttrpg_domain::{
        Ability, CharacterId, CharacterSnapshot, Encounter, EncounterId, HitPoints,
        InventoryEntry, LocationId, NpcInstanceId, NpcSnapshot, Participant, Side,
    };

    fn encounter(order: &[&str], index: usize) -> Encounter {
        Encounter::new(
            EncounterId::new(1),
            LocationId::new(1),
            order.iter().map(|id| ActorId::from(*id)).collect(),
            index,
        )
        .unwrap()
    }

    fn player(id: u64, hp: i64) -> Participant {
        Participant::player(
            ActorId::player(CharacterId::new(id)),
            CharacterSnapshot {
                id: CharacterId::new(id),
                name: format!("Hero {id}"),
                hit_points: HitPoints::new(hp, 20),
                abilities: vec![Ability {
                    id: "cleave".into(),
                    name: "Cleave".into(),
                }],
                inventory: vec![InventoryEntry {
                    item_id: "potion_health_small".into(),
                    quantity: 1,
                }],
            },
        )
    }

    fn npc(id: u64, hp: i64) -> Participant {
        Participant::npc(
            ActorId::npc(NpcInstanceId::new(id)),
            NpcSnapshot {
                id: NpcInstanceId::new(id),
                template_id: "goblin_scout".into(),
                name_override: None,
                hit_points: HitPoints::new(hp, 7),
                behavior_tags: vec![],
            },
        )
    }

    fn roster(participants: Vec<Participant>) -> Roster {
        Roster {
            participants,
            failures: vec![],
        }
    }

    fn fresh(order: &[&str]) -> CombatState {
        CombatState::new(encounter(order, 0), "player_1".into(), 10)
    }

    fn resolved(lines: &[&str], index: usize) -> Result<ActionResponse, ApiError> {
        Ok(ActionResponse::resolved(
            lines.iter().map(|line| line.to_string()).collect(),
            Some(index),
        ))
    }

    /// State after `Start` and the first refresh.
    fn started(
        order: &[&str],
        index: usize,
        participants: Vec<Participant>,
    ) -> (CombatState, Vec<Effect>) {
        let mut state = CombatState::new(encounter(order, index), "player_1".into(), 10);
        assert_eq!(apply(&mut state, CombatEvent::Start), vec![Effect::RefreshParticipants]);
        let effects = apply(&mut state, CombatEvent::ParticipantsRefreshed(roster(participants)));
        (state, effects)
    }

    fn players_turn() -> CombatState {
        let (state, effects) = started(&["player_1", "npc_5"], 0, vec![player(1, 20), npc(5, 7)]);
        assert!(effects.is_empty());
        assert_eq!(state.menu, Menu::Main);
        state
    }

    fn command(state: &mut CombatState, command: PlayerCommand) -> Vec<Effect> {
        apply(state, CombatEvent::Command(command))
    }

    #[test]
    fn menu_table_lists_every_legal_transition() {
        use CommandKind as C;
        use MenuKind as M;

        let legal: Vec<_> = MenuKind::ALL
            .iter()
            .flat_map(|&menu| {
                CommandKind::ALL.iter().filter_map(move |&command| {
                    menu_transition(menu, command).map(|step| (menu, command, step))
                })
            })
            .collect();

        assert_eq!(
            legal,
            vec![
                (M::Main, C::Attack, MenuStep::To(M::SelectTarget)),
                (M::Main, C::OpenAbilities, MenuStep::To(M::SelectAbility)),
                (M::Main, C::OpenItems, MenuStep::To(M::SelectItem)),
                (M::SelectAbility, C::ChooseAbility, MenuStep::To(M::SelectTarget)),
                (M::SelectAbility, C::Back, MenuStep::To(M::Main)),
                (M::SelectItem, C::ChooseItem, MenuStep::To(M::SelectTarget)),
                (M::SelectItem, C::Back, MenuStep::To(M::Main)),
                (M::SelectTarget, C::ChooseTarget, MenuStep::Submit),
                (M::SelectTarget, C::Back, MenuStep::To(M::Main)),
            ]
        );
    }

    #[test]
    fn start_logs_and_refreshes_once() {
        let mut state = fresh(&["player_1", "npc_5"]);
        assert_eq!(
            apply(&mut state, CombatEvent::Start),
            vec![Effect::RefreshParticipants]
        );
        assert!(apply(&mut state, CombatEvent::Start).is_empty());
        assert_eq!(state.log.to_vec(), vec!["Combat started!"]);
        assert!(state.is_processing());
    }

    #[test]
    fn scenario_a_attack_then_wait_on_opponent() {
        let mut state = players_turn();

        assert!(command(&mut state, PlayerCommand::Attack).is_empty());
        assert_eq!(state.menu.pending().map(|p| p.label()), Some("Attack"));

        let effects = command(&mut state, PlayerCommand::ChooseTarget("npc_5".into()));
        assert_eq!(
            effects,
            vec![Effect::SubmitAction(PlayerActionRequest {
                action: ttrpg_domain::ActionKind::Attack,
                target_id: Some("npc_5".into()),
                ability_id: None,
                item_id: None,
            })]
        );
        assert_eq!(state.phase, Phase::Submitting);
        assert_eq!(state.menu.pending(), None);

        let effects = apply(
            &mut state,
            CombatEvent::ActionSubmitted(Ok(ActionResponse::resolved(
                vec!["Hit! 8 damage.".into()],
                Some(1),
            ))),
        );
        assert_eq!(effects, vec![Effect::RefreshParticipants]);
        assert_eq!(state.log.latest(), Some("Hit! 8 damage."));
        assert_eq!(state.encounter.current_turn_index(), 1);
        assert!(state.is_processing());
        // The cursor already sits on the goblin, so no menu is offered while refreshing.
        assert_eq!(state.menu, Menu::WaitingOnOpponent);
        let view = CombatView::from_state(&state);
        assert_eq!(view.menu.title, "Waiting for npc_5...");
        assert!(!view.menu.is_interactive());

        let effects = apply(
            &mut state,
            CombatEvent::ParticipantsRefreshed(roster(vec![player(1, 20), npc(5, 3)])),
        );
        assert_eq!(effects, vec![Effect::ResolveOpponentTurn]);
        assert_eq!(state.menu, Menu::WaitingOnOpponent);
        assert_eq!(state.phase, Phase::ResolvingOpponent);
    }

    #[test]
    fn scenario_b_victory_after_refresh() {
        let (mut state, effects) = started(
            &["player_1", "npc_5", "npc_6"],
            0,
            vec![player(1, 20), npc(5, 0), npc(6, 0)],
        );

        assert_eq!(effects, vec![Effect::ScheduleExit]);
        assert_eq!(state.outcome, Some(CombatOutcome::Victory));
        assert_eq!(state.menu, Menu::CombatOver(CombatOutcome::Victory));
        assert_eq!(state.log.latest(), Some("Victory!"));
        assert_eq!(
            handle_command(&mut state, PlayerCommand::Attack),
            Err(CommandRejected::CombatOver)
        );
    }

    #[test]
    fn scenario_c_network_failure_returns_to_main() {
        let mut state = players_turn();
        command(&mut state, PlayerCommand::Attack);
        command(&mut state, PlayerCommand::ChooseTarget("npc_5".into()));

        let effects = apply(
            &mut state,
            CombatEvent::ActionSubmitted(Err(ApiError::RequestFailed("connection refused".into()))),
        );

        assert!(effects.is_empty());
        assert_eq!(state.log.latest(), Some("Action failed: Request failed: connection refused"));
        assert_eq!(state.log.len(), 2);
        assert_eq!(state.menu, Menu::Main);
        assert_eq!(state.encounter.current_turn_index(), 0);
        assert!(!state.is_processing());
    }

    #[test]
    fn scenario_d_partial_refresh_still_checks_end() {
        let (state, effects) = started(&["player_1", "npc_5", "npc_6"], 0, vec![player(1, 20)]);
        // npc_5 and npc_6 both missing without failures: the world engine removed them.
        assert_eq!(effects, vec![Effect::ScheduleExit]);
        assert_eq!(state.outcome, Some(CombatOutcome::Victory));

        let mut state = fresh(&["player_1", "npc_5", "npc_6"]);
        apply(&mut state, CombatEvent::Start);
        let effects = apply(
            &mut state,
            CombatEvent::ParticipantsRefreshed(Roster {
                participants: vec![player(1, 20), npc(6, 0)],
                failures: vec![FetchFailure {
                    actor_id: "npc_5".into(),
                    side: Some(Side::Opponents),
                    reason: "Request failed: world engine down".into(),
                }],
            }),
        );

        assert!(effects.is_empty());
        assert_eq!(state.outcome, None);
        assert_eq!(state.participants.len(), 2);
        assert_eq!(
            state.log.latest(),
            Some("Error fetching data for npc_5: Request failed: world engine down")
        );
        assert_eq!(state.menu, Menu::Main);
    }

    #[test]
    fn check_combat_end_is_idempotent() {
        let mut state = players_turn();
        state.participants = vec![player(1, 0), npc(5, 4)];

        assert_eq!(check_combat_end(&mut state), Some(Effect::ScheduleExit));
        assert_eq!(check_combat_end(&mut state), None);
        assert_eq!(state.log.iter().filter(|line| *line == "Defeat.").count(), 1);
    }

    #[test]
    fn mutual_wipe_out_is_a_defeat() {
        let (state, _) = started(&["player_1", "npc_5"], 0, vec![player(1, 0), npc(5, 0)]);
        assert_eq!(state.outcome, Some(CombatOutcome::Defeat));
    }

    #[test]
    fn refresh_drops_ids_outside_turn_order() {
        let (state, _) = started(
            &["player_1", "npc_5"],
            0,
            vec![player(1, 20), npc(5, 7), npc(9, 7)],
        );
        let ids: Vec<_> = state.participants.iter().map(|p| p.actor_id().as_str()).collect();
        assert_eq!(ids, vec!["player_1", "npc_5"]);
    }

    #[test]
    fn successful_batch_is_prepended_in_order_and_bounded() {
        let mut state = players_turn();
        for i in 0..8 {
            state.log.push(format!("old {i}"));
        }
        command(&mut state, PlayerCommand::Attack);
        command(&mut state, PlayerCommand::ChooseTarget("npc_5".into()));
        apply(
            &mut state,
            CombatEvent::ActionSubmitted(Ok(ActionResponse::resolved(
                vec!["a".into(), "b".into(), "c".into()],
                Some(1),
            ))),
        );

        let log = state.log.to_vec();
        assert_eq!(log.len(), 10);
        assert_eq!(log[..4], ["a", "b", "c", "old 7"]);
    }

    #[test]
    fn service_rejection_logs_single_failure_line() {
        let mut state = players_turn();
        command(&mut state, PlayerCommand::Attack);
        command(&mut state, PlayerCommand::ChooseTarget("npc_5".into()));

        let mut response = ActionResponse::rejected("Target is out of range.");
        response.log = vec!["ignored".into()];
        apply(&mut state, CombatEvent::ActionSubmitted(Ok(response)));

        assert_eq!(
            state.log.to_vec(),
            vec!["Action failed: Target is out of range.", "Combat started!"]
        );
        assert_eq!(state.encounter.current_turn_index(), 0);
    }

    #[test]
    fn missing_or_bad_turn_index_wraps() {
        let mut state = players_turn();
        command(&mut state, PlayerCommand::Attack);
        command(&mut state, PlayerCommand::ChooseTarget("npc_5".into()));
        apply(&mut state, CombatEvent::ActionSubmitted(resolved(&[], 7)));
        assert_eq!(state.encounter.current_turn_index(), 1);
    }

    #[test]
    fn combat_over_flag_keeps_cursor_but_refreshes() {
        let mut state = players_turn();
        command(&mut state, PlayerCommand::Attack);
        command(&mut state, PlayerCommand::ChooseTarget("npc_5".into()));

        let effects = apply(
            &mut state,
            CombatEvent::ActionSubmitted(Ok(ActionResponse::resolved(
                vec!["The goblin falls.".into()],
                Some(1),
            )
            .with_combat_over())),
        );

        assert_eq!(effects, vec![Effect::RefreshParticipants]);
        assert_eq!(state.encounter.current_turn_index(), 0);
        assert_eq!(state.menu, Menu::Main);
        assert_eq!(state.outcome, None);
    }

    #[test]
    fn ability_and_item_flows_build_pending_actions() {
        let mut state = players_turn();

        command(&mut state, PlayerCommand::OpenAbilities);
        assert_eq!(state.menu, Menu::SelectAbility);
        command(&mut state, PlayerCommand::ChooseAbility("cleave".into()));
        assert_eq!(state.menu.pending().map(|p| p.label()), Some("Ability: Cleave"));
        command(&mut state, PlayerCommand::Back);
        assert_eq!(state.menu, Menu::Main);

        command(&mut state, PlayerCommand::OpenItems);
        command(&mut state, PlayerCommand::ChooseItem("potion_health_small".into()));
        let effects = command(&mut state, PlayerCommand::ChooseTarget("npc_5".into()));
        assert_eq!(
            effects,
            vec![Effect::SubmitAction(PlayerActionRequest {
                action: ttrpg_domain::ActionKind::UseItem,
                target_id: Some("npc_5".into()),
                ability_id: None,
                item_id: Some("potion_health_small".into()),
            })]
        );
    }

    #[test]
    fn ability_menu_is_gated_on_having_abilities() {
        let mut bare = player(1, 20);
        if let Participant::Player { character, .. } = &mut bare {
            character.abilities.clear();
            character.inventory.clear();
        }
        let (mut state, _) = started(&["player_1", "npc_5"], 0, vec![bare, npc(5, 7)]);

        assert_eq!(
            handle_command(&mut state, PlayerCommand::OpenAbilities),
            Err(CommandRejected::NothingToChoose("abilities"))
        );
        assert_eq!(
            handle_command(&mut state, PlayerCommand::OpenItems),
            Err(CommandRejected::NothingToChoose("items"))
        );
        assert_eq!(state.menu, Menu::Main);
    }

    #[test]
    fn targets_must_be_living_opponents() {
        let (mut state, _) = started(
            &["player_1", "npc_5", "npc_6"],
            0,
            vec![player(1, 20), npc(5, 0), npc(6, 4)],
        );
        command(&mut state, PlayerCommand::Attack);

        for target in ["npc_5", "player_1", "npc_42"] {
            assert_eq!(
                handle_command(&mut state, PlayerCommand::ChooseTarget(target.into())),
                Err(CommandRejected::InvalidTarget(target.into()))
            );
        }
        assert!(matches!(state.menu, Menu::SelectTarget(_)));
    }

    #[test]
    fn commands_are_ignored_while_processing_or_off_turn() {
        let mut state = players_turn();
        command(&mut state, PlayerCommand::Attack);
        command(&mut state, PlayerCommand::ChooseTarget("npc_5".into()));
        assert_eq!(
            handle_command(&mut state, PlayerCommand::Attack),
            Err(CommandRejected::Busy)
        );

        let (mut state, _) = started(&["npc_5", "player_1"], 0, vec![player(1, 20), npc(5, 7)]);
        assert_eq!(state.menu, Menu::WaitingOnOpponent);
        state.phase = Phase::Idle;
        assert_eq!(
            handle_command(&mut state, PlayerCommand::Attack),
            Err(CommandRejected::NotYourTurn)
        );
    }

    #[test]
    fn opponent_failure_schedules_retry_without_moving_cursor() {
        let (mut state, effects) =
            started(&["npc_5", "player_1"], 0, vec![player(1, 20), npc(5, 7)]);
        assert_eq!(effects, vec![Effect::ResolveOpponentTurn]);

        let timeout = ApiError::Timeout(std::time::Duration::from_secs(10));
        let effects = apply(&mut state, CombatEvent::OpponentTurnResolved(Err(timeout)));
        assert_eq!(effects, vec![Effect::ScheduleOpponentRetry]);
        assert_eq!(state.encounter.current_turn_index(), 0);
        assert_eq!(state.menu, Menu::WaitingOnOpponent);
        assert_eq!(
            state.log.latest(),
            Some("Opponent turn failed: Request timed out after 10000ms")
        );

        assert_eq!(
            apply(&mut state, CombatEvent::RetryOpponentTurn),
            vec![Effect::ResolveOpponentTurn]
        );
        assert_eq!(state.phase, Phase::ResolvingOpponent);
        // A second retry while one is in flight does nothing.
        assert!(apply(&mut state, CombatEvent::RetryOpponentTurn).is_empty());
    }

    #[test]
    fn other_players_turns_are_resolved_by_the_service() {
        let (state, effects) = started(
            &["player_2", "player_1", "npc_5"],
            0,
            vec![player(1, 20), player(2, 20), npc(5, 7)],
        );
        assert_eq!(effects, vec![Effect::ResolveOpponentTurn]);
        assert_eq!(state.menu, Menu::WaitingOnOpponent);
    }

    #[test]
    fn unknown_actor_renders_no_menu() {
        let (state, effects) = started(
            &["ghost_1", "player_1", "npc_5"],
            0,
            vec![player(1, 20), npc(5, 7)],
        );
        assert!(effects.is_empty());
        assert_eq!(state.menu, Menu::UnknownActor("ghost_1".into()));
        assert_eq!(state.log.latest(), Some("Unknown actor state: ghost_1"));
        assert!(!state.is_processing());
    }

    #[test]
    fn stale_completions_are_discarded() {
        let mut state = players_turn();
        let before = state.log.to_vec();

        let late = [
            CombatEvent::ActionSubmitted(resolved(&["late"], 1)),
            CombatEvent::OpponentTurnResolved(resolved(&["late"], 1)),
            CombatEvent::ParticipantsRefreshed(roster(vec![])),
        ];
        for event in late {
            assert!(apply(&mut state, event).is_empty());
        }

        assert_eq!(state.log.to_vec(), before);
        assert_eq!(state.encounter.current_turn_index(), 0);
    }

    #[test]
    fn nothing_applies_after_exit() {
        let mut state = players_turn();
        command(&mut state, PlayerCommand::Attack);
        command(&mut state, PlayerCommand::ChooseTarget("npc_5".into()));

        assert_eq!(apply(&mut state, CombatEvent::Exit), vec![Effect::Teardown]);
        let before = state.log.to_vec();

        let late = CombatEvent::ActionSubmitted(resolved(&["late"], 1));
        assert!(apply(&mut state, late).is_empty());
        assert!(apply(&mut state, CombatEvent::Exit).is_empty());
        assert_eq!(state.log.to_vec(), before);
        assert_eq!(state.outcome, None);
    }

    #[test]
    fn settle_timer_only_ends_a_decided_combat() {
        let mut state = players_turn();
        assert!(apply(&mut state, CombatEvent::SettleElapsed).is_empty());
        assert!(!state.ended);

        let (mut state, _) = started(&["player_1", "npc_5"], 0, vec![player(1, 20), npc(5, 0)]);
        assert_eq!(apply(&mut state, CombatEvent::SettleElapsed), vec![Effect::Teardown]);
        assert!(state.ended);
    }
}
