//! Combat controller state
//!
//! Everything the transition table reads and writes lives here. Nothing in
//! this module performs I/O; effects are returned to the controller.

use std::collections::HashSet;
use std::fmt;

use ttrpg_domain::{
    ActorId, CharacterSnapshot, Encounter, EventLog, Participant, PendingAction, Side,
};

/// Action menu sub-state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Menu {
    /// Before the first participant refresh completes
    Loading,
    Main,
    SelectAbility,
    SelectItem,
    SelectTarget(PendingAction),
    WaitingOnOpponent,
    /// The active identifier is neither a player nor an NPC id
    UnknownActor(ActorId),
    CombatOver(CombatOutcome),
}

/// Fieldless discriminant of [`Menu`], used by the transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuKind {
    Loading,
    Main,
    SelectAbility,
    SelectItem,
    SelectTarget,
    WaitingOnOpponent,
    UnknownActor,
    CombatOver,
}

impl MenuKind {
    pub const ALL: [MenuKind; 8] = [
        MenuKind::Loading,
        MenuKind::Main,
        MenuKind::SelectAbility,
        MenuKind::SelectItem,
        MenuKind::SelectTarget,
        MenuKind::WaitingOnOpponent,
        MenuKind::UnknownActor,
        MenuKind::CombatOver,
    ];
}

impl Menu {
    pub fn kind(&self) -> MenuKind {
        match self {
            Self::Loading => MenuKind::Loading,
            Self::Main => MenuKind::Main,
            Self::SelectAbility => MenuKind::SelectAbility,
            Self::SelectItem => MenuKind::SelectItem,
            Self::SelectTarget(_) => MenuKind::SelectTarget,
            Self::WaitingOnOpponent => MenuKind::WaitingOnOpponent,
            Self::UnknownActor(_) => MenuKind::UnknownActor,
            Self::CombatOver(_) => MenuKind::CombatOver,
        }
    }

    pub fn pending(&self) -> Option<&PendingAction> {
        match self {
            Self::SelectTarget(pending) => Some(pending),
            _ => None,
        }
    }
}

/// What the single in-flight slot is currently used for.
///
/// Anything other than `Idle` is the processing latch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Submitting,
    ResolvingOpponent,
    Refreshing,
}

/// How an encounter finished from the local player's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CombatOutcome {
    Victory,
    Defeat,
    /// Exited before either side was defeated
    Abandoned,
}

impl CombatOutcome {
    pub fn is_decisive(self) -> bool {
        !matches!(self, Self::Abandoned)
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::Victory => "Victory!",
            Self::Defeat => "Defeat.",
            Self::Abandoned => "Combat abandoned.",
        }
    }
}

impl fmt::Display for CombatOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Full controller state for one encounter
#[derive(Debug, Clone)]
pub struct CombatState {
    pub(super) encounter: Encounter,
    pub(super) local_actor: ActorId,
    pub(super) participants: Vec<Participant>,
    /// Sides with at least one failed fetch in the latest refresh
    pub(super) unconfirmed_sides: HashSet<Side>,
    pub(super) refreshed: bool,
    pub(super) menu: Menu,
    pub(super) phase: Phase,
    pub(super) outcome: Option<CombatOutcome>,
    pub(super) log: EventLog,
    pub(super) ended: bool,
}

impl CombatState {
    pub fn new(encounter: Encounter, local_actor: ActorId, log_capacity: usize) -> Self {
        Self {
            encounter,
            local_actor,
            participants: Vec::new(),
            unconfirmed_sides: HashSet::new(),
            refreshed: false,
            menu: Menu::Loading,
            phase: Phase::Idle,
            outcome: None,
            log: EventLog::new(log_capacity),
            ended: false,
        }
    }

    pub fn encounter(&self) -> &Encounter {
        &self.encounter
    }

    pub fn local_actor(&self) -> &ActorId {
        &self.local_actor
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn participant(&self, actor_id: &ActorId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.actor_id() == actor_id)
    }

    pub fn menu(&self) -> &Menu {
        &self.menu
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_processing(&self) -> bool {
        self.phase != Phase::Idle
    }

    pub fn outcome(&self) -> Option<CombatOutcome> {
        self.outcome
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    pub fn is_local_turn(&self) -> bool {
        self.encounter.active_actor() == &self.local_actor
    }

    /// The local player's latest character snapshot, if it was fetched.
    pub fn local_character(&self) -> Option<&CharacterSnapshot> {
        self.participant(&self.local_actor)
            .and_then(Participant::as_character)
    }

    /// Living participants on the side opposing the local player.
    pub fn living_opponents(&self) -> impl Iterator<Item = &Participant> {
        self.participants
            .iter()
            .filter(|p| p.side() == Side::Opponents && p.is_alive())
    }

    pub fn is_living_opponent(&self, actor_id: &ActorId) -> bool {
        self.living_opponents().any(|p| p.actor_id() == actor_id)
    }

    /// A side is down when none of its members is alive in the cache and
    /// none of its fetches failed in the latest refresh.
    ///
    /// A failed fetch leaves its side undecided for this cycle instead of
    /// counting as dead; the next clean refresh decides it. An NPC absent
    /// from a successfully fetched location is dead, since the world engine
    /// deletes slain instances.
    fn side_defeated(&self, side: Side) -> bool {
        !self.unconfirmed_sides.contains(&side)
            && !self
                .participants
                .iter()
                .any(|p| p.side() == side && p.is_alive())
    }

    /// Players are checked first, so mutual wipe-out is a defeat.
    pub(super) fn decide_outcome(&self) -> Option<CombatOutcome> {
        if !self.refreshed {
            return None;
        }
        if self.side_defeated(Side::Players) {
            Some(CombatOutcome::Defeat)
        } else if self.side_defeated(Side::Opponents) {
            Some(CombatOutcome::Victory)
        } else {
            None
        }
    }
}
