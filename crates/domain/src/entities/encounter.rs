//! Encounter entity - One combat instance with a fixed turn order
//!
//! The story engine creates encounters and owns their authoritative turn
//! cursor. The client keeps a local copy of the cursor and moves it to the
//! index reported after every resolved action.

use serde::{Deserialize, Serialize};

use crate::{ActorId, DomainError, EncounterId, LocationId};

/// How the turn cursor was moved by [`Encounter::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorMove {
    /// The service reported a valid index and the cursor now points at it
    Authoritative(usize),
    /// No usable index was reported; the cursor wrapped to the next slot
    Optimistic(usize),
}

impl CursorMove {
    pub fn index(self) -> usize {
        match self {
            Self::Authoritative(index) | Self::Optimistic(index) => index,
        }
    }
}

/// A combat encounter.
///
/// # Invariants
///
/// - `turn_order` is non-empty and never changes after construction
/// - `current_turn_index < turn_order.len()`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "EncounterRecord")]
pub struct Encounter {
    id: EncounterId,
    location_id: LocationId,
    turn_order: Vec<ActorId>,
    current_turn_index: usize,
}

/// Unchecked wire shape, validated through [`Encounter::new`].
#[derive(Deserialize)]
struct EncounterRecord {
    id: EncounterId,
    location_id: LocationId,
    turn_order: Vec<ActorId>,
    current_turn_index: usize,
}

impl TryFrom<EncounterRecord> for Encounter {
    type Error = DomainError;

    fn try_from(record: EncounterRecord) -> Result<Self, Self::Error> {
        Self::new(
            record.id,
            record.location_id,
            record.turn_order,
            record.current_turn_index,
        )
    }
}

impl Encounter {
    pub fn new(
        id: EncounterId,
        location_id: LocationId,
        turn_order: Vec<ActorId>,
        current_turn_index: usize,
    ) -> Result<Self, DomainError> {
        if turn_order.is_empty() {
            return Err(DomainError::EmptyTurnOrder {
                encounter: id.to_string(),
            });
        }
        if current_turn_index >= turn_order.len() {
            return Err(DomainError::TurnIndexOutOfRange {
                index: current_turn_index,
                len: turn_order.len(),
            });
        }
        Ok(Self {
            id,
            location_id,
            turn_order,
            current_turn_index,
        })
    }

    pub fn id(&self) -> EncounterId {
        self.id
    }

    pub fn location_id(&self) -> LocationId {
        self.location_id
    }

    pub fn turn_order(&self) -> &[ActorId] {
        &self.turn_order
    }

    pub fn current_turn_index(&self) -> usize {
        self.current_turn_index
    }

    /// The identifier whose turn it is.
    pub fn active_actor(&self) -> &ActorId {
        // Index is kept in range by `new` and `advance`.
        &self.turn_order[self.current_turn_index]
    }

    pub fn contains(&self, actor: &ActorId) -> bool {
        self.turn_order.contains(actor)
    }

    /// Move the cursor after a resolved action.
    ///
    /// A reported index inside the turn order always wins. A missing or
    /// out-of-range index falls back to `(current + 1) % len`.
    pub fn advance(&mut self, reported: Option<usize>) -> CursorMove {
        let len = self.turn_order.len();
        let movement = match reported {
            Some(index) if index < len => CursorMove::Authoritative(index),
            _ => CursorMove::Optimistic((self.current_turn_index + 1) % len),
        };
        self.current_turn_index = movement.index();
        movement
    }
}
