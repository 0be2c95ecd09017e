//! Combat controller service
//!
//! Drives a single encounter against the authoritative story engine:
//! - `state` / `transitions` - pure state machine (menu, processing latch, end check)
//! - `refresh` - full participant re-fetch after every resolved action
//! - `controller` - event loop, spawned service calls, cancellable timers
//! - `handle` / `view` - what the presentation layer sees

use std::time::Duration;

use ttrpg_domain::DEFAULT_EVENT_LOG_CAPACITY;

pub mod controller;
pub mod handle;
pub mod refresh;
pub mod state;
pub mod transitions;
pub mod view;

pub use controller::CombatController;
pub use handle::CombatHandle;
pub use refresh::{fetch_roster, FetchFailure, Roster};
pub use state::{CombatOutcome, CombatState, Menu, MenuKind, Phase};
pub use transitions::{CommandKind, CommandRejected, CombatEvent, Effect, PlayerCommand};
pub use view::{CombatView, MenuOption, MenuView, ParticipantView};

/// Default delay between the outcome being decided and the controller ending.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(3);

/// Default per-call timeout, matching the story engine client.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Default wait before re-requesting a failed opponent turn.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Timing and sizing knobs for one controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombatConfig {
    pub settle_delay: Duration,
    pub request_timeout: Duration,
    pub retry_delay: Duration,
    pub log_capacity: usize,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            settle_delay: DEFAULT_SETTLE_DELAY,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            retry_delay: DEFAULT_RETRY_DELAY,
            log_capacity: DEFAULT_EVENT_LOG_CAPACITY,
        }
    }
}
