//! Value objects - Immutable objects defined by their attributes

mod event_log;
mod hit_points;
mod pending_action;

pub use event_log::{EventLog, DEFAULT_EVENT_LOG_CAPACITY};
pub use hit_points::HitPoints;
pub use pending_action::{ActionKind, PendingAction};
