use std::fmt;

use serde::{Deserialize, Serialize};

/// Current and maximum hit points as reported by the service.
///
/// Values are taken verbatim; the client never applies damage itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitPoints {
    pub current: i64,
    pub max: i64,
}

impl HitPoints {
    pub const fn new(current: i64, max: i64) -> Self {
        Self { current, max }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0
    }
}

/// Renders as `cur / max`.
impl fmt::Display for HitPoints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.current, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_or_negative_is_down() {
        assert!(HitPoints::new(1, 10).is_alive());
        assert!(!HitPoints::new(0, 10).is_alive());
        assert!(!HitPoints::new(-3, 10).is_alive());
    }

    #[test]
    fn displays_as_fraction() {
        assert_eq!(HitPoints::new(4, 12).to_string(), "4 / 12");
    }
}
