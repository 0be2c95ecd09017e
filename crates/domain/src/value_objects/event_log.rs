use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Default number of entries kept in a combat log
pub const DEFAULT_EVENT_LOG_CAPACITY: usize = 10;

/// Bounded, newest-first list of human-readable combat messages.
///
/// Purely observational: nothing in the combat flow branches on its contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLog {
    capacity: usize,
    entries: VecDeque<String>,
}

impl EventLog {
    /// A capacity of zero is bumped to one so the latest message is always visible.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Prepend one message, evicting the oldest past capacity.
    pub fn push(&mut self, message: impl Into<String>) {
        self.entries.push_front(message.into());
        self.entries.truncate(self.capacity);
    }

    /// Prepend a batch as one block, keeping the batch's own order.
    pub fn push_batch<I, S>(&mut self, messages: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let batch: Vec<String> = messages.into_iter().map(Into::into).collect();
        for message in batch.into_iter().rev() {
            self.entries.push_front(message);
        }
        self.entries.truncate(self.capacity);
    }

    /// Newest first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn latest(&self) -> Option<&str> {
        self.entries.front().map(String::as_str)
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.entries.iter().cloned().collect()
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_LOG_CAPACITY)
    }
}
