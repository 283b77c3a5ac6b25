use log::info;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// A timestamped line of the run's event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Local wall-clock time, `HH:MM:SS`
    pub timestamp: String,
    pub message: String,
}

/// Bounded event log, oldest entries are dropped first.
///
/// Every message is mirrored to the `log` facade.
#[derive(Debug, Clone)]
pub struct LogConsole {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl LogConsole {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, message: impl Into<String>) {
        let message = message.into();
        info!("{}", message);
        self.entries.push_back(LogEntry {
            timestamp: chrono::Local::now().format("%H:%M:%S").to_string(),
            message,
        });
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
