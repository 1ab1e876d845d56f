//! Bounded system log shown next to the chat.

use chrono::{DateTime, Local};
use std::collections::VecDeque;

pub const DEFAULT_LOG_CAPACITY: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub at: DateTime<Local>,
    pub message: String,
    pub severity: Severity,
}

impl LogEntry {
    /// `[HH:MM:SS] message`
    pub fn render(&self) -> String {
        format!("[{}] {}", self.at.format("%H:%M:%S"), self.message)
    }

    pub fn is_critical(&self) -> bool {
        self.severity == Severity::Critical
    }
}

/// Newest-first log that evicts its oldest entries past capacity.
#[derive(Debug, Clone)]
pub struct SystemLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl Default for SystemLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_LOG_CAPACITY)
    }
}

impl SystemLog {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn append(&mut self, message: impl Into<String>, severity: Severity) {
        self.append_at(Local::now(), message, severity);
    }

    pub fn append_at(
        &mut self,
        at: DateTime<Local>,
        message: impl Into<String>,
        severity: Severity,
    ) {
        self.entries.push_front(LogEntry {
            at,
            message: message.into(),
            severity,
        });
        self.entries.truncate(self.capacity);
    }

    /// Entries, newest first.
    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
