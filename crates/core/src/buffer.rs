//! Bounded, newest-first event buffers.
//!
//! The system log, the activity feed, and the interaction-edge log are all
//! append-only histories with a hard cap: insertion prepends and truncates;
//! no entry is ever individually deleted except by truncation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Maximum entries in the system log.
pub const SYSTEM_LOG_CAP: usize = 100;

/// Maximum entries in the activity feed.
pub const ACTIVITY_CAP: usize = 500;

/// Maximum entries in the interaction-edge log.
pub const INTERACTION_CAP: usize = 100;

/// A capacity-limited, newest-first buffer.
#[derive(Debug, Clone)]
pub struct BoundedLog<T> {
    entries: VecDeque<T>,
    cap: usize,
}

impl<T> BoundedLog<T> {
    pub fn new(cap: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(cap),
            cap,
        }
    }

    /// Prepend an entry, truncating the oldest beyond the cap.
    pub fn push(&mut self, entry: T) {
        self.entries.push_front(entry);
        self.entries.truncate(self.cap);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Iterate newest-first.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    /// Newest entry, if any.
    pub fn newest(&self) -> Option<&T> {
        self.entries.front()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<T: Clone> BoundedLog<T> {
    /// Snapshot the buffer newest-first.
    pub fn to_vec(&self) -> Vec<T> {
        self.entries.iter().cloned().collect()
    }
}

/// Severity / flavor of a system log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Info,
    Error,
    Success,
    Action,
    Evolution,
}

/// One line in the simulation's system log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            id: format!("log-{}", uuid::Uuid::new_v4()),
            timestamp: Utc::now(),
            level,
            message: message.into(),
        }
    }
}

/// The kind of edge in the interaction graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    Reply,
    Reaction,
}

/// A directed edge in the interaction graph: who acted on whom.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionEvent {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub from_id: String,
    pub to_id: String,
    pub kind: InteractionKind,
    /// Human-readable context, e.g. the post title involved.
    pub context: String,
}

impl InteractionEvent {
    pub fn new(
        from_id: impl Into<String>,
        to_id: impl Into<String>,
        kind: InteractionKind,
        context: impl Into<String>,
    ) -> Self {
        Self {
            id: format!("int-{}", uuid::Uuid::new_v4()),
            timestamp: Utc::now(),
            from_id: from_id.into(),
            to_id: to_id.into(),
            kind,
            context: context.into(),
        }
    }
}
