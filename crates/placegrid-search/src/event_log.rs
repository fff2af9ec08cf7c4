//! Append-only progress log for one area search.
//!
//! Workers append concurrently; consumers (CLI verbose mode, a cache layer,
//! a web front end) take a snapshot once the search returns. Each event is
//! also emitted through `tracing` at the matching level.

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for EventLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventLevel::Debug => write!(f, "DEBUG"),
            EventLevel::Info => write!(f, "INFO"),
            EventLevel::Warning => write!(f, "WARNING"),
            EventLevel::Error => write!(f, "ERROR"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchEvent {
    pub timestamp: DateTime<Utc>,
    pub level: EventLevel,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Thread-safe event buffer. Pass one instance per search.
#[derive(Debug, Default)]
pub struct SearchEventLog {
    events: Mutex<Vec<SearchEvent>>,
}

impl SearchEventLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event under the lock and mirrors it to `tracing`.
    pub fn append(
        &self,
        level: EventLevel,
        message: impl Into<String>,
        details: Option<serde_json::Value>,
    ) {
        let message = message.into();
        match level {
            EventLevel::Debug => tracing::debug!(details = ?details, "{message}"),
            EventLevel::Info => tracing::info!("{message}"),
            EventLevel::Warning => tracing::warn!("{message}"),
            EventLevel::Error => tracing::error!("{message}"),
        }
        let event = SearchEvent {
            timestamp: Utc::now(),
            level,
            message,
            details,
        };
        self.lock().push(event);
    }

    pub fn debug(&self, message: impl Into<String>, details: Option<serde_json::Value>) {
        self.append(EventLevel::Debug, message, details);
    }

    pub fn info(&self, message: impl Into<String>, details: Option<serde_json::Value>) {
        self.append(EventLevel::Info, message, details);
    }

    pub fn warning(&self, message: impl Into<String>, details: Option<serde_json::Value>) {
        self.append(EventLevel::Warning, message, details);
    }

    pub fn error(&self, message: impl Into<String>, details: Option<serde_json::Value>) {
        self.append(EventLevel::Error, message, details);
    }

    /// Returns a copy of every event in append order. The log is left intact.
    #[must_use]
    pub fn drain(&self) -> Vec<SearchEvent> {
        self.lock().clone()
    }

    /// Removes all events.
    pub fn reset(&self) {
        self.lock().clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Number of events at exactly `level`.
    #[must_use]
    pub fn count_at(&self, level: EventLevel) -> usize {
        self.lock().iter().filter(|e| e.level == level).count()
    }

    // A panic while holding the lock cannot leave a half-pushed event, so a
    // poisoned buffer is still consistent.
    fn lock(&self) -> MutexGuard<'_, Vec<SearchEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
