use chrono::Local;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::{error, info, warn};

/// Default number of entries kept in the operator event log
pub const DEFAULT_EVENT_LOG_CAPACITY: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

/// Threshold an alert was raised against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    /// Stack temperature above its limit
    HighTemperature,
    /// Storage nearly full
    StorageNearFull,
    /// Stack efficiency below its limit
    LowEfficiency,
}

/// Informational alert raised after a tick. Never changes the state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub kind: AlertKind,
    pub value: f64,
    pub limit: f64,
}

impl Alert {
    pub fn message(&self) -> String {
        match self.kind {
            AlertKind::HighTemperature => format!(
                "High temperature warning: {:.1}°C exceeds {:.1}°C",
                self.value, self.limit
            ),
            AlertKind::StorageNearFull => format!(
                "Storage near capacity: {:.1}% exceeds {:.1}%",
                self.value, self.limit
            ),
            AlertKind::LowEfficiency => format!(
                "Low efficiency warning: {:.1}% below {:.1}%",
                self.value, self.limit
            ),
        }
    }
}

/// Single operator log line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEntry {
    /// Wall-clock time formatted as `HH:MM:SS`
    pub timestamp: String,
    pub message: String,
    pub severity: Severity,
}

/// Bounded operator event log, most recent entry first
#[derive(Debug, Clone)]
pub struct EventLog {
    entries: VecDeque<EventEntry>,
    capacity: usize,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_EVENT_LOG_CAPACITY)
    }
}

impl EventLog {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Record an entry stamped with the local wall-clock time and mirror it to tracing.
    pub fn record(&mut self, severity: Severity, message: impl Into<String>) {
        let message = message.into();
        match severity {
            Severity::Info => info!(event = %message, "twin event"),
            Severity::Warning => warn!(event = %message, "twin event"),
            Severity::Critical => error!(event = %message, "twin event"),
        }
        self.push(EventEntry {
            timestamp: Local::now().format("%H:%M:%S").to_string(),
            message,
            severity,
        });
    }

    pub fn push(&mut self, entry: EventEntry) {
        self.entries.push_front(entry);
        self.entries.truncate(self.capacity);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
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

    /// Most recent first
    pub fn entries(&self) -> impl Iterator<Item = &EventEntry> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&EventEntry> {
        self.entries.front()
    }
}
