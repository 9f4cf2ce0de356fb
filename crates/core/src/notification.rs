//! Single-slot transient notifications.
//!
//! A [`NotificationCenter`] holds at most one visible event. Every `emit` replaces
//! whatever was there, whatever its severity. The primary search and the detail
//! session each own a separate center so they never clear each other.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationEvent {
    /// Strictly increasing within one center.
    pub id: u64,
    pub severity: Severity,
    pub message: String,
}

/// Which UI region a notification belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationScope {
    PrimarySearch,
    DetailSession,
}

#[derive(Debug, Default)]
pub struct NotificationCenter {
    last_id: u64,
    current: Option<NotificationEvent>,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the visible event with a new one and returns it.
    pub fn emit(&mut self, severity: Severity, message: impl Into<String>) -> NotificationEvent {
        self.last_id += 1;
        let event = NotificationEvent {
            id: self.last_id,
            severity,
            message: message.into(),
        };
        self.current = Some(event.clone());
        event
    }

    pub fn info(&mut self, message: impl Into<String>) -> NotificationEvent {
        self.emit(Severity::Info, message)
    }

    pub fn error(&mut self, message: impl Into<String>) -> NotificationEvent {
        self.emit(Severity::Error, message)
    }

    pub fn current(&self) -> Option<&NotificationEvent> {
        self.current.as_ref()
    }

    /// Hides the visible event. Identifiers keep increasing afterwards.
    pub fn clear(&mut self) {
        self.current = None;
    }
}
