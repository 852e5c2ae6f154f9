//! Outbound events from screens: user notices and navigation requests.

use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::model::IndexSnapshot;
use crate::shell::Route;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A user-visible message, the terminal counterpart of an alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.level {
            NoticeLevel::Info => "info",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Error => "error",
        };
        write!(f, "[{tag}] {}", self.message)
    }
}

#[derive(Debug, Clone)]
pub struct Navigation {
    pub route: Route,
    /// Context handed forward by the screen that navigated.
    pub payload: Option<Arc<IndexSnapshot>>,
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    Notice(Notice),
    Navigate(Navigation),
}

/// Cloneable sender half screens emit events through.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: mpsc::UnboundedSender<UiEvent>,
}

impl EventSink {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<UiEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn send(&self, event: UiEvent) {
        if self.tx.send(event).is_err() {
            tracing::debug!("event receiver closed, dropping event");
        }
    }

    pub fn notify(&self, level: NoticeLevel, message: impl Into<String>) {
        self.send(UiEvent::Notice(Notice { level, message: message.into() }));
    }

    pub fn info(&self, message: impl Into<String>) {
        self.notify(NoticeLevel::Info, message);
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.notify(NoticeLevel::Warning, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.notify(NoticeLevel::Error, message);
    }

    pub fn navigate(&self, route: Route, payload: Option<Arc<IndexSnapshot>>) {
        self.send(UiEvent::Navigate(Navigation { route, payload }));
    }
}
