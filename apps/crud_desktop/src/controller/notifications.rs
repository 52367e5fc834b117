//! User-visible feedback: auto-dismissing toasts and acknowledged alerts.

use std::{
    collections::VecDeque,
    time::{Duration, Instant},
};

use crate::backend_bridge::commands::RequestId;
use crate::controller::events::{err_label, UiError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub severity: Severity,
    pub message: String,
    /// Mutation flow that stays in its error state until this toast is gone.
    pub origin: Option<RequestId>,
    pub expires_at: Instant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub severity: Severity,
    pub title: &'static str,
    pub message: String,
    pub origin: Option<RequestId>,
}

#[derive(Debug)]
pub struct Notifications {
    toast_ttl: Duration,
    toasts: Vec<Toast>,
    alerts: VecDeque<Alert>,
}

impl Notifications {
    pub fn new(toast_ttl: Duration) -> Self {
        Self {
            toast_ttl,
            toasts: Vec::new(),
            alerts: VecDeque::new(),
        }
    }

    pub fn toast_error(&mut self, error: &UiError, origin: Option<RequestId>, now: Instant) {
        tracing::debug!(category = err_label(error.category()), "showing error toast");
        self.toasts.push(Toast {
            severity: Severity::Error,
            message: error.message().to_string(),
            origin,
            expires_at: now + self.toast_ttl,
        });
    }

    pub fn alert_error(&mut self, error: &UiError, origin: Option<RequestId>) {
        self.alerts.push_back(Alert {
            severity: Severity::Error,
            title: err_label(error.category()),
            message: error.message().to_string(),
            origin,
        });
    }

    pub fn alert_info(&mut self, message: impl Into<String>) {
        self.alerts.push_back(Alert {
            severity: Severity::Info,
            title: "Done",
            message: message.into(),
            origin: None,
        });
    }

    pub fn toasts(&self) -> &[Toast] {
        &self.toasts
    }

    /// The alert currently blocking the window, if any.
    pub fn current_alert(&self) -> Option<&Alert> {
        self.alerts.front()
    }

    pub fn pending_alerts(&self) -> usize {
        self.alerts.len()
    }

    /// Dismisses the front alert and returns the flow it was holding open.
    pub fn acknowledge_alert(&mut self) -> Option<RequestId> {
        self.alerts.pop_front().and_then(|alert| alert.origin)
    }

    /// Drops expired toasts and returns the flows they were holding open.
    pub fn expire(&mut self, now: Instant) -> Vec<RequestId> {
        let mut released = Vec::new();
        self.toasts.retain(|toast| {
            if toast.expires_at > now {
                return true;
            }
            released.extend(toast.origin);
            false
        });
        released
    }

    /// Time until the next toast expires, for scheduling a repaint.
    pub fn next_expiry(&self, now: Instant) -> Option<Duration> {
        self.toasts
            .iter()
            .map(|toast| toast.expires_at.saturating_duration_since(now))
            .min()
    }
}
