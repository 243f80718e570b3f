//! Transient user-facing confirmations.
//!
//! At most one notification is visible; raising a new one replaces it.
//! Expiry is computed against a caller-supplied `Instant` so the view layer
//! owns the clock.

use std::time::{Duration, Instant};

use serde::Serialize;

use crate::error::CareError;
use crate::models::{AppointmentStatus, NotificationKind, User};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub message: String,
    pub kind: NotificationKind,
    #[serde(skip)]
    pub raised_at: Instant,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message, NotificationKind::Success)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, NotificationKind::Error)
    }

    fn new(message: impl Into<String>, kind: NotificationKind) -> Self {
        Self {
            message: message.into(),
            kind,
            raised_at: Instant::now(),
        }
    }

    pub fn welcome(user: &User) -> Self {
        Self::success(format!("Welcome back, {}", user.name))
    }

    pub fn booking_sent(user: &User) -> Self {
        Self::success(format!("Booking Request Sent! SMS sent to {}", user.phone))
    }

    pub fn cancelled() -> Self {
        Self::success("Appointment cancelled successfully.")
    }

    pub fn status_changed(status: AppointmentStatus) -> Self {
        Self::success(format!("Appointment marked as {status}"))
    }

    pub fn from_error(err: &CareError) -> Self {
        Self::error(err.to_string())
    }
}

#[derive(Debug)]
pub struct Notifier {
    ttl: Duration,
    current: Option<Notification>,
}

impl Notifier {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, current: None }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn raise(&mut self, notification: Notification) {
        match notification.kind {
            NotificationKind::Success => {
                tracing::debug!(text = %notification.message, "Notify")
            }
            NotificationKind::Error => {
                tracing::debug!(text = %notification.message, "Notify error")
            }
        }
        self.current = Some(notification);
    }

    /// The visible notification at `now`; expired ones are cleared.
    pub fn current_at(&mut self, now: Instant) -> Option<&Notification> {
        let expired = self
            .current
            .as_ref()
            .is_some_and(|n| now.saturating_duration_since(n.raised_at) >= self.ttl);
        if expired {
            self.current = None;
        }
        self.current.as_ref()
    }

    /// Remove and return the visible notification, if still live at `now`.
    pub fn take_at(&mut self, now: Instant) -> Option<Notification> {
        self.current_at(now);
        self.current.take()
    }

    pub fn dismiss(&mut self) {
        self.current = None;
    }
}
