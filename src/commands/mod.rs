//! Command and query surface consumed by a view layer.
//!
//! Handlers take the shared `CoreState`, return `Result<T, String>`, and raise
//! a notification for every command outcome. Failures never mutate state.

pub mod appointment;
pub mod doctors;
pub mod session;

use crate::core_state::{CoreError, CoreState};
use crate::error::CareError;
use crate::lifecycle::Actor;
use crate::notify::Notification;

/// Health check, verifies the engine is up.
pub fn health_check() -> String {
    tracing::debug!("Health check called");
    "ok".to_string()
}

/// Turn a failure into its display text and show it as an error notification.
pub(crate) fn reject(state: &CoreState, err: impl Into<CoreError>) -> String {
    let err = err.into();
    let message = err.to_string();
    tracing::warn!(error = %message, "Command rejected");
    state.notify(Notification::error(message.clone()));
    message
}

/// Capability of the logged-in user, which must be an admin.
pub(crate) fn require_admin(state: &CoreState) -> Result<Actor, CoreError> {
    match state.current_actor()? {
        Actor::Admin => Ok(Actor::Admin),
        _ => Err(CareError::Unauthorized("admin access required".into()).into()),
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_check_returns_ok() {
        assert_eq!(health_check(), "ok");
    }

    #[test]
    fn require_admin_without_session_fails() {
        let state = test_support::state();
        assert!(matches!(
            require_admin(&state),
            Err(CoreError::NoActiveSession)
        ));
    }

    #[test]
    fn reject_raises_error_notification() {
        let state = test_support::state();
        let message = reject(&state, CoreError::NoActiveSession);
        assert_eq!(message, "No active session");
        let shown = state.take_notification().unwrap();
        assert_eq!(shown.kind, crate::models::NotificationKind::Error);
        assert_eq!(shown.message, message);
    }
}
