//! Login, registration and logout commands.

use crate::core_state::CoreState;
use crate::identity::Registration;
use crate::lifecycle::Actor;
use crate::models::User;
use crate::notify::Notification;

use super::reject;

/// Resolve a phone number into a session. `"0000"` (the configured admin
/// code) opens an admin session; anything else a fresh patient one.
pub fn login(state: &CoreState, phone: &str, name: Option<&str>) -> Result<User, String> {
    let user = state
        .resolver()
        .resolve(phone, name)
        .map_err(|e| reject(state, e))?;
    start_session(state, user)
}

/// Sign up as a named patient.
pub fn register(state: &CoreState, registration: Registration) -> Result<User, String> {
    let user = state
        .resolver()
        .register(registration)
        .map_err(|e| reject(state, e))?;
    start_session(state, user)
}

fn start_session(state: &CoreState, user: User) -> Result<User, String> {
    state
        .write_session()
        .map_err(|e| reject(state, e))?
        .login(user.clone());
    state.log_action(&Actor::for_user(&user), "login", &user.id);
    state.notify(Notification::welcome(&user));
    Ok(user)
}

/// End the current session. Logging out with no session is a no-op.
pub fn logout(state: &CoreState) -> Result<(), String> {
    let previous = state
        .write_session()
        .map_err(|e| reject(state, e))?
        .logout();
    if let Some(user) = previous {
        state.log_action(&Actor::for_user(&user), "logout", &user.id);
    }
    state.dismiss_notification();
    Ok(())
}

pub fn current_user(state: &CoreState) -> Option<User> {
    state.current_user().ok()
}

/// Reload the cached session marker, if any. The marker is checked against
/// the resolver's rules, so an admin session only comes back while its phone
/// is still the configured admin code.
pub fn restore_session(state: &CoreState) -> Option<User> {
    let resolver = state.resolver();
    state
        .write_session()
        .ok()
        .and_then(|mut session| session.restore(|user| resolver.admits(user)).cloned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{require_admin, test_support};
    use crate::config::{AppConfig, SESSION_KEY};
    use crate::directory::DoctorDirectory;
    use crate::lifecycle::AppointmentBook;
    use crate::models::{NotificationKind, UserRole};
    use crate::session::{FileStore, KeyValueStore};

    #[test]
    fn admin_login() {
        let state = test_support::state();
        let user = login(&state, "0000", None).unwrap();
        assert_eq!(user.role, UserRole::Admin);
        assert_eq!(current_user(&state).unwrap().id, user.id);
    }

    #[test]
    fn patient_login_welcomes_by_name() {
        let state = test_support::state();
        let user = login(&state, "5551234567", Some("John Doe")).unwrap();
        assert_eq!(user.role, UserRole::Patient);
        let shown = state.take_notification().unwrap();
        assert_eq!(shown.message, "Welcome back, John Doe");
        assert_eq!(shown.kind, NotificationKind::Success);
    }

    #[test]
    fn invalid_phone_keeps_previous_session() {
        let state = test_support::state();
        let first = login(&state, "5551234567", None).unwrap();
        let err = login(&state, "12", None).unwrap_err();
        assert!(err.contains("at least 4 digits"));
        assert_eq!(current_user(&state).unwrap().id, first.id);
        assert_eq!(
            state.take_notification().unwrap().kind,
            NotificationKind::Error
        );
    }

    #[test]
    fn logout_clears_session_and_audits() {
        let state = test_support::state();
        let user = login(&state, "5551234567", None).unwrap();
        logout(&state).unwrap();
        assert!(current_user(&state).is_none());
        logout(&state).unwrap();

        let actions: Vec<String> = state
            .audit_entries()
            .into_iter()
            .filter(|e| e.entity == user.id)
            .map(|e| e.action)
            .collect();
        assert_eq!(actions, vec!["login".to_string(), "logout".to_string()]);
    }

    #[test]
    fn register_starts_patient_session() {
        let state = test_support::state();
        let user = register(
            &state,
            Registration {
                phone: "5550001111".into(),
                name: "Jane Smith".into(),
                age: Some(41),
                ..Registration::default()
            },
        )
        .unwrap();
        assert_eq!(current_user(&state).unwrap(), user);
        assert_eq!(user.age, Some(41));
    }

    #[test]
    fn restore_uses_in_memory_marker() {
        let state = test_support::state();
        let user = login(&state, "5551234567", None).unwrap();
        assert_eq!(restore_session(&state), Some(user));
    }

    fn file_backed(dir: &std::path::Path, admin_code: &str) -> CoreState {
        CoreState::from_parts(
            AppConfig {
                admin_code: admin_code.into(),
                data_dir: Some(dir.to_path_buf()),
                ..AppConfig::default()
            },
            DoctorDirectory::seeded(),
            AppointmentBook::new(),
        )
    }

    #[test]
    fn forged_admin_marker_is_not_restored() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path().join("session"));
        let forged = r#"{"id":"x","name":"Mallory","phone":"5551234567","role":"admin"}"#;
        store.set(SESSION_KEY, forged).unwrap();

        let state = file_backed(dir.path(), "0000");
        assert!(restore_session(&state).is_none());
        assert!(current_user(&state).is_none());
        assert!(require_admin(&state).is_err());
        assert!(store.get(SESSION_KEY).unwrap().is_none());
    }

    #[test]
    fn admin_marker_dropped_after_code_rotation() {
        let dir = tempfile::tempdir().unwrap();
        let before = file_backed(dir.path(), "0000");
        login(&before, "0000", None).unwrap();

        let same_code = file_backed(dir.path(), "0000");
        assert!(restore_session(&same_code).unwrap().is_admin());

        let rotated = file_backed(dir.path(), "424242");
        assert!(restore_session(&rotated).is_none());
        assert!(current_user(&rotated).is_none());
    }
}
