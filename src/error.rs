//! Error kinds shared by the lifecycle engine, identity resolver and commands.
//!
//! Every failure is local to the attempted operation: callers get a typed
//! error back and the appointment collection is left untouched.

use thiserror::Error;

/// Coarse classification used by the view layer to pick a message style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Authorization,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CareError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Invalid enum value for {field}: {value}")]
    InvalidEnum { field: String, value: String },

    #[error("Cannot move appointment from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Not authorized: {0}")]
    Unauthorized(String),
}

impl CareError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::InvalidEnum { .. } | Self::InvalidTransition { .. } => {
                ErrorKind::Validation
            }
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Unauthorized(_) => ErrorKind::Authorization,
        }
    }

    pub(crate) fn not_found(entity_type: &str, id: &str) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_errors_are_validation_kind() {
        let err = CareError::InvalidTransition {
            from: "cancelled".into(),
            to: "scheduled".into(),
        };
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(
            err.to_string(),
            "Cannot move appointment from cancelled to scheduled"
        );
    }

    #[test]
    fn not_found_display_names_entity() {
        let err = CareError::not_found("Appointment", "a9");
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.to_string(), "Entity not found: Appointment with id a9");
    }

    #[test]
    fn unauthorized_is_authorization_kind() {
        assert_eq!(
            CareError::Unauthorized("admin only".into()).kind(),
            ErrorKind::Authorization
        );
    }
}
