use serde::{Deserialize, Serialize};

use crate::error::CareError;

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = CareError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(CareError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(UserRole {
    Patient => "patient",
    Admin => "admin",
});

str_enum!(AppointmentStatus {
    Pending => "pending",
    Scheduled => "scheduled",
    Cancelled => "cancelled",
    Completed => "completed",
});

str_enum!(NotificationKind {
    Success => "success",
    Error => "error",
});

impl AppointmentStatus {
    pub const ALL: [AppointmentStatus; 4] = [
        Self::Pending,
        Self::Scheduled,
        Self::Cancelled,
        Self::Completed,
    ];

    /// Statuses reachable in one step from `self`.
    ///
    /// Cancelled and completed are terminal.
    pub fn next_states(self) -> &'static [AppointmentStatus] {
        match self {
            Self::Pending => &[Self::Scheduled, Self::Cancelled],
            Self::Scheduled => &[Self::Cancelled, Self::Completed],
            Self::Cancelled | Self::Completed => &[],
        }
    }

    pub fn can_transition_to(self, next: AppointmentStatus) -> bool {
        self.next_states().contains(&next)
    }

    pub fn is_terminal(self) -> bool {
        self.next_states().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn appointment_status_round_trip() {
        for (variant, s) in [
            (AppointmentStatus::Pending, "pending"),
            (AppointmentStatus::Scheduled, "scheduled"),
            (AppointmentStatus::Cancelled, "cancelled"),
            (AppointmentStatus::Completed, "completed"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(AppointmentStatus::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn user_role_round_trip() {
        assert_eq!(UserRole::from_str("admin").unwrap(), UserRole::Admin);
        assert_eq!(UserRole::Patient.to_string(), "patient");
    }

    #[test]
    fn invalid_enum_returns_error() {
        assert!(AppointmentStatus::from_str("approved").is_err());
        assert!(AppointmentStatus::from_str("Pending").is_err());
        assert!(UserRole::from_str("").is_err());
    }

    #[test]
    fn serde_uses_lowercase_names() {
        let json = serde_json::to_string(&AppointmentStatus::Scheduled).unwrap();
        assert_eq!(json, "\"scheduled\"");
        let back: AppointmentStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(back, AppointmentStatus::Cancelled);
        assert!(serde_json::from_str::<AppointmentStatus>("\"archived\"").is_err());
    }

    #[test]
    fn transition_table() {
        use AppointmentStatus::*;
        assert!(Pending.can_transition_to(Scheduled));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Scheduled.can_transition_to(Cancelled));
        assert!(Scheduled.can_transition_to(Completed));

        assert!(!Pending.can_transition_to(Completed));
        assert!(!Pending.can_transition_to(Pending));
        assert!(!Scheduled.can_transition_to(Pending));
        for terminal in [Cancelled, Completed] {
            assert!(terminal.is_terminal());
            for target in AppointmentStatus::ALL {
                assert!(!terminal.can_transition_to(target));
            }
        }
    }
}
