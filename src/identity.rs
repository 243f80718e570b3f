//! Session/identity resolver: turns a submitted phone number into a User.
//!
//! This is an unauthenticated mock. The admin role is reached by entering
//! the configured admin activation code (`"0000"` by default) as the phone
//! number; every other well-formed number mints a brand-new patient identity.
//! Nothing is remembered between calls, so the same number logs in as a
//! different user id each time.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::error::CareError;
use crate::models::{User, UserRole};

pub const DEFAULT_PATIENT_NAME: &str = "Patient User";
pub const ADMIN_NAME: &str = "Administrator";
const DEFAULT_MEDICAL_HISTORY: &str = "None";
const MAX_NAME_LEN: usize = 200;
const MAX_AGE: u32 = 150;

/// Sign-up form input.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub phone: String,
    pub name: String,
    pub age: Option<u32>,
    pub medical_history: Option<String>,
    pub identification_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct IdentityResolver {
    admin_code: String,
    min_phone_len: usize,
}

impl IdentityResolver {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            admin_code: config.admin_code.clone(),
            min_phone_len: config.min_phone_len,
        }
    }

    /// Resolve a login. `name` is only used for patient identities.
    ///
    /// The admin code must match exactly and is checked before the phone
    /// shape rules, so no `min_phone_len` setting can lock the admin out.
    pub fn resolve(&self, phone: &str, name: Option<&str>) -> Result<User, CareError> {
        if phone == self.admin_code {
            tracing::info!("Admin activation code accepted");
            return Ok(User {
                id: format!("admin-{}", Uuid::new_v4()),
                name: ADMIN_NAME.to_string(),
                phone: phone.to_string(),
                role: UserRole::Admin,
                medical_history: None,
                age: None,
                identification_url: None,
            });
        }

        let phone = self.validate_phone(phone)?;

        let name = match name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(n) => validate_name(n)?,
            None => DEFAULT_PATIENT_NAME,
        };

        let user = User {
            id: format!("u-{}", Uuid::new_v4()),
            name: name.to_string(),
            phone: phone.to_string(),
            role: UserRole::Patient,
            medical_history: Some(DEFAULT_MEDICAL_HISTORY.to_string()),
            age: None,
            identification_url: None,
        };
        tracing::info!(user_id = %user.id, "Patient identity minted");
        Ok(user)
    }

    /// Sign-up path: a named patient with optional profile details.
    /// The admin code cannot be registered.
    pub fn register(&self, registration: Registration) -> Result<User, CareError> {
        let phone = self.validate_phone(&registration.phone)?;
        if phone == self.admin_code {
            return Err(CareError::Validation(
                "this number is reserved and cannot be registered".into(),
            ));
        }

        let name = registration.name.trim();
        if name.is_empty() {
            return Err(CareError::Validation("name is required".into()));
        }
        let name = validate_name(name)?;

        if let Some(age) = registration.age {
            if age == 0 || age > MAX_AGE {
                return Err(CareError::Validation(format!("invalid age: {age}")));
            }
        }

        let mut user = self.resolve(phone, Some(name))?;
        user.age = registration.age;
        if let Some(history) = non_blank(registration.medical_history) {
            user.medical_history = Some(history);
        }
        user.identification_url = non_blank(registration.identification_url);
        Ok(user)
    }

    /// Whether a cached session user could have been produced by `resolve`
    /// under the current configuration. An admin marker is only honoured
    /// while its phone is still the configured admin code.
    pub fn admits(&self, user: &User) -> bool {
        match user.role {
            UserRole::Admin => user.phone == self.admin_code,
            UserRole::Patient => self.validate_phone(&user.phone).is_ok(),
        }
    }

    /// Trim and check shape: digits plus `+ - ( )` and spaces, with at
    /// least `min_phone_len` digits.
    fn validate_phone<'a>(&self, raw: &'a str) -> Result<&'a str, CareError> {
        let phone = raw.trim();
        if phone.is_empty() {
            return Err(CareError::Validation("phone number is required".into()));
        }
        if let Some(bad) = phone
            .chars()
            .find(|&c| !(c.is_ascii_digit() || matches!(c, '+' | '-' | '(' | ')' | ' ')))
        {
            return Err(CareError::Validation(format!(
                "phone number contains invalid character '{bad}'"
            )));
        }
        let digits = phone.chars().filter(char::is_ascii_digit).count();
        if digits < self.min_phone_len {
            return Err(CareError::Validation(format!(
                "phone number must have at least {} digits",
                self.min_phone_len
            )));
        }
        Ok(phone)
    }
}

fn validate_name(name: &str) -> Result<&str, CareError> {
    if name.chars().count() > MAX_NAME_LEN {
        return Err(CareError::Validation("name too long".into()));
    }
    Ok(name)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::collections::HashSet;

    fn resolver() -> IdentityResolver {
        IdentityResolver::new(&AppConfig::default())
    }

    #[test]
    fn admin_code_resolves_to_admin() {
        let user = resolver().resolve("0000", None).unwrap();
        assert_eq!(user.role, UserRole::Admin);
        assert_eq!(user.name, ADMIN_NAME);
    }

    #[test]
    fn admin_code_ignores_supplied_name() {
        let user = resolver().resolve("0000", Some("Mallory")).unwrap();
        assert!(user.is_admin());
        assert_eq!(user.name, ADMIN_NAME);
    }

    #[test]
    fn padded_admin_code_is_a_patient() {
        let user = resolver().resolve(" 0000 ", None).unwrap();
        assert_eq!(user.role, UserRole::Patient);
    }

    #[test]
    fn admin_code_survives_stricter_phone_rules() {
        let config = AppConfig {
            admin_code: "9999".into(),
            min_phone_len: 7,
            ..AppConfig::default()
        };
        let r = IdentityResolver::new(&config);
        assert!(r.resolve("9999", None).unwrap().is_admin());
        assert!(r.resolve("1234", None).is_err());
        assert!(r.resolve("555-1234", None).is_ok());

        let letters = IdentityResolver::new(&AppConfig {
            admin_code: "open-sesame".into(),
            ..AppConfig::default()
        });
        assert!(letters.resolve("open-sesame", None).unwrap().is_admin());
    }

    #[test]
    fn admits_only_markers_resolve_could_produce() {
        let r = resolver();
        let admin = r.resolve("0000", None).unwrap();
        let patient = r.resolve("5551234567", None).unwrap();
        assert!(r.admits(&admin));
        assert!(r.admits(&patient));

        let forged = User {
            role: UserRole::Admin,
            ..patient.clone()
        };
        assert!(!r.admits(&forged));

        let rotated = IdentityResolver::new(&AppConfig {
            admin_code: "424242".into(),
            ..AppConfig::default()
        });
        assert!(!rotated.admits(&admin));

        let malformed = User {
            phone: "call me".into(),
            ..patient
        };
        assert!(!r.admits(&malformed));
    }

    #[test]
    fn other_numbers_resolve_to_patient() {
        let user = resolver().resolve("5551234567", None).unwrap();
        assert_eq!(user.role, UserRole::Patient);
        assert_eq!(user.name, DEFAULT_PATIENT_NAME);
        assert_eq!(user.phone, "5551234567");
        assert_eq!(user.medical_history.as_deref(), Some("None"));
    }

    #[test]
    fn admin_then_patient_get_distinct_ids() {
        let r = resolver();
        let admin = r.resolve("0000", None).unwrap();
        let patient = r.resolve("5551234567", None).unwrap();
        assert_eq!(admin.role, UserRole::Admin);
        assert_eq!(patient.role, UserRole::Patient);
        assert_ne!(admin.id, patient.id);
    }

    #[test]
    fn same_number_mints_fresh_ids() {
        let r = resolver();
        let ids: HashSet<String> = (0..20)
            .map(|_| r.resolve("+1 (555) 000-0001", None).unwrap().id)
            .collect();
        assert_eq!(ids.len(), 20);
    }

    #[test]
    fn near_admin_codes_are_patients() {
        let r = resolver();
        for phone in ["00000", "000 0", "+0000"] {
            let user = r.resolve(phone, None).unwrap();
            assert_eq!(user.role, UserRole::Patient, "{phone}");
        }
    }

    #[test]
    fn rejects_empty_and_short_numbers() {
        let r = resolver();
        for phone in ["", "   ", "123", "+1-2"] {
            let err = r.resolve(phone, None).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation, "{phone:?}");
        }
    }

    #[test]
    fn rejects_letters() {
        let err = resolver().resolve("555-CALL-NOW", None).unwrap_err();
        assert!(err.to_string().contains("invalid character"));
    }

    #[test]
    fn configured_admin_code_replaces_default() {
        let config = AppConfig {
            admin_code: "424242".into(),
            ..AppConfig::default()
        };
        let r = IdentityResolver::new(&config);
        assert!(!r.resolve("0000", None).unwrap().is_admin());
        assert!(r.resolve("424242", None).unwrap().is_admin());
    }

    #[test]
    fn register_keeps_profile_details() {
        let user = resolver()
            .register(Registration {
                phone: "5550001111".into(),
                name: "  John Doe ".into(),
                age: Some(30),
                medical_history: Some("Asthma".into()),
                identification_url: Some("https://example.org/id.png".into()),
            })
            .unwrap();
        assert_eq!(user.name, "John Doe");
        assert_eq!(user.age, Some(30));
        assert_eq!(user.medical_history.as_deref(), Some("Asthma"));
        assert_eq!(user.role, UserRole::Patient);
    }

    #[test]
    fn register_validates_name_age_and_reserved_code() {
        let r = resolver();
        let base = Registration {
            phone: "5550001111".into(),
            name: "Jane".into(),
            ..Registration::default()
        };

        let no_name = Registration {
            name: " ".into(),
            ..base.clone()
        };
        assert!(r.register(no_name).is_err());

        let zero_age = Registration {
            age: Some(0),
            ..base.clone()
        };
        assert!(r.register(zero_age).is_err());

        for phone in ["0000", " 0000 "] {
            let admin = Registration {
                phone: phone.into(),
                ..base.clone()
            };
            assert_eq!(r.register(admin).unwrap_err().kind(), ErrorKind::Validation);
        }

        assert!(r.register(base).is_ok());
    }
}
