use serde::{Deserialize, Serialize};

use super::enums::UserRole;

/// Session-scoped identity minted at login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub role: UserRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medical_history: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identification_url: Option<String>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_marker_without_optional_fields() {
        let user: User = serde_json::from_str(
            r#"{"id":"u-1","name":"Patient User","phone":"5551234567","role":"patient"}"#,
        )
        .unwrap();
        assert_eq!(user.role, UserRole::Patient);
        assert!(user.age.is_none());
        assert!(!user.is_admin());
    }
}
