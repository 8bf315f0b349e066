use serde::{Deserialize, Serialize};

use crate::models::events::Identity;
use crate::models::rows::UserProfileRow;
use crate::pii::Masked;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[default]
    Customer,
    Agent,
    HotelStaff,
}

impl UserRole {
    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::Customer => "customer",
            UserRole::Agent => "agent",
            UserRole::HotelStaff => "hotel_staff",
        }
    }
}

/// The signed-in user as the application sees it: identity merged with its profile row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl AuthUser {
    /// Profile-less user: customer role, empty names.
    pub fn from_identity(identity: &Identity) -> Self {
        Self {
            id: identity.id.clone(),
            email: identity.email.clone().unwrap_or_default(),
            first_name: String::new(),
            last_name: String::new(),
            role: UserRole::Customer,
            avatar: None,
        }
    }

    /// Merge an identity with its profile row. The identity's email wins when present.
    pub fn merge(identity: &Identity, profile: UserProfileRow) -> Self {
        Self {
            id: identity.id.clone(),
            email: identity.email.clone().unwrap_or(profile.email),
            first_name: profile.first_name,
            last_name: profile.last_name,
            role: profile.role,
            avatar: profile.avatar_url,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupData {
    pub email: String,
    pub password: Masked<String>,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub role: UserRole,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_wire_names() {
        assert_eq!(serde_json::to_value(UserRole::HotelStaff).unwrap(), "hotel_staff");
        let role: UserRole = serde_json::from_str("\"agent\"").unwrap();
        assert_eq!(role, UserRole::Agent);
    }

    #[test]
    fn test_merge_prefers_identity_email() {
        let identity = Identity::new("u-1", Some("new@example.com".to_string()));
        let profile = UserProfileRow {
            id: "u-1".to_string(),
            email: "old@example.com".to_string(),
            first_name: "Sarah".to_string(),
            last_name: "Smith".to_string(),
            role: UserRole::Agent,
            avatar_url: None,
            created_at: None,
            updated_at: None,
        };
        let user = AuthUser::merge(&identity, profile);
        assert_eq!(user.email, "new@example.com");
        assert_eq!(user.role, UserRole::Agent);
        assert_eq!(user.first_name, "Sarah");
    }

    #[test]
    fn test_signup_debug_masks_password() {
        let data = SignupData {
            email: "a@b.com".to_string(),
            password: Masked::from("x"),
            first_name: "A".to_string(),
            last_name: "B".to_string(),
            role: UserRole::Customer,
        };
        assert!(!format!("{:?}", data).contains("password: \"x\""));
    }
}
