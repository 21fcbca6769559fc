use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// The identity of an authenticated user, as returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    /// Backend-internal identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,

    /// Display name.
    pub name: String,

    /// Login email.
    pub email: String,

    /// Employee identifier supplied at registration.
    pub employee_id: String,

    /// When the account was created.
    #[serde(
        default,
        with = "crate::utils::time::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<OffsetDateTime>,
}

impl User {
    /// Create a new `User` with the fields the client displays.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        employee_id: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            email: email.into(),
            employee_id: employee_id.into(),
            created_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_backend_to_dict() {
        let json = r#"{
            "id": 1,
            "employee_id": "E100",
            "email": "ada@amzur.com",
            "name": "Ada",
            "created_at": "2024-01-02T03:04:05.000006"
        }"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.id, Some(1));
        assert_eq!(user.name, "Ada");
        assert_eq!(user.employee_id, "E100");
        assert!(user.created_at.is_some());
    }

    #[test]
    fn minimal_user_round_trips() {
        let user = User::new("Ada", "ada@amzur.com", "E100");
        let json = serde_json::to_string(&user).unwrap();
        assert_eq!(
            json,
            r#"{"name":"Ada","email":"ada@amzur.com","employee_id":"E100"}"#
        );
        let back: User = serde_json::from_str(&json).unwrap();
        assert_eq!(back, user);
    }
}
