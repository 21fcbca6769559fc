use serde::{Deserialize, Serialize};

use crate::types::User;

/// Body of `POST /login`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    /// Create a new `LoginRequest`.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Body of `POST /register`.
///
/// The confirmation password is checked locally and never sent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegisterRequest {
    pub name: String,
    pub employee_id: String,
    pub email: String,
    pub password: String,
}

/// Successful answer to login and registration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthResponse {
    /// Bearer token for subsequent requests.
    pub token: String,

    /// The authenticated user.
    pub user: User,
}
