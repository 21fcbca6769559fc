use crate::types::{AuthResponse, User};

/// An authenticated session: the bearer token plus the identity it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct UserSession {
    /// Opaque bearer credential sent with each authenticated request.
    pub access_token: String,

    /// The authenticated user.
    pub user: User,
}

impl UserSession {
    /// Create a new `UserSession`.
    pub fn new(access_token: impl Into<String>, user: User) -> Self {
        Self {
            access_token: access_token.into(),
            user,
        }
    }
}

impl From<AuthResponse> for UserSession {
    fn from(response: AuthResponse) -> Self {
        Self {
            access_token: response.token,
            user: response.user,
        }
    }
}
