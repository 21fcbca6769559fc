//! The backend seam.
//!
//! Controllers talk to the backend only through [`Backend`], so they can be driven by the
//! reqwest-backed [`ApiClient`](crate::ApiClient) in the binary and by a scripted double in tests.

use crate::error::Result;
use crate::types::{
    AuthResponse, ChatId, ChatRecord, ChatReply, ChatRequest, LoginRequest, RegisterRequest, User,
};

/// The backend HTTP API, one method per endpoint.
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    /// Scheme, host and port of the backend, as named in connectivity hints.
    fn location(&self) -> String;

    /// `POST /login`.
    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse>;

    /// `POST /register`.
    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse>;

    /// `POST /chat`, with a bearer token in multi-tenant mode and without one in single-tenant
    /// mode.
    async fn send_chat(&self, token: Option<&str>, request: &ChatRequest) -> Result<ChatReply>;

    /// `GET /chats`.
    async fn list_chats(&self, token: &str) -> Result<Vec<ChatRecord>>;

    /// `POST /chats/clear`.
    async fn clear_chats(&self, token: &str) -> Result<()>;

    /// `DELETE /chats/{id}`.
    async fn delete_chat(&self, token: &str, id: &ChatId) -> Result<()>;

    /// `POST /clear-history`, the unauthenticated single-tenant reset.
    async fn clear_history(&self) -> Result<()>;

    /// `GET /user`.
    async fn current_user(&self, token: &str) -> Result<User>;

    /// `GET /health`.
    async fn health(&self) -> Result<()>;
}
