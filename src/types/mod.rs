// Public modules
pub mod auth;
pub mod chat_exchange;
pub mod chat_id;
pub mod chat_record;
pub mod user;
pub mod user_session;

// Re-exports
pub use auth::{AuthResponse, LoginRequest, RegisterRequest};
pub use chat_exchange::{ChatList, ChatReply, ChatRequest};
pub use chat_id::ChatId;
pub use chat_record::ChatRecord;
pub use user::User;
pub use user_session::UserSession;
