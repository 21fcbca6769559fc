//! The chat client's views and their controllers.
//!
//! # Architecture
//!
//! - [`auth`]: login and registration, and the persisted session
//! - [`controller`]: the multi-tenant chat view and its [`SessionContext`]
//! - [`demo`]: the single-tenant chat view
//! - [`store`]: the in-memory mirror of the user's chat history
//! - [`history`]: the history listing policy
//! - [`notice`]: user-facing failure wording
//! - [`config`]: CLI argument parsing and configuration
//! - [`commands`]: slash command parsing

pub mod auth;
mod commands;
mod config;
pub mod controller;
pub mod demo;
pub mod history;
pub mod notice;
pub mod store;

pub use crate::render::{PlainTextRenderer, Renderer};
pub use auth::{AuthController, AuthForm, RegistrationForm};
pub use commands::{
    AuthCommand, ChatCommand, DemoCommand, auth_help_text, help_text, parse_auth_command,
    parse_command, parse_demo_command,
};
pub use config::{ChatArgs, ChatConfig, FileConfig, Mode};
pub use controller::{ChatController, Logout, SendOutcome, SendState, SessionContext};
pub use demo::DemoController;
pub use history::{HISTORY_LIMIT, HistoryItem, PREVIEW_CHARS, history_listing};
pub use store::SessionStore;
