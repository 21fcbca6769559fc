//! User-facing wording for failures.
//!
//! The backend's own message is shown verbatim whenever it sent one.  When it never answered, the
//! text names the backend location so the user knows what to start.

use crate::error::Error;

enum Cause<'a> {
    /// Raised on this side, without an answer from the backend.
    Local(String),
    /// The backend answered with an error payload.
    Server(&'a str),
    /// The backend answered with a bare error status.
    Status,
    /// No usable answer.
    Transport(String),
}

fn cause<'a>(err: &'a Error, origin: &str) -> Cause<'a> {
    let detail = match err {
        Error::Validation { message }
        | Error::Connection { message, .. }
        | Error::Timeout { message, .. }
        | Error::HttpClient { message, .. }
        | Error::Serialization { message, .. }
        | Error::Io { message, .. }
        | Error::Url { message, .. }
        | Error::Config { message } => message.clone(),
        _ => err.to_string(),
    };
    if !err.is_request_error() {
        return Cause::Local(detail);
    }
    if let Some(message) = err.server_message() {
        return Cause::Server(message);
    }
    if err.status_code().is_some() {
        return Cause::Status;
    }
    if err.is_connection() {
        Cause::Transport(connectivity_hint(&detail, origin))
    } else {
        Cause::Transport(detail)
    }
}

/// `<detail>. Make sure the backend server is running on <origin>`.
pub fn connectivity_hint(detail: &str, origin: &str) -> String {
    format!("{detail}. Make sure the backend server is running on {origin}")
}

/// Inline text for a failed login or registration.
pub fn form_failure(err: &Error, fallback: &str, origin: &str) -> String {
    match cause(err, origin) {
        Cause::Local(message) => message,
        Cause::Server(message) => message.to_string(),
        Cause::Status => fallback.to_string(),
        Cause::Transport(detail) => format!("Error: {detail}"),
    }
}

/// Inline text rendered in place of a reply.
pub fn chat_failure(err: &Error, origin: &str) -> String {
    match cause(err, origin) {
        Cause::Local(message) => format!("Error: {message}"),
        Cause::Server(message) => format!("Error: {message}"),
        Cause::Status => "Error: Failed to get response".to_string(),
        Cause::Transport(detail) => format!("Error: {detail}"),
    }
}

/// Alert text for a failed history load.
pub fn load_failure(err: &Error, origin: &str) -> String {
    action_failure(err, origin, "Failed to load chats", "Error loading chats")
}

/// Alert text for a failed clear-all.
pub fn clear_failure(err: &Error, origin: &str) -> String {
    action_failure(err, origin, "Failed to clear chats", "Error clearing chats")
}

/// Alert text for a failed delete.
pub fn delete_failure(err: &Error, origin: &str) -> String {
    action_failure(err, origin, "Failed to delete chat", "Error deleting chat")
}

/// Alert text for a failed single-tenant history reset.
pub fn history_clear_failure(err: &Error, origin: &str) -> String {
    action_failure(err, origin, "Failed to clear history", "Error clearing history")
}

/// Alert text for a failed identity refresh.
pub fn user_failure(err: &Error, origin: &str) -> String {
    action_failure(err, origin, "Failed to load user", "Error loading user")
}

fn action_failure(err: &Error, origin: &str, refused: &str, broken: &str) -> String {
    match cause(err, origin) {
        Cause::Server(message) => format!("{refused}: {message}"),
        Cause::Status => refused.to_string(),
        Cause::Local(detail) | Cause::Transport(detail) => format!("{broken}: {detail}"),
    }
}
