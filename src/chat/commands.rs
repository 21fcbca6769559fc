//! Slash command parsing for the chat client.
//!
//! Each view has its own command set: [`AuthCommand`] on the login view, [`ChatCommand`] in the
//! multi-tenant chat view and [`DemoCommand`] in the single-tenant one.  Input that does not start
//! with `/` is a message.

use crate::chat::config::Mode;

/// A parsed multi-tenant chat command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// Reload the history from the backend and show the listing.
    History,

    /// Show a chat by its 1-based position in the listing.
    Show(usize),

    /// Delete a chat by its 1-based position in the listing.
    Delete(usize),

    /// Clear every chat.
    Clear,

    /// Start a new chat.
    New,

    /// Show who is signed in.
    WhoAmI,

    /// Sign out.
    Logout,

    /// Display help information.
    Help,

    /// Exit the client.
    Quit,

    /// Report a parsing error back to the caller.
    Invalid(String),
}

/// A parsed single-tenant command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DemoCommand {
    /// Reset the backend's conversation.
    Clear,
    Help,
    Quit,
    Invalid(String),
}

/// A parsed login view command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthCommand {
    Login,
    Register,
    Help,
    Quit,
    Invalid(String),
}

/// Splits `/name argument` into a lowercased name and an optional trimmed argument.
fn split(input: &str) -> Option<(String, Option<&str>)> {
    let input = input.trim();
    let rest = input.strip_prefix('/')?;
    let mut parts = rest.splitn(2, ' ');
    let command = parts.next().unwrap_or_default().to_lowercase();
    let argument = parts.next().map(|s| s.trim()).filter(|s| !s.is_empty());
    Some((command, argument))
}

/// Parses user input in the multi-tenant chat view.
///
/// Returns `None` if the input should be sent as a message.
///
/// # Examples
///
/// ```
/// # use chatdesk::chat::{ChatCommand, parse_command};
/// assert_eq!(parse_command("/show 2"), Some(ChatCommand::Show(2)));
/// assert!(parse_command("Hello!").is_none());
/// ```
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let (command, argument) = split(input)?;
    let result = match command.as_str() {
        "history" | "chats" => ChatCommand::History,
        "show" | "open" => parse_position(argument, ChatCommand::Show, "/show"),
        "delete" | "rm" => parse_position(argument, ChatCommand::Delete, "/delete"),
        "clear" => ChatCommand::Clear,
        "new" => ChatCommand::New,
        "whoami" | "user" => ChatCommand::WhoAmI,
        "logout" => ChatCommand::Logout,
        "help" | "?" => ChatCommand::Help,
        "quit" | "exit" | "q" => ChatCommand::Quit,
        _ => ChatCommand::Invalid(format!("Unknown command: /{command}")),
    };
    Some(result)
}

/// Parses user input in the single-tenant chat view.
pub fn parse_demo_command(input: &str) -> Option<DemoCommand> {
    let (command, _) = split(input)?;
    let result = match command.as_str() {
        "clear" => DemoCommand::Clear,
        "help" | "?" => DemoCommand::Help,
        "quit" | "exit" | "q" => DemoCommand::Quit,
        _ => DemoCommand::Invalid(format!("Unknown command: /{command}")),
    };
    Some(result)
}

/// Parses user input on the login view.  Anything other than a command is invalid here.
pub fn parse_auth_command(input: &str) -> AuthCommand {
    let Some((command, _)) = split(input) else {
        return AuthCommand::Invalid("Type /login or /register to continue".to_string());
    };
    match command.as_str() {
        "login" => AuthCommand::Login,
        "register" | "signup" => AuthCommand::Register,
        "help" | "?" => AuthCommand::Help,
        "quit" | "exit" | "q" => AuthCommand::Quit,
        _ => AuthCommand::Invalid(format!("Unknown command: /{command}")),
    }
}

fn parse_position<F>(argument: Option<&str>, constructor: F, name: &str) -> ChatCommand
where
    F: Fn(usize) -> ChatCommand,
{
    match argument {
        Some(arg) => match arg.parse::<usize>() {
            Ok(value) if value > 0 => constructor(value),
            _ => ChatCommand::Invalid(format!("{name} expects a position from the history list")),
        },
        None => ChatCommand::Invalid(format!("{name} requires a position")),
    }
}

/// Returns help text describing the login view's commands.
pub fn auth_help_text() -> &'static str {
    r#"Available commands:
  /login                 Sign in with email and password
  /register              Create an account
  /help                  Show this help message
  /quit                  Exit"#
}

/// Returns help text describing the chat view's commands in `mode`.
pub fn help_text(mode: Mode) -> &'static str {
    match mode {
        Mode::MultiTenant => {
            r#"Available commands:
  /history               Reload and list recent chats
  /show <n>              Show chat <n> from the list
  /delete <n>            Delete chat <n> from the list
  /clear                 Clear all chats
  /new                   Start a new chat
  /whoami                Show the signed-in user
  /logout                Sign out
  /help                  Show this help message
  /quit                  Exit"#
        }
        Mode::SingleTenant => {
            r#"Available commands:
  /clear                 Clear the conversation history
  /help                  Show this help message
  /quit                  Exit"#
        }
    }
}
