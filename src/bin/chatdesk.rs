//! Terminal client for the chat backend.
//!
//! # Usage
//!
//! ```bash
//! # Multi-tenant backend on the default port
//! chatdesk
//!
//! # Single-tenant demo backend
//! chatdesk --mode single
//!
//! # Custom backend and state directory, verbose request logging
//! CHATDESK_LOG=chatdesk=debug chatdesk --api-url http://10.0.0.5:5001/api --state-dir /tmp/cd
//! ```
//!
//! # Commands
//!
//! On the login view: `/login`, `/register`, `/quit`.  In the chat view type a message to send
//! it, or `/help` for the commands of the current mode.

use std::borrow::Cow;

use arrrg::CommandLine;
use rustyline::completion::Completer;
use rustyline::error::ReadlineError;
use rustyline::highlight::{CmdKind, Highlighter};
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{DefaultEditor, Editor, Helper};
use tracing_subscriber::EnvFilter;

use chatdesk::chat::{
    AuthCommand, AuthController, AuthForm, ChatArgs, ChatCommand, ChatConfig, ChatController,
    DemoCommand, DemoController, Logout, Mode, PlainTextRenderer, RegistrationForm, Renderer,
    auth_help_text, help_text, parse_auth_command, parse_command, parse_demo_command,
};
use chatdesk::storage::clear_session;
use chatdesk::{ApiClient, Backend, FileStore, UserSession};

type BinResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "CHATDESK_LOG";

/// Registration prompts in order, and whether each one is a password.
const REGISTRATION_FIELDS: [(&str, bool); 5] = [
    ("Name: ", false),
    ("Employee ID: ", false),
    ("Email: ", false),
    ("Password: ", true),
    ("Confirm password: ", true),
];

/// How the chat view was left.
enum Exit {
    Quit,
    LoggedOut,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> BinResult<()> {
    let (args, _) = ChatArgs::from_command_line_relaxed("chatdesk [OPTIONS]");
    let config = ChatConfig::from_args(args)?;

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let client = ApiClient::with_options(&config.api_url, config.timeout)?;
    if let Err(err) = client.health().await {
        tracing::warn!(backend = %client.origin(), error = %err, "backend health check failed");
    }

    let mut renderer = PlainTextRenderer::with_color(config.use_color);
    let mut rl = DefaultEditor::new()?;

    match config.mode {
        Mode::SingleTenant => run_demo(client, &mut renderer, &mut rl).await,
        Mode::MultiTenant => {
            let mut store = FileStore::in_dir(config.state_dir()?);
            run_multi_tenant(client, &mut store, &mut renderer, &mut rl).await
        }
    }
}

async fn run_multi_tenant(
    client: ApiClient,
    store: &mut FileStore,
    renderer: &mut PlainTextRenderer,
    rl: &mut DefaultEditor,
) -> BinResult<()> {
    loop {
        let session = match AuthController::<ApiClient>::bootstrap(store)? {
            Some(session) => session,
            None => match login_view(client.clone(), store, renderer, rl).await? {
                Some(session) => session,
                None => break,
            },
        };
        match chat_view(client.clone(), session, store, renderer, rl).await? {
            Exit::Quit => break,
            Exit::LoggedOut => continue,
        }
    }
    println!("Goodbye!");
    Ok(())
}

/// Line-editor helper that paints every typed character as `*`.
struct Masked;

impl Highlighter for Masked {
    fn highlight<'l>(&self, line: &'l str, _: usize) -> Cow<'l, str> {
        Cow::Owned("*".repeat(line.chars().count()))
    }

    fn highlight_char(&self, _: &str, _: usize, _: CmdKind) -> bool {
        true
    }
}

impl Completer for Masked {
    type Candidate = String;
}

impl Hinter for Masked {
    type Hint = String;
}

impl Validator for Masked {}

impl Helper for Masked {}

/// Reads one trimmed line.  `None` when the user pressed Ctrl+C or Ctrl+D.
fn prompt(rl: &mut DefaultEditor, label: &str) -> BinResult<Option<String>> {
    field(rl, label, false)
}

/// Reads one form field.  Secret fields are masked and never enter the line history.
fn field(rl: &mut DefaultEditor, label: &str, secret: bool) -> BinResult<Option<String>> {
    let result = if secret {
        let mut masked: Editor<Masked, DefaultHistory> = Editor::new()?;
        masked.set_helper(Some(Masked));
        masked.readline(label)
    } else {
        rl.readline(label)
    };
    match result {
        Ok(line) => Ok(Some(entered(line, secret))),
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

/// Passwords are kept exactly as typed; every other field is trimmed.
fn entered(line: String, secret: bool) -> String {
    if secret { line } else { line.trim().to_string() }
}

async fn login_view(
    client: ApiClient,
    store: &mut FileStore,
    renderer: &mut PlainTextRenderer,
    rl: &mut DefaultEditor,
) -> BinResult<Option<UserSession>> {
    let mut auth = AuthController::new(client);
    renderer.show_form(auth.form());
    println!("Type /login or /register, /quit to exit\n");

    loop {
        let Some(line) = prompt(rl, "> ")? else {
            return Ok(None);
        };
        if line.is_empty() {
            continue;
        }
        match parse_auth_command(&line) {
            AuthCommand::Login => {
                if auth.form() != AuthForm::Login {
                    auth.toggle_forms(renderer);
                }
                let Some(email) = prompt(rl, "Email: ")? else {
                    continue;
                };
                let Some(password) = field(rl, "Password: ", true)? else {
                    continue;
                };
                if let Ok(session) = auth.submit_login(&email, &password, store, renderer).await {
                    return Ok(Some(session));
                }
            }
            AuthCommand::Register => {
                if auth.form() != AuthForm::Register {
                    auth.toggle_forms(renderer);
                }
                let Some(form) = registration_form(rl)? else {
                    continue;
                };
                if let Ok(session) = auth.submit_registration(&form, store, renderer).await {
                    return Ok(Some(session));
                }
            }
            AuthCommand::Help => {
                for line in auth_help_text().lines() {
                    println!("    {}", line);
                }
            }
            AuthCommand::Quit => return Ok(None),
            AuthCommand::Invalid(message) => renderer.show_form_error(&message),
        }
    }
}

fn registration_form(rl: &mut DefaultEditor) -> BinResult<Option<RegistrationForm>> {
    let mut fields = Vec::with_capacity(REGISTRATION_FIELDS.len());
    for (label, secret) in REGISTRATION_FIELDS {
        match field(rl, label, secret)? {
            Some(value) => fields.push(value),
            None => return Ok(None),
        }
    }
    Ok(Some(fill_registration(fields)))
}

/// Builds the form from values entered in [`REGISTRATION_FIELDS`] order.
fn fill_registration(fields: Vec<String>) -> RegistrationForm {
    let mut fields = fields.into_iter();
    let mut next = || fields.next().unwrap_or_default();
    RegistrationForm {
        name: next(),
        employee_id: next(),
        email: next(),
        password: next(),
        confirm_password: next(),
    }
}

async fn chat_view(
    client: ApiClient,
    session: UserSession,
    store: &mut FileStore,
    renderer: &mut PlainTextRenderer,
    rl: &mut DefaultEditor,
) -> BinResult<Exit> {
    let mut chat = ChatController::new(client, session);
    if let Err(err) = chat.start(renderer).await
        && err.is_authentication()
    {
        clear_session(store)?;
        renderer.print_info("Your session has expired. Please log in again.");
        return Ok(Exit::LoggedOut);
    }
    println!("Type /help for commands, /quit to exit\n");

    loop {
        let line = match rl.readline("You: ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => return Ok(Exit::Quit),
            Err(err) => return Err(err.into()),
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let _ = rl.add_history_entry(line);

        let Some(cmd) = parse_command(line) else {
            chat.send_message(line, renderer).await;
            continue;
        };
        match cmd {
            ChatCommand::History => {
                let _ = chat.load_history(renderer).await;
            }
            ChatCommand::Show(position) => match chat.history().get(position - 1) {
                Some(item) => {
                    chat.display_chat(&item.id, renderer);
                }
                None => renderer.alert(&format!("No chat at position {position}")),
            },
            ChatCommand::Delete(position) => match chat.history().get(position - 1) {
                Some(item) => {
                    let _ = chat.delete_chat(&item.id, renderer).await;
                }
                None => renderer.alert(&format!("No chat at position {position}")),
            },
            ChatCommand::Clear => {
                let _ = chat.clear_current_chat(renderer).await;
            }
            ChatCommand::New => chat.start_new_chat(renderer),
            ChatCommand::WhoAmI => {
                let _ = chat.refresh_user(renderer).await;
            }
            ChatCommand::Logout => match chat.logout(store, renderer)? {
                Logout::Declined(kept) => chat = kept,
                Logout::Done(_) => {
                    renderer.print_info("Logged out.");
                    return Ok(Exit::LoggedOut);
                }
            },
            ChatCommand::Help => {
                for line in help_text(Mode::MultiTenant).lines() {
                    println!("    {}", line);
                }
            }
            ChatCommand::Quit => return Ok(Exit::Quit),
            ChatCommand::Invalid(message) => renderer.alert(&message),
        }
    }
}

async fn run_demo(
    client: ApiClient,
    renderer: &mut PlainTextRenderer,
    rl: &mut DefaultEditor,
) -> BinResult<()> {
    let mut demo = DemoController::new(client);
    demo.start(renderer);
    println!("Type /help for commands, /quit to exit\n");

    loop {
        let line = match rl.readline("You: ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err.into()),
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let _ = rl.add_history_entry(line);

        match parse_demo_command(line) {
            None => {
                demo.send_message(line, renderer).await;
            }
            Some(DemoCommand::Clear) => {
                let _ = demo.clear_history(renderer).await;
            }
            Some(DemoCommand::Help) => {
                for line in help_text(Mode::SingleTenant).lines() {
                    println!("    {}", line);
                }
            }
            Some(DemoCommand::Quit) => break,
            Some(DemoCommand::Invalid(message)) => renderer.alert(&message),
        }
    }
    println!("Goodbye!");
    Ok(())
}
