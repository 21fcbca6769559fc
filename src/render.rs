//! Output rendering for the chat client.
//!
//! [`Renderer`] is everything the controllers need from a view: a transcript of entries, a
//! transient loading placeholder, a history listing, inline form errors, blocking alerts and
//! confirmations.  [`PlainTextRenderer`] paints all of it on a terminal.

use std::io::{self, BufRead, Stdout, Write};

use crate::chat::{AuthForm, HistoryItem};
use crate::types::User;

/// ANSI escape code for dim text (used for the loading placeholder).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code for bold text (used for welcome titles).
const ANSI_BOLD: &str = "\x1b[1m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escape code for cyan text (used for the user label).
const ANSI_CYAN: &str = "\x1b[36m";

/// ANSI escape code for green text (used for the bot label).
const ANSI_GREEN: &str = "\x1b[32m";

/// ANSI escape code for red text (used for errors).
const ANSI_RED: &str = "\x1b[31m";

/// ANSI escape code for yellow text (used for alerts and confirmations).
const ANSI_YELLOW: &str = "\x1b[33m";

/// Return to column zero and erase the line.
const ANSI_ERASE_LINE: &str = "\r\x1b[2K";

/// Identifier of the loading placeholder.
pub const LOADING_INDICATOR_ID: &str = "loading-indicator";

///////////////////////////////////////// Entries /////////////////////////////////////////

/// Who authored a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Author {
    /// The person at the keyboard.
    User,
    /// The assistant, and inline error messages shown in place of a reply.
    Bot,
}

/// One displayable transcript entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageEntry {
    /// Who authored the entry.
    pub author: Author,
    /// The entry's text, shown verbatim.
    pub text: String,
}

/// Turns a (text, sender) pair into a displayable entry.
pub fn message_entry(text: &str, author: Author) -> MessageEntry {
    MessageEntry {
        author,
        text: text.to_string(),
    }
}

/// The transient entry shown while a reply is outstanding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadingPlaceholder {
    id: &'static str,
}

impl LoadingPlaceholder {
    /// Creates the placeholder.
    pub fn new() -> Self {
        Self {
            id: LOADING_INDICATOR_ID,
        }
    }

    /// The placeholder's identifier; removal looks it up by this.
    pub fn id(&self) -> &'static str {
        self.id
    }
}

impl Default for LoadingPlaceholder {
    fn default() -> Self {
        Self::new()
    }
}

/// Placeholder transcript content shown when no chat is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Welcome {
    /// The single-tenant greeting.
    Greeting,
    /// A fresh multi-tenant chat.
    NewChat,
    /// After all chats were cleared.
    Cleared,
}

impl Welcome {
    /// The heading.
    pub fn title(self) -> &'static str {
        match self {
            Welcome::Greeting => "Welcome to Gemini Chatbot!",
            Welcome::NewChat => "New Chat",
            Welcome::Cleared => "Chat Cleared",
        }
    }

    /// The body lines below the heading.
    pub fn lines(self) -> &'static [&'static str] {
        match self {
            Welcome::Greeting => &["Ask me anything and I'll help you with an answer."],
            Welcome::NewChat => &[
                "Start a conversation with Gemini AI.",
                "✓ Your chats are automatically saved",
                "✓ Access them anytime with /history",
                "✓ Build on previous conversations",
            ],
            Welcome::Cleared => &["Start a new conversation with Gemini AI."],
        }
    }
}

/// Text shown in place of an empty history listing.
pub const EMPTY_HISTORY: &str = "No chats yet";

///////////////////////////////////////// Renderer /////////////////////////////////////////

/// Trait for rendering the chat client.
///
/// Controllers only ever touch the view through this trait.
pub trait Renderer: Send {
    /// Show the signed-in identity.
    fn show_user(&mut self, user: &User);

    /// Show the login or the registration form.
    fn show_form(&mut self, form: AuthForm);

    /// Replace the transcript with a welcome state.
    fn show_welcome(&mut self, welcome: Welcome);

    /// Remove the welcome state, if shown, leaving the rest of the transcript.
    fn clear_welcome(&mut self);

    /// Empty the transcript.
    fn clear_transcript(&mut self);

    /// Append an entry to the transcript.
    fn append_entry(&mut self, entry: &MessageEntry);

    /// Append the loading placeholder to the transcript.
    fn insert_placeholder(&mut self, placeholder: &LoadingPlaceholder);

    /// Remove the loading placeholder.  Removing an absent placeholder does nothing.
    fn remove_placeholder(&mut self, placeholder: &LoadingPlaceholder);

    /// Enable or disable message input and the send affordance.
    fn set_input_enabled(&mut self, enabled: bool);

    /// Show or hide the blocking loading indication used while history loads.
    fn set_blocking_loading(&mut self, visible: bool);

    /// Replace the history listing.  An empty slice shows [`EMPTY_HISTORY`].
    fn render_history(&mut self, items: &[HistoryItem]);

    /// Show an inline error beneath the active form.
    fn show_form_error(&mut self, error: &str);

    /// Clear the inline form error.
    fn clear_form_error(&mut self);

    /// Show a blocking alert.
    fn alert(&mut self, message: &str);

    /// Ask a yes/no question.  Returns true when the user confirms.
    fn confirm(&mut self, question: &str) -> bool;

    /// Print an informational message.
    fn print_info(&mut self, info: &str);
}

/// Plain text renderer with optional ANSI styling.
pub struct PlainTextRenderer {
    stdout: Stdout,
    use_color: bool,
    placeholder: Option<&'static str>,
    blocking_shown: bool,
    input_enabled: bool,
}

impl PlainTextRenderer {
    /// Creates a new PlainTextRenderer with ANSI colors enabled.
    pub fn new() -> Self {
        Self::with_color(true)
    }

    /// Creates a new PlainTextRenderer with specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self {
            stdout: io::stdout(),
            use_color,
            placeholder: None,
            blocking_shown: false,
            input_enabled: true,
        }
    }

    /// Whether input is currently enabled.
    pub fn input_enabled(&self) -> bool {
        self.input_enabled
    }

    /// Flushes stdout to ensure immediate display of transient content.
    fn flush(&mut self) {
        let _ = self.stdout.flush();
    }

    fn styled(&self, style: &str, text: &str) -> String {
        if self.use_color {
            format!("{style}{text}{ANSI_RESET}")
        } else {
            text.to_string()
        }
    }

    /// Takes a transient line off the screen.
    fn erase_transient(&mut self) {
        if self.use_color {
            print!("{ANSI_ERASE_LINE}");
        } else {
            println!();
        }
        self.flush();
    }
}

impl Default for PlainTextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for PlainTextRenderer {
    fn show_user(&mut self, user: &User) {
        println!(
            "{} <{}>",
            self.styled(ANSI_BOLD, &user.name),
            user.email
        );
    }

    fn show_form(&mut self, form: AuthForm) {
        let title = match form {
            AuthForm::Login => "Login (/register to create an account)",
            AuthForm::Register => "Register (/login if you already have an account)",
        };
        println!("{}", self.styled(ANSI_BOLD, title));
    }

    fn show_welcome(&mut self, welcome: Welcome) {
        println!();
        println!("{}", self.styled(ANSI_BOLD, welcome.title()));
        for line in welcome.lines() {
            println!("{line}");
        }
        println!();
    }

    fn clear_welcome(&mut self) {}

    fn clear_transcript(&mut self) {
        println!();
    }

    fn append_entry(&mut self, entry: &MessageEntry) {
        let label = match entry.author {
            Author::User => self.styled(ANSI_CYAN, "You:"),
            Author::Bot => self.styled(ANSI_GREEN, "Bot:"),
        };
        println!("{label} {}", entry.text);
    }

    fn insert_placeholder(&mut self, placeholder: &LoadingPlaceholder) {
        if self.placeholder == Some(placeholder.id()) {
            return;
        }
        print!("{}", self.styled(ANSI_DIM, "Bot: ..."));
        self.placeholder = Some(placeholder.id());
        self.flush();
    }

    fn remove_placeholder(&mut self, placeholder: &LoadingPlaceholder) {
        if self.placeholder == Some(placeholder.id()) {
            self.placeholder = None;
            self.erase_transient();
        }
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        self.input_enabled = enabled;
    }

    fn set_blocking_loading(&mut self, visible: bool) {
        if visible && !self.blocking_shown {
            print!("{}", self.styled(ANSI_DIM, "Loading chats..."));
            self.blocking_shown = true;
            self.flush();
        } else if !visible && self.blocking_shown {
            self.blocking_shown = false;
            self.erase_transient();
        }
    }

    fn render_history(&mut self, items: &[HistoryItem]) {
        println!("{}", self.styled(ANSI_BOLD, "History"));
        if items.is_empty() {
            println!("  {EMPTY_HISTORY}");
            return;
        }
        for (index, item) in items.iter().enumerate() {
            let ellipsis = if item.truncated { "..." } else { "" };
            println!(
                "  {:>2}. {}{} {}",
                index + 1,
                item.preview,
                ellipsis,
                self.styled(ANSI_DIM, &item.time)
            );
        }
    }

    fn show_form_error(&mut self, error: &str) {
        eprintln!("{}", self.styled(ANSI_RED, error));
    }

    fn clear_form_error(&mut self) {}

    fn alert(&mut self, message: &str) {
        eprintln!("{}", self.styled(ANSI_YELLOW, &format!("! {message}")));
    }

    fn confirm(&mut self, question: &str) -> bool {
        print!("{} [y/N] ", self.styled(ANSI_YELLOW, question));
        self.flush();
        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
    }

    fn print_info(&mut self, info: &str) {
        println!("{info}");
    }
}
