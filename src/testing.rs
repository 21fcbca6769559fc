//! Test doubles: a scripted [`Backend`] and a [`Renderer`] that records what it was asked to do.
//!
//! Both write into one [`EventLog`], so tests can check how rendering interleaves with requests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use time::Duration;
use time::macros::datetime;

use crate::backend::Backend;
use crate::chat::{AuthForm, HistoryItem};
use crate::error::{Error, Result};
use crate::render::{LoadingPlaceholder, MessageEntry, Renderer, Welcome};
use crate::types::{
    AuthResponse, ChatId, ChatRecord, ChatReply, ChatRequest, LoginRequest, RegisterRequest, User,
    UserSession,
};

/// Origin the mock reports for connectivity hints.
pub const MOCK_ORIGIN: &str = "http://localhost:5001";

/// One request as the mock saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// `METHOD /path`, followed by the message for `POST /chat`.
    pub line: String,
    pub token: Option<String>,
}

impl Request {
    pub fn new(line: &str, token: Option<&str>) -> Self {
        Self {
            line: line.to_string(),
            token: token.map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Request(Request),
    User(User),
    Form(AuthForm),
    Welcome(Welcome),
    WelcomeCleared,
    TranscriptCleared,
    Entry(MessageEntry),
    PlaceholderInserted,
    PlaceholderRemoved,
    InputEnabled(bool),
    BlockingLoading(bool),
    History(Vec<HistoryItem>),
    FormError(String),
    FormErrorCleared,
    Alert(String),
    Confirm(String),
    Info(String),
}

/// Shared, ordered record of everything the doubles observed.
#[derive(Debug, Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<Event>>>);

impl EventLog {
    pub fn push(&self, event: Event) {
        self.lock().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.lock().clone()
    }

    pub fn reset(&self) {
        self.lock().clear();
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn contains(&self, event: &Event) -> bool {
        self.lock().contains(event)
    }

    pub fn requests(&self) -> Vec<Request> {
        self.collect(|e| match e {
            Event::Request(r) => Some(r.clone()),
            _ => None,
        })
    }

    pub fn entries(&self) -> Vec<MessageEntry> {
        self.collect(|e| match e {
            Event::Entry(entry) => Some(entry.clone()),
            _ => None,
        })
    }

    pub fn alerts(&self) -> Vec<String> {
        self.collect(|e| match e {
            Event::Alert(a) => Some(a.clone()),
            _ => None,
        })
    }

    pub fn form_errors(&self) -> Vec<String> {
        self.collect(|e| match e {
            Event::FormError(f) => Some(f.clone()),
            _ => None,
        })
    }

    /// The most recently rendered history listing.
    pub fn last_history(&self) -> Option<Vec<HistoryItem>> {
        self.collect(|e| match e {
            Event::History(items) => Some(items.clone()),
            _ => None,
        })
        .pop()
    }

    fn collect<T>(&self, f: impl Fn(&Event) -> Option<T>) -> Vec<T> {
        self.lock().iter().filter_map(f).collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Event>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[derive(Default)]
struct Scripts {
    login: VecDeque<Result<AuthResponse>>,
    register: VecDeque<Result<AuthResponse>>,
    chat: VecDeque<Result<ChatReply>>,
    list: VecDeque<Result<Vec<ChatRecord>>>,
    clear: VecDeque<Result<()>>,
    delete: VecDeque<Result<()>>,
    clear_history: VecDeque<Result<()>>,
    user: VecDeque<Result<User>>,
}

/// A backend that replays scripted results in order.  Unscripted calls fail with a 500, except the
/// health check, which always succeeds.
#[derive(Clone, Default)]
pub struct MockBackend {
    scripts: Arc<Mutex<Scripts>>,
    log: EventLog,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend and a renderer sharing one log.
    pub fn with_renderer() -> (Self, RecordingRenderer) {
        let backend = Self::new();
        let renderer = RecordingRenderer::new(backend.log());
        (backend, renderer)
    }

    pub fn log(&self) -> EventLog {
        self.log.clone()
    }

    pub fn script_login(&self, result: Result<AuthResponse>) {
        self.scripts().login.push_back(result);
    }

    pub fn script_register(&self, result: Result<AuthResponse>) {
        self.scripts().register.push_back(result);
    }

    pub fn script_chat(&self, result: Result<ChatReply>) {
        self.scripts().chat.push_back(result);
    }

    pub fn script_list(&self, result: Result<Vec<ChatRecord>>) {
        self.scripts().list.push_back(result);
    }

    pub fn script_clear(&self, result: Result<()>) {
        self.scripts().clear.push_back(result);
    }

    pub fn script_delete(&self, result: Result<()>) {
        self.scripts().delete.push_back(result);
    }

    pub fn script_clear_history(&self, result: Result<()>) {
        self.scripts().clear_history.push_back(result);
    }

    pub fn script_user(&self, result: Result<User>) {
        self.scripts().user.push_back(result);
    }

    fn scripts(&self) -> std::sync::MutexGuard<'_, Scripts> {
        match self.scripts.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn record(&self, line: &str, token: Option<&str>) {
        self.log.push(Event::Request(Request::new(line, token)));
    }
}

fn unscripted<T>(line: &str) -> Result<T> {
    Err(Error::api(500, Some(format!("unscripted request: {line}"))))
}

#[async_trait::async_trait]
impl Backend for MockBackend {
    fn location(&self) -> String {
        MOCK_ORIGIN.to_string()
    }

    async fn login(&self, _: &LoginRequest) -> Result<AuthResponse> {
        self.record("POST /login", None);
        self.scripts()
            .login
            .pop_front()
            .unwrap_or_else(|| unscripted("POST /login"))
    }

    async fn register(&self, _: &RegisterRequest) -> Result<AuthResponse> {
        self.record("POST /register", None);
        self.scripts()
            .register
            .pop_front()
            .unwrap_or_else(|| unscripted("POST /register"))
    }

    async fn send_chat(&self, token: Option<&str>, request: &ChatRequest) -> Result<ChatReply> {
        let line = format!("POST /chat {}", request.message);
        self.record(&line, token);
        self.scripts()
            .chat
            .pop_front()
            .unwrap_or_else(|| unscripted(&line))
    }

    async fn list_chats(&self, token: &str) -> Result<Vec<ChatRecord>> {
        self.record("GET /chats", Some(token));
        self.scripts()
            .list
            .pop_front()
            .unwrap_or_else(|| unscripted("GET /chats"))
    }

    async fn clear_chats(&self, token: &str) -> Result<()> {
        self.record("POST /chats/clear", Some(token));
        self.scripts()
            .clear
            .pop_front()
            .unwrap_or_else(|| unscripted("POST /chats/clear"))
    }

    async fn delete_chat(&self, token: &str, id: &ChatId) -> Result<()> {
        let line = format!("DELETE /chats/{id}");
        self.record(&line, Some(token));
        self.scripts()
            .delete
            .pop_front()
            .unwrap_or_else(|| unscripted(&line))
    }

    async fn clear_history(&self) -> Result<()> {
        self.record("POST /clear-history", None);
        self.scripts()
            .clear_history
            .pop_front()
            .unwrap_or_else(|| unscripted("POST /clear-history"))
    }

    async fn current_user(&self, token: &str) -> Result<User> {
        self.record("GET /user", Some(token));
        self.scripts()
            .user
            .pop_front()
            .unwrap_or_else(|| unscripted("GET /user"))
    }

    async fn health(&self) -> Result<()> {
        self.record("GET /health", None);
        Ok(())
    }
}

/// A renderer that records every call.  Confirmations answer yes unless told otherwise.
pub struct RecordingRenderer {
    log: EventLog,
    answers: VecDeque<bool>,
}

impl RecordingRenderer {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            answers: VecDeque::new(),
        }
    }

    pub fn log(&self) -> EventLog {
        self.log.clone()
    }

    /// Queues the answer to the next confirmation.
    pub fn answer(&mut self, yes: bool) {
        self.answers.push_back(yes);
    }
}

impl Renderer for RecordingRenderer {
    fn show_user(&mut self, user: &User) {
        self.log.push(Event::User(user.clone()));
    }

    fn show_form(&mut self, form: AuthForm) {
        self.log.push(Event::Form(form));
    }

    fn show_welcome(&mut self, welcome: Welcome) {
        self.log.push(Event::Welcome(welcome));
    }

    fn clear_welcome(&mut self) {
        self.log.push(Event::WelcomeCleared);
    }

    fn clear_transcript(&mut self) {
        self.log.push(Event::TranscriptCleared);
    }

    fn append_entry(&mut self, entry: &MessageEntry) {
        self.log.push(Event::Entry(entry.clone()));
    }

    fn insert_placeholder(&mut self, _: &LoadingPlaceholder) {
        self.log.push(Event::PlaceholderInserted);
    }

    fn remove_placeholder(&mut self, _: &LoadingPlaceholder) {
        self.log.push(Event::PlaceholderRemoved);
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        self.log.push(Event::InputEnabled(enabled));
    }

    fn set_blocking_loading(&mut self, visible: bool) {
        self.log.push(Event::BlockingLoading(visible));
    }

    fn render_history(&mut self, items: &[HistoryItem]) {
        self.log.push(Event::History(items.to_vec()));
    }

    fn show_form_error(&mut self, error: &str) {
        self.log.push(Event::FormError(error.to_string()));
    }

    fn clear_form_error(&mut self) {
        self.log.push(Event::FormErrorCleared);
    }

    fn alert(&mut self, message: &str) {
        self.log.push(Event::Alert(message.to_string()));
    }

    fn confirm(&mut self, question: &str) -> bool {
        self.log.push(Event::Confirm(question.to_string()));
        self.answers.pop_front().unwrap_or(true)
    }

    fn print_info(&mut self, info: &str) {
        self.log.push(Event::Info(info.to_string()));
    }
}

/// A record with a fixed clock: record `id` was created `id` minutes after 08:00 UTC.
pub fn record(id: u64, message: &str) -> ChatRecord {
    ChatRecord::new(
        id,
        message,
        format!("reply to {message}"),
        datetime!(2024-05-01 08:00 UTC) + Duration::minutes(id as i64),
    )
}

pub fn user() -> User {
    User::new("Ada", "ada@amzur.com", "E100")
}

pub fn session() -> UserSession {
    UserSession::new("tok", user())
}

pub fn auth_response(token: &str) -> AuthResponse {
    AuthResponse {
        token: token.to_string(),
        user: user(),
    }
}
