//! The multi-tenant chat controller.
//!
//! [`ChatController`] owns the [`SessionContext`] for the signed-in user and runs every chat
//! action against the backend: sending, loading, clearing and deleting.

use time::{OffsetDateTime, UtcOffset};

use crate::backend::Backend;
use crate::chat::history::{HistoryItem, history_listing};
use crate::chat::notice;
use crate::chat::store::SessionStore;
use crate::error::{Error, Result};
use crate::observability::{CHAT_CLEARS, CHAT_DELETES, CHAT_SEND_FAILURES, CHAT_SENDS, CHAT_SENDS_IGNORED};
use crate::render::{Author, LoadingPlaceholder, Renderer, Welcome, message_entry};
use crate::storage::{self, KeyValueStore};
use crate::types::{ChatId, ChatRecord, ChatReply, ChatRequest, User, UserSession};
use crate::utils::time::local_offset;

/// Confirmation asked before clearing every chat.
pub const CONFIRM_CLEAR: &str = "Are you sure you want to clear all chats? This cannot be undone.";

/// Confirmation asked before deleting one chat.
pub const CONFIRM_DELETE: &str = "Delete this chat?";

/// Confirmation asked before logging out.
pub const CONFIRM_LOGOUT: &str = "Are you sure you want to logout?";

/// Where a message send is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SendState {
    /// Input enabled.
    #[default]
    Idle,
    /// Input disabled, one request in flight.
    Sending,
}

/// How a send settled.
#[derive(Debug, Clone)]
pub enum SendOutcome {
    /// Nothing was sent: the input was blank or another send was in flight.
    Ignored,
    /// The backend replied.  `record` is what the session store gained, if the reply carried an
    /// id.
    Replied {
        reply: ChatReply,
        record: Option<ChatRecord>,
    },
    /// The request failed; the error was rendered in place of a reply.
    Failed(Error),
}

/// Everything that belongs to one signed-in user.
#[derive(Debug, Clone)]
pub struct SessionContext {
    /// Token and identity.
    pub session: UserSession,
    /// The user's chat history.
    pub store: SessionStore,
}

impl SessionContext {
    /// Creates a context with an empty store.
    pub fn new(session: UserSession) -> Self {
        Self {
            session,
            store: SessionStore::new(),
        }
    }

    /// The bearer token.
    pub fn token(&self) -> &str {
        &self.session.access_token
    }

    /// The signed-in user.
    pub fn user(&self) -> &User {
        &self.session.user
    }
}

/// What [`ChatController::logout`] did.
pub enum Logout<B: Backend> {
    /// The user declined; the session goes on.
    Declined(ChatController<B>),
    /// The persisted session is gone; this is the context that was torn down.
    Done(SessionContext),
}

/// Drives the chat view for one signed-in user.
pub struct ChatController<B: Backend> {
    backend: B,
    context: SessionContext,
    state: SendState,
    offset: UtcOffset,
}

impl<B: Backend> ChatController<B> {
    /// Creates a controller for `session`.  History labels use the local offset.
    pub fn new(backend: B, session: UserSession) -> Self {
        Self::with_offset(backend, session, local_offset())
    }

    /// Creates a controller whose history labels use `offset`.
    pub fn with_offset(backend: B, session: UserSession, offset: UtcOffset) -> Self {
        Self {
            backend,
            context: SessionContext::new(session),
            state: SendState::Idle,
            offset,
        }
    }

    /// The session context.
    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    /// Where the send state machine is.
    pub fn state(&self) -> SendState {
        self.state
    }

    /// Whether a send is in flight.
    pub fn is_sending(&self) -> bool {
        self.state == SendState::Sending
    }

    /// The current history listing.
    pub fn history(&self) -> Vec<HistoryItem> {
        history_listing(self.context.store.records(), self.offset)
    }

    /// Paints the initial chat view: identity, welcome state, then the history from the backend.
    pub async fn start(&mut self, renderer: &mut dyn Renderer) -> Result<()> {
        renderer.show_user(self.context.user());
        renderer.show_welcome(Welcome::NewChat);
        self.load_history(renderer).await
    }

    /// Loads the full history from the backend behind a blocking loading indication.
    pub async fn load_history(&mut self, renderer: &mut dyn Renderer) -> Result<()> {
        renderer.set_blocking_loading(true);
        let result = self
            .context
            .store
            .load(&self.backend, &self.context.session.access_token)
            .await;
        renderer.set_blocking_loading(false);
        match result {
            Ok(()) => {
                self.render_history(renderer);
                Ok(())
            }
            Err(err) => {
                renderer.alert(&notice::load_failure(&err, &self.backend.location()));
                Err(err)
            }
        }
    }

    /// Sends one message.
    ///
    /// Blank input, and input while another send is in flight, are ignored without rendering or
    /// contacting the backend.
    pub async fn send_message(&mut self, input: &str, renderer: &mut dyn Renderer) -> SendOutcome {
        let message = input.trim();
        if message.is_empty() {
            return SendOutcome::Ignored;
        }
        if self.state == SendState::Sending {
            CHAT_SENDS_IGNORED.click();
            return SendOutcome::Ignored;
        }

        self.state = SendState::Sending;
        let result = exchange(
            &self.backend,
            Some(self.context.session.access_token.as_str()),
            message,
            renderer,
        )
        .await;
        self.state = SendState::Idle;

        match result {
            Ok(reply) => {
                let record = reply.confirmed_record(message, OffsetDateTime::now_utc());
                match &record {
                    Some(record) => {
                        self.context.store.append(record.clone());
                        self.render_history(renderer);
                    }
                    None => tracing::warn!("chat reply carried no chat_id; not added to history"),
                }
                SendOutcome::Replied { reply, record }
            }
            Err(err) => SendOutcome::Failed(err),
        }
    }

    /// Clears every chat after confirmation.
    ///
    /// Returns false when the user declined.  On failure nothing changes and the error is
    /// alerted.
    pub async fn clear_current_chat(&mut self, renderer: &mut dyn Renderer) -> Result<bool> {
        if !renderer.confirm(CONFIRM_CLEAR) {
            return Ok(false);
        }
        let result = self
            .context
            .store
            .clear_all(&self.backend, &self.context.session.access_token)
            .await;
        match result {
            Ok(()) => {
                CHAT_CLEARS.click();
                renderer.show_welcome(Welcome::Cleared);
                self.render_history(renderer);
                Ok(true)
            }
            Err(err) => {
                renderer.alert(&notice::clear_failure(&err, &self.backend.location()));
                Err(err)
            }
        }
    }

    /// Deletes one chat after confirmation.
    ///
    /// Returns false when the user declined.
    pub async fn delete_chat(&mut self, id: &ChatId, renderer: &mut dyn Renderer) -> Result<bool> {
        if !renderer.confirm(CONFIRM_DELETE) {
            return Ok(false);
        }
        let result = self
            .context
            .store
            .delete_by_id(&self.backend, &self.context.session.access_token, id)
            .await;
        match result {
            Ok(_) => {
                CHAT_DELETES.click();
                self.render_history(renderer);
                Ok(true)
            }
            Err(err) => {
                renderer.alert(&notice::delete_failure(&err, &self.backend.location()));
                Err(err)
            }
        }
    }

    /// Resets the transcript to a fresh chat.  History is untouched.
    pub fn start_new_chat(&mut self, renderer: &mut dyn Renderer) {
        renderer.show_welcome(Welcome::NewChat);
    }

    /// Replaces the transcript with one stored exchange.  Returns false for an unknown id.
    pub fn display_chat(&self, id: &ChatId, renderer: &mut dyn Renderer) -> bool {
        renderer.clear_transcript();
        match self.context.store.get(id) {
            Some(record) => {
                renderer.append_entry(&message_entry(&record.message, Author::User));
                renderer.append_entry(&message_entry(&record.response, Author::Bot));
                true
            }
            None => false,
        }
    }

    /// Fetches the identity behind the token and shows it.
    pub async fn refresh_user(&mut self, renderer: &mut dyn Renderer) -> Result<User> {
        match self.backend.current_user(self.context.token()).await {
            Ok(user) => {
                renderer.show_user(&user);
                self.context.session.user = user.clone();
                Ok(user)
            }
            Err(err) => {
                renderer.alert(&notice::user_failure(&err, &self.backend.location()));
                Err(err)
            }
        }
    }

    /// Asks for confirmation, then removes the persisted session and tears the context down.
    pub fn logout(
        self,
        store: &mut dyn KeyValueStore,
        renderer: &mut dyn Renderer,
    ) -> Result<Logout<B>> {
        if !renderer.confirm(CONFIRM_LOGOUT) {
            return Ok(Logout::Declined(self));
        }
        if let Err(err) = storage::clear_session(store) {
            renderer.alert(&format!("Error logging out: {err}"));
            return Err(err);
        }
        Ok(Logout::Done(self.context))
    }

    fn render_history(&self, renderer: &mut dyn Renderer) {
        renderer.render_history(&self.history());
    }
}

/// One pass through the send state machine, shared by both deployment modes.
///
/// The placeholder is removed before anything else happens to the result, so it is gone whether
/// the request succeeded or not.
pub(crate) async fn exchange(
    backend: &dyn Backend,
    token: Option<&str>,
    message: &str,
    renderer: &mut dyn Renderer,
) -> Result<ChatReply> {
    CHAT_SENDS.click();
    renderer.clear_welcome();
    renderer.append_entry(&message_entry(message, Author::User));
    renderer.set_input_enabled(false);

    let placeholder = LoadingPlaceholder::new();
    renderer.insert_placeholder(&placeholder);
    let result = backend.send_chat(token, &ChatRequest::new(message)).await;
    renderer.remove_placeholder(&placeholder);

    match &result {
        Ok(reply) => renderer.append_entry(&message_entry(&reply.response, Author::Bot)),
        Err(err) => {
            CHAT_SEND_FAILURES.click();
            let text = notice::chat_failure(err, &backend.location());
            renderer.append_entry(&message_entry(&text, Author::Bot));
        }
    }
    renderer.set_input_enabled(true);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::MessageEntry;
    use crate::storage::{MemoryStore, TOKEN_KEY, save_session};
    use crate::testing::{Event, MockBackend, RecordingRenderer, Request, record, session};
    use time::macros::datetime;

    fn controller() -> (ChatController<MockBackend>, MockBackend, RecordingRenderer) {
        let (backend, renderer) = MockBackend::with_renderer();
        let controller = ChatController::with_offset(backend.clone(), session(), UtcOffset::UTC);
        (controller, backend, renderer)
    }

    fn hello_reply() -> ChatReply {
        ChatReply::new("Hi!").with_record(42u64, datetime!(2024-05-01 09:30 UTC))
    }

    #[tokio::test]
    async fn send_renders_user_then_bot_and_appends() {
        let (mut chat, backend, mut renderer) = controller();
        backend.script_chat(Ok(hello_reply()));

        let outcome = chat.send_message("  Hello  ", &mut renderer).await;
        assert!(matches!(outcome, SendOutcome::Replied { record: Some(_), .. }));
        assert_eq!(
            renderer.log().entries(),
            vec![
                MessageEntry { author: Author::User, text: "Hello".into() },
                MessageEntry { author: Author::Bot, text: "Hi!".into() },
            ]
        );
        assert_eq!(
            backend.log().requests(),
            vec![Request::new("POST /chat Hello", Some("tok"))]
        );

        let history = chat.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].preview, "Hello");
        assert_eq!(history[0].time, "09:30");
        assert_eq!(chat.state(), SendState::Idle);
    }

    #[tokio::test]
    async fn blank_input_is_a_no_op() {
        let (mut chat, backend, mut renderer) = controller();
        for input in ["", "   ", "\n\t"] {
            let outcome = chat.send_message(input, &mut renderer).await;
            assert!(matches!(outcome, SendOutcome::Ignored));
        }
        assert!(renderer.log().is_empty());
        assert!(backend.log().requests().is_empty());
    }

    #[tokio::test]
    async fn send_while_sending_is_a_no_op() {
        let (mut chat, backend, mut renderer) = controller();
        chat.state = SendState::Sending;
        let outcome = chat.send_message("Hello", &mut renderer).await;
        assert!(matches!(outcome, SendOutcome::Ignored));
        assert!(renderer.log().is_empty());
        assert!(backend.log().requests().is_empty());
    }

    #[tokio::test]
    async fn placeholder_brackets_the_request_exactly() {
        let (mut chat, backend, mut renderer) = controller();
        backend.script_chat(Ok(hello_reply()));
        chat.send_message("Hello", &mut renderer).await;

        let events = renderer.log().events();
        let inserted = events.iter().position(|e| *e == Event::PlaceholderInserted).unwrap();
        let request = events.iter().position(|e| matches!(e, Event::Request(_))).unwrap();
        let removed = events.iter().position(|e| *e == Event::PlaceholderRemoved).unwrap();
        let disabled = events.iter().position(|e| *e == Event::InputEnabled(false)).unwrap();
        let enabled = events.iter().position(|e| *e == Event::InputEnabled(true)).unwrap();
        assert!(disabled < inserted && inserted < request && request < removed && removed < enabled);
        assert_eq!(
            events.iter().filter(|e| **e == Event::PlaceholderInserted).count(),
            1
        );
    }

    #[tokio::test]
    async fn failed_send_renders_error_and_returns_to_idle() {
        let (mut chat, backend, mut renderer) = controller();
        backend.script_chat(Err(Error::connection("Failed to fetch", None)));

        let outcome = chat.send_message("Hello", &mut renderer).await;
        assert!(matches!(outcome, SendOutcome::Failed(_)));
        let events = renderer.log().events();
        assert!(events.contains(&Event::PlaceholderRemoved));
        assert_eq!(events.last(), Some(&Event::InputEnabled(true)));
        let entries = renderer.log().entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].author, Author::Bot);
        assert!(entries[1].text.starts_with("Error: Failed to fetch"));
        assert!(chat.context().store.is_empty());
        assert_eq!(chat.state(), SendState::Idle);
    }

    #[tokio::test]
    async fn server_error_is_rendered_verbatim() {
        let (mut chat, backend, mut renderer) = controller();
        backend.script_chat(Err(Error::api(500, Some("quota exceeded".into()))));
        chat.send_message("Hello", &mut renderer).await;
        assert_eq!(renderer.log().entries()[1].text, "Error: quota exceeded");
    }

    #[tokio::test]
    async fn reply_without_id_is_not_stored() {
        let (mut chat, backend, mut renderer) = controller();
        backend.script_chat(Ok(ChatReply::new("Hi!")));
        let outcome = chat.send_message("Hello", &mut renderer).await;
        assert!(matches!(outcome, SendOutcome::Replied { record: None, .. }));
        assert!(chat.context().store.is_empty());
        assert_eq!(renderer.log().entries().len(), 2);
    }

    #[tokio::test]
    async fn load_history_shows_and_hides_blocking_indicator() {
        let (mut chat, backend, mut renderer) = controller();
        backend.script_list(Ok((1..=12).map(|i| record(i, "m")).collect()));
        chat.load_history(&mut renderer).await.unwrap();

        let events = renderer.log().events();
        assert_eq!(events.first(), Some(&Event::BlockingLoading(true)));
        let request = events.iter().position(|e| matches!(e, Event::Request(_))).unwrap();
        let hidden = events.iter().position(|e| *e == Event::BlockingLoading(false)).unwrap();
        assert!(request < hidden);
        assert_eq!(renderer.log().last_history().unwrap().len(), 10);
        assert_eq!(chat.context().store.len(), 12);
    }

    #[tokio::test]
    async fn failed_load_hides_indicator_and_alerts() {
        let (mut chat, backend, mut renderer) = controller();
        backend.script_list(Err(Error::authentication(Some("Token has expired".into()))));
        assert!(chat.load_history(&mut renderer).await.is_err());
        let events = renderer.log().events();
        assert!(events.contains(&Event::BlockingLoading(false)));
        assert_eq!(
            renderer.log().alerts(),
            vec!["Failed to load chats: Token has expired"]
        );
    }

    #[tokio::test]
    async fn clear_requires_confirmation() {
        let (mut chat, backend, mut renderer) = controller();
        renderer.answer(false);
        assert!(!chat.clear_current_chat(&mut renderer).await.unwrap());
        assert!(backend.log().requests().is_empty());
        assert!(renderer.log().contains(&Event::Confirm(CONFIRM_CLEAR.to_string())));
    }

    #[tokio::test]
    async fn confirmed_clear_resets_to_welcome() {
        let (mut chat, backend, mut renderer) = controller();
        backend.script_list(Ok(vec![record(1, "a"), record(2, "b")]));
        backend.script_clear(Ok(()));
        chat.load_history(&mut renderer).await.unwrap();

        assert!(chat.clear_current_chat(&mut renderer).await.unwrap());
        assert!(chat.context().store.is_empty());
        assert!(renderer.log().contains(&Event::Welcome(Welcome::Cleared)));
        assert_eq!(renderer.log().last_history(), Some(vec![]));
    }

    #[tokio::test]
    async fn failed_clear_leaves_state_untouched() {
        let (mut chat, backend, mut renderer) = controller();
        backend.script_list(Ok(vec![record(1, "a")]));
        backend.script_clear(Err(Error::api(500, Some("db down".into()))));
        chat.load_history(&mut renderer).await.unwrap();

        assert!(chat.clear_current_chat(&mut renderer).await.is_err());
        assert_eq!(chat.context().store.len(), 1);
        assert!(!renderer.log().contains(&Event::Welcome(Welcome::Cleared)));
        assert_eq!(renderer.log().alerts(), vec!["Failed to clear chats: db down"]);
    }

    #[tokio::test]
    async fn delete_updates_store_and_listing_on_success_only() {
        let (mut chat, backend, mut renderer) = controller();
        backend.script_list(Ok(vec![record(1, "a"), record(2, "b")]));
        backend.script_delete(Err(Error::not_found(Some("Chat not found".into()), None)));
        backend.script_delete(Ok(()));
        chat.load_history(&mut renderer).await.unwrap();

        assert!(chat.delete_chat(&ChatId::from(1u64), &mut renderer).await.is_err());
        assert_eq!(chat.history().len(), 2);
        assert_eq!(renderer.log().alerts(), vec!["Failed to delete chat: Chat not found"]);

        assert!(chat.delete_chat(&ChatId::from(1u64), &mut renderer).await.unwrap());
        assert_eq!(chat.history().len(), 1);
        assert_eq!(renderer.log().last_history().unwrap().len(), 1);
        assert!(backend
            .log()
            .requests()
            .contains(&Request::new("DELETE /chats/1", Some("tok"))));
    }

    #[tokio::test]
    async fn declined_delete_does_nothing() {
        let (mut chat, backend, mut renderer) = controller();
        renderer.answer(false);
        assert!(!chat.delete_chat(&ChatId::from(1u64), &mut renderer).await.unwrap());
        assert!(backend.log().requests().is_empty());
    }

    #[tokio::test]
    async fn display_chat_shows_one_exchange() {
        let (mut chat, backend, mut renderer) = controller();
        backend.script_list(Ok(vec![record(1, "first"), record(2, "second")]));
        chat.load_history(&mut renderer).await.unwrap();
        renderer.log().reset();

        assert!(chat.display_chat(&ChatId::from(2u64), &mut renderer));
        assert_eq!(renderer.log().events()[0], Event::TranscriptCleared);
        let entries = renderer.log().entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].text, "second");
        assert!(!chat.display_chat(&ChatId::from(9u64), &mut renderer));
    }

    #[tokio::test]
    async fn new_chat_keeps_history() {
        let (mut chat, backend, mut renderer) = controller();
        backend.script_list(Ok(vec![record(1, "a")]));
        chat.load_history(&mut renderer).await.unwrap();
        chat.start_new_chat(&mut renderer);
        assert!(renderer.log().contains(&Event::Welcome(Welcome::NewChat)));
        assert_eq!(chat.context().store.len(), 1);
    }

    #[tokio::test]
    async fn refresh_user_updates_the_context() {
        let (mut chat, backend, mut renderer) = controller();
        backend.script_user(Ok(User::new("Ada L.", "ada@amzur.com", "E100")));
        let user = chat.refresh_user(&mut renderer).await.unwrap();
        assert_eq!(user.name, "Ada L.");
        assert_eq!(chat.context().user().name, "Ada L.");
    }

    #[test]
    fn logout_tears_down_on_confirmation() {
        let (chat, _backend, mut renderer) = controller();
        let mut store = MemoryStore::new();
        save_session(&mut store, &session()).unwrap();

        renderer.answer(false);
        let chat = match chat.logout(&mut store, &mut renderer).unwrap() {
            Logout::Declined(chat) => chat,
            Logout::Done(_) => panic!("logout should have been declined"),
        };
        assert!(store.get(TOKEN_KEY).unwrap().is_some());

        match chat.logout(&mut store, &mut renderer).unwrap() {
            Logout::Done(context) => assert_eq!(context.token(), "tok"),
            Logout::Declined(_) => panic!("logout should have completed"),
        }
        assert!(store.get(TOKEN_KEY).unwrap().is_none());
    }
}
