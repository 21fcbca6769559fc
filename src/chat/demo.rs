//! The single-tenant controller: no login, no history listing, one shared conversation held by
//! the backend.

use crate::backend::Backend;
use crate::chat::controller::{SendOutcome, SendState, exchange};
use crate::chat::notice;
use crate::error::Result;
use crate::observability::{CHAT_CLEARS, CHAT_SENDS_IGNORED};
use crate::render::{Renderer, Welcome};

/// Drives the chat view of the single-tenant backend.
///
/// Messages go out without a bearer token and the conversation lives on the backend, so there is
/// no session store here.
pub struct DemoController<B: Backend> {
    backend: B,
    state: SendState,
}

impl<B: Backend> DemoController<B> {
    /// Creates an idle controller talking to `backend`.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            state: SendState::Idle,
        }
    }

    /// Paints the greeting.
    pub fn start(&mut self, renderer: &mut dyn Renderer) {
        renderer.show_welcome(Welcome::Greeting);
    }

    /// Whether a message is in flight.
    pub fn state(&self) -> SendState {
        self.state
    }

    /// Sends one message without credentials.  Replies are never stored client side.
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
        let result = exchange(&self.backend, None, message, renderer).await;
        self.state = SendState::Idle;
        match result {
            Ok(reply) => SendOutcome::Replied {
                reply,
                record: None,
            },
            Err(err) => SendOutcome::Failed(err),
        }
    }

    /// Resets the backend's conversation, then the transcript.
    pub async fn clear_history(&mut self, renderer: &mut dyn Renderer) -> Result<()> {
        match self.backend.clear_history().await {
            Ok(()) => {
                CHAT_CLEARS.click();
                renderer.show_welcome(Welcome::Greeting);
                Ok(())
            }
            Err(err) => {
                renderer.alert(&notice::history_clear_failure(&err, &self.backend.location()));
                Err(err)
            }
        }
    }
}
