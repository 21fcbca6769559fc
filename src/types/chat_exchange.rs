use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::types::{ChatId, ChatRecord};

/// Body of `POST /chat`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatRequest {
    pub message: String,
}

impl ChatRequest {
    /// Create a new `ChatRequest`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Successful answer to `POST /chat`.
///
/// The single-tenant backend returns only `response`; the multi-tenant one also returns the id
/// and timestamp of the stored record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatReply {
    /// The assistant's reply.
    pub response: String,

    /// Identifier of the stored record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<ChatId>,

    /// When the record was stored.
    #[serde(
        default,
        with = "crate::utils::time::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<OffsetDateTime>,
}

impl ChatReply {
    /// Create a reply without a stored record.
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            chat_id: None,
            timestamp: None,
        }
    }

    /// Attach the stored record's id and timestamp.
    pub fn with_record(mut self, chat_id: impl Into<ChatId>, timestamp: OffsetDateTime) -> Self {
        self.chat_id = Some(chat_id.into());
        self.timestamp = Some(timestamp);
        self
    }

    /// The record the backend confirmed, or `None` when it returned no id.
    ///
    /// A confirmed id without a timestamp falls back to `now`.
    pub fn confirmed_record(&self, message: &str, now: OffsetDateTime) -> Option<ChatRecord> {
        let id = self.chat_id.clone()?;
        Some(ChatRecord {
            id,
            message: message.to_string(),
            response: self.response.clone(),
            created_at: self.timestamp.unwrap_or(now),
        })
    }
}

/// Successful answer to `GET /chats`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ChatList {
    #[serde(default)]
    pub chats: Vec<ChatRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn multi_tenant_reply() {
        let json = r#"{
            "success": true,
            "message": "Hello",
            "response": "Hi!",
            "chat_id": 42,
            "timestamp": "2024-05-01T09:30:00"
        }"#;
        let reply: ChatReply = serde_json::from_str(json).unwrap();
        assert_eq!(reply.response, "Hi!");
        let record = reply
            .confirmed_record("Hello", datetime!(2030-01-01 0:00 UTC))
            .unwrap();
        assert_eq!(record.id, ChatId::from(42u64));
        assert_eq!(record.message, "Hello");
        assert_eq!(record.created_at, datetime!(2024-05-01 09:30:00 UTC));
    }

    #[test]
    fn single_tenant_reply_has_no_record() {
        let json = r#"{"success": true, "message": "Hello", "response": "Hi!"}"#;
        let reply: ChatReply = serde_json::from_str(json).unwrap();
        assert!(reply.chat_id.is_none());
        assert!(reply
            .confirmed_record("Hello", datetime!(2030-01-01 0:00 UTC))
            .is_none());
    }

    #[test]
    fn chat_list_defaults_to_empty() {
        let list: ChatList = serde_json::from_str(r#"{"success": true}"#).unwrap();
        assert!(list.chats.is_empty());
    }
}
