use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::types::ChatId;

/// One user/assistant exchange persisted by the backend.
///
/// Records are immutable once created and are only ever removed by id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatRecord {
    /// Identifier assigned by the backend.
    pub id: ChatId,

    /// Text authored by the user.
    pub message: String,

    /// Text authored by the assistant.
    pub response: String,

    /// When the backend stored the exchange.
    #[serde(with = "crate::utils::time")]
    pub created_at: OffsetDateTime,
}

impl ChatRecord {
    /// Create a new `ChatRecord`.
    pub fn new(
        id: impl Into<ChatId>,
        message: impl Into<String>,
        response: impl Into<String>,
        created_at: OffsetDateTime,
    ) -> Self {
        Self {
            id: id.into(),
            message: message.into(),
            response: response.into(),
            created_at,
        }
    }
}
