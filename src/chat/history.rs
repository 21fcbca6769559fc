//! The history listing policy.
//!
//! At most [`HISTORY_LIMIT`] chats are listed, most recent first, each as a [`PREVIEW_CHARS`]
//! preview of the user's message and the time of day it was created.

use time::UtcOffset;

use crate::types::{ChatId, ChatRecord};
use crate::utils::time::time_of_day;

/// Number of chats the listing shows.
pub const HISTORY_LIMIT: usize = 10;

/// Number of characters of the user's message a preview keeps.
pub const PREVIEW_CHARS: usize = 40;

/// One row of the history listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryItem {
    /// The chat this row refers to.
    pub id: ChatId,
    /// At most [`PREVIEW_CHARS`] characters of the user's message.
    pub preview: String,
    /// Whether the preview cut the message short.
    pub truncated: bool,
    /// `HH:MM` of the record's creation in the listing's offset.
    pub time: String,
}

impl HistoryItem {
    /// Builds the row for `record`.
    pub fn new(record: &ChatRecord, offset: UtcOffset) -> Self {
        let (preview, truncated) = preview(&record.message);
        Self {
            id: record.id.clone(),
            preview,
            truncated,
            time: time_of_day(record.created_at, offset),
        }
    }
}

/// The first [`PREVIEW_CHARS`] characters of `message`, and whether anything was cut.
///
/// Characters are Unicode scalar values, so a cut never splits a surrogate pair.
pub fn preview(message: &str) -> (String, bool) {
    let mut chars = message.chars();
    let preview: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    (preview, chars.next().is_some())
}

/// Builds the listing for `records`, which are in chronological order.
pub fn history_listing(records: &[ChatRecord], offset: UtcOffset) -> Vec<HistoryItem> {
    records
        .iter()
        .rev()
        .take(HISTORY_LIMIT)
        .map(|record| HistoryItem::new(record, offset))
        .collect()
}
