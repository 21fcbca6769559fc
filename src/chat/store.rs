//! The session store.
//!
//! An ordered, chronological collection of the signed-in user's chat records.  Every mutation
//! except [`SessionStore::append`] happens only after the backend acknowledged it; `append` takes
//! records the backend already confirmed by returning their id.

use crate::backend::Backend;
use crate::error::Result;
use crate::types::{ChatId, ChatRecord};

/// In-memory mirror of the backend's chat history.
#[derive(Debug, Default, Clone)]
pub struct SessionStore {
    records: Vec<ChatRecord>,
}

impl SessionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetches the full chat list and replaces the in-memory state with it.
    ///
    /// On failure the current state is kept.
    pub async fn load(&mut self, backend: &dyn Backend, token: &str) -> Result<()> {
        let records = backend.list_chats(token).await?;
        self.records = records;
        Ok(())
    }

    /// Adds a server-confirmed record to the end.
    pub fn append(&mut self, record: ChatRecord) {
        self.records.push(record);
    }

    /// Deletes the record on the backend, then removes it from memory.
    ///
    /// Returns whether a record with `id` was held in memory.
    pub async fn delete_by_id(
        &mut self,
        backend: &dyn Backend,
        token: &str,
        id: &ChatId,
    ) -> Result<bool> {
        backend.delete_chat(token, id).await?;
        Ok(self.remove(id))
    }

    /// Clears all chats on the backend, then empties memory.
    pub async fn clear_all(&mut self, backend: &dyn Backend, token: &str) -> Result<()> {
        backend.clear_chats(token).await?;
        self.records.clear();
        Ok(())
    }

    /// Removes the record with `id` from memory.  Absent ids are a no-op.
    fn remove(&mut self, id: &ChatId) -> bool {
        let before = self.records.len();
        self.records.retain(|record| &record.id != id);
        self.records.len() != before
    }

    /// Looks a record up by id.
    pub fn get(&self, id: &ChatId) -> Option<&ChatRecord> {
        self.records.iter().find(|record| &record.id == id)
    }

    /// All records, oldest first.
    pub fn records(&self) -> &[ChatRecord] {
        &self.records
    }

    /// Number of records held.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
