//! Client-side persistence for the authenticated session.
//!
//! The bearer token and the user identity live under two fixed keys.  [`FileStore`] keeps them in
//! a small JSON object on disk so that they survive between runs; [`MemoryStore`] keeps them in
//! memory.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{Error, Result};
use crate::types::{User, UserSession};

/// Key under which the bearer token is stored.
pub const TOKEN_KEY: &str = "token";

/// Key under which the JSON-encoded user identity is stored.
pub const USER_KEY: &str = "user";

/// Name of the file [`FileStore::in_dir`] writes.
pub const SESSION_FILE: &str = "session.json";

/// A string key/value store.
pub trait KeyValueStore {
    /// Returns the value under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`.  Removing an absent key is not an error.
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// In-memory store.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Store backed by a JSON object in a single file.
///
/// The file is re-read on every access so two runs never clobber each other's keys.  Writes go to
/// a temporary file in the same directory that is renamed over the old one, and on unix the file
/// is readable by its owner only.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Creates a store backed by `path`.  The file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates a store backed by [`SESSION_FILE`] inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(SESSION_FILE))
    }

    /// The backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<BTreeMap<String, String>> {
        match fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(content) => serde_json::from_str(&content).map_err(|err| {
                Error::serialization(
                    format!("failed to parse {}", self.path.display()),
                    Some(Box::new(err)),
                )
            }),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(Error::io(
                format!("failed to read {}", self.path.display()),
                err,
            )),
        }
    }

    fn write(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)
            .map_err(|err| Error::io(format!("failed to create {}", dir.display()), err))?;
        let content = serde_json::to_string_pretty(entries)?;
        let failed =
            |err: io::Error| Error::io(format!("failed to write {}", self.path.display()), err);
        let mut tmp = NamedTempFile::new_in(dir).map_err(failed)?;
        tmp.write_all(content.as_bytes()).map_err(failed)?;
        owner_only(tmp.as_file()).map_err(failed)?;
        tmp.as_file().sync_all().map_err(failed)?;
        tmp.persist(&self.path).map_err(|err| failed(err.error))?;
        Ok(())
    }
}

#[cfg(unix)]
fn owner_only(file: &File) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn owner_only(_: &File) -> io::Result<()> {
    Ok(())
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.read()?;
        entries.insert(key.to_string(), value.to_string());
        self.write(&entries)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let mut entries = self.read()?;
        if entries.remove(key).is_some() {
            self.write(&entries)?;
        }
        Ok(())
    }
}

/// Persists `session` under [`TOKEN_KEY`] and [`USER_KEY`].
pub fn save_session(store: &mut dyn KeyValueStore, session: &UserSession) -> Result<()> {
    store.set(TOKEN_KEY, &session.access_token)?;
    store.set(USER_KEY, &serde_json::to_string(&session.user)?)
}

/// Reads the persisted session.
///
/// Returns `None` unless both keys are present.  A user value that does not parse is treated as
/// no session at all, and both keys are removed.
pub fn load_session(store: &mut dyn KeyValueStore) -> Result<Option<UserSession>> {
    let token = store.get(TOKEN_KEY)?;
    let user = store.get(USER_KEY)?;
    let (Some(token), Some(user)) = (token, user) else {
        return Ok(None);
    };
    match serde_json::from_str::<User>(&user) {
        Ok(user) => Ok(Some(UserSession::new(token, user))),
        Err(err) => {
            tracing::warn!(error = %err, "discarding unreadable persisted user");
            clear_session(store)?;
            Ok(None)
        }
    }
}

/// Removes both session keys.
pub fn clear_session(store: &mut dyn KeyValueStore) -> Result<()> {
    store.remove(TOKEN_KEY)?;
    store.remove(USER_KEY)
}
