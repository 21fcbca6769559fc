use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Opaque identifier the backend assigns to a chat record.
///
/// The backend emits integers today; strings are accepted as well so the client never has to
/// interpret the value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChatId(String);

impl ChatId {
    /// Create a new `ChatId`.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as it appears in request paths.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ChatId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for ChatId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl Serialize for ChatId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ChatId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Str(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Int(id) => Ok(ChatId(id.to_string())),
            Raw::Str(id) => Ok(ChatId(id)),
        }
    }
}
