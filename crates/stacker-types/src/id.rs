use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Maximum accepted length of an entity id.
pub const MAX_ID_LEN: usize = 64;

/// Store-assigned identifier of a persisted entity.
///
/// The core treats ids as opaque text. Stores generate UUID v7 strings, which
/// sort in creation order, but any id accepted by [`EntityId::parse`] is valid.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Generate a new time-ordered id (UUID v7).
    pub fn generate() -> Self {
        Self(uuid::Uuid::now_v7().to_string())
    }

    /// Parse an id supplied from outside the process (e.g. a URL path).
    ///
    /// Ids are restricted to ASCII alphanumerics, `-` and `_` so that every
    /// backend can use them verbatim as a key or file name.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        if s.is_empty() {
            return Err(TypeError::InvalidId {
                id: s.to_string(),
                reason: "empty",
            });
        }
        if s.len() > MAX_ID_LEN {
            return Err(TypeError::InvalidId {
                id: s.to_string(),
                reason: "too long",
            });
        }
        if !s
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        {
            return Err(TypeError::InvalidId {
                id: s.to_string(),
                reason: "illegal character",
            });
        }
        Ok(Self(s.to_string()))
    }

    /// The id as text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for EntityId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
