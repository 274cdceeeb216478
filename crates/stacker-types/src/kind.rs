use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// The closed set of entity kinds Stacker persists.
///
/// Each kind owns its own key namespace in the object store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// An owner of tasks.
    User,
    /// A work item owned by exactly one user.
    Task,
}

impl EntityKind {
    /// All kinds, in namespace order.
    pub const ALL: [EntityKind; 2] = [EntityKind::User, EntityKind::Task];

    /// Store namespace (also the directory name for file-backed stores).
    pub fn namespace(&self) -> &'static str {
        match self {
            Self::User => "users",
            Self::Task => "tasks",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Task => write!(f, "task"),
        }
    }
}

impl FromStr for EntityKind {
    type Err = TypeError;

    /// Accepts the singular name or the namespace, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "user" | "users" => Ok(Self::User),
            "task" | "tasks" => Ok(Self::Task),
            _ => Err(TypeError::UnknownKind(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_singular_and_plural() {
        assert_eq!("user".parse::<EntityKind>().unwrap(), EntityKind::User);
        assert_eq!("Tasks".parse::<EntityKind>().unwrap(), EntityKind::Task);
    }

    #[test]
    fn parse_rejects_unknown() {
        assert_eq!(
            "widget".parse::<EntityKind>(),
            Err(TypeError::UnknownKind("widget".into()))
        );
    }

    #[test]
    fn namespaces_are_distinct() {
        assert_ne!(EntityKind::User.namespace(), EntityKind::Task.namespace());
    }

    #[test]
    fn serde_lowercase() {
        assert_eq!(serde_json::to_string(&EntityKind::Task).unwrap(), "\"task\"");
    }
}
