use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::id::EntityId;
use crate::kind::EntityKind;

/// Maximum length (in characters) of [`Task::title`].
pub const MAX_TITLE_LEN: usize = 50;
/// Maximum length (in characters) of [`Task::description`].
pub const MAX_DESCRIPTION_LEN: usize = 1000;

/// A work item owned by exactly one [`User`](crate::User).
///
/// `owner_id` is fixed at creation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub title: String,
    pub description: String,
    pub owner_id: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
    #[serde(default)]
    pub accepted: bool,
}

impl Task {
    /// A new, unsaved task for `owner_id`.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        owner_id: EntityId,
    ) -> Self {
        Self {
            id: None,
            title: title.into(),
            description: description.into(),
            owner_id,
            priority: None,
            accepted: false,
        }
    }

    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_accepted(mut self, accepted: bool) -> Self {
        self.accepted = accepted;
        self
    }
}

impl Entity for Task {
    const KIND: EntityKind = EntityKind::Task;

    fn id(&self) -> Option<&EntityId> {
        self.id.as_ref()
    }

    fn assign_id(&mut self, id: EntityId) {
        self.id = Some(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_optional_fields() {
        let t = Task::new("Write spec", "core design", EntityId::parse("U1").unwrap())
            .with_priority(3)
            .with_accepted(true);
        assert_eq!(t.priority, Some(3));
        assert!(t.accepted);
        assert!(t.id.is_none());
    }

    #[test]
    fn decodes_without_optional_fields() {
        let t: Task = serde_json::from_str(
            r#"{"id":"T1","title":"Write spec","description":"core design","ownerId":"U1"}"#,
        )
        .unwrap();
        assert_eq!(t.owner_id.as_str(), "U1");
        assert_eq!(t.priority, None);
        assert!(!t.accepted);
    }
}
