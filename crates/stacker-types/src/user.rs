use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::id::EntityId;
use crate::kind::EntityKind;

/// Maximum length (in characters) of [`User::full_name`].
pub const MAX_FULL_NAME_LEN: usize = 20;
/// Maximum length (in characters) of [`User::username`].
pub const MAX_USERNAME_LEN: usize = 20;

/// An owner of tasks.
///
/// `item_ids` is a denormalized index of the tasks this user owns, in task
/// creation order. It is maintained by the relationship layer only and is
/// never patchable.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub full_name: String,
    pub username: String,
    #[serde(default)]
    pub item_ids: Vec<EntityId>,
}

impl User {
    /// A new, unsaved user with no tasks.
    pub fn new(full_name: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: None,
            full_name: full_name.into(),
            username: username.into(),
            item_ids: Vec::new(),
        }
    }

    /// Whether `task` is referenced from this user's index.
    pub fn owns(&self, task: &EntityId) -> bool {
        self.item_ids.contains(task)
    }

    /// Append a task id to the index. Returns `false` if it was already there.
    pub fn link(&mut self, task: EntityId) -> bool {
        if self.owns(&task) {
            return false;
        }
        self.item_ids.push(task);
        true
    }

    /// Remove every occurrence of a task id. Returns `true` if any was removed.
    pub fn unlink(&mut self, task: &EntityId) -> bool {
        let before = self.item_ids.len();
        self.item_ids.retain(|id| id != task);
        self.item_ids.len() != before
    }
}

impl Entity for User {
    const KIND: EntityKind = EntityKind::User;

    fn id(&self) -> Option<&EntityId> {
        self.id.as_ref()
    }

    fn assign_id(&mut self, id: EntityId) {
        self.id = Some(id);
    }
}
