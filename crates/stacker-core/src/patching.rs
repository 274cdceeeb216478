//! Partial updates.
//!
//! Patches are validated in full before anything is written, and the result
//! is persisted with a single store write. Both paths run inside the owning
//! user's scope so a patch cannot interleave with index maintenance: a user
//! patch cannot write back a stale `itemIds`, and a task patch cannot
//! resurrect a task that was deleted while it was being validated.

use stacker_model::Patch;
use stacker_store::EntityStoreExt;
use stacker_types::{EntityId, Task, User};

use crate::error::CoreResult;
use crate::service::Stacker;

impl Stacker {
    /// Patch `fullName` / `username` of a user.
    pub fn patch_user(&self, id: &EntityId, patch: &Patch) -> CoreResult<User> {
        self.locks.with_owner(id, || -> CoreResult<User> {
            let current: User = self.store.get_by_id(id)?;
            let updated = self.patcher.apply(&current, patch)?;
            let saved = self.store.save(updated)?;
            tracing::debug!(user = %id, fields = ?patch.keys().collect::<Vec<_>>(), "user patched");
            Ok(saved)
        })
    }

    /// Patch `title` / `description` / `priority` / `accepted` of a task.
    pub fn patch_task(&self, id: &EntityId, patch: &Patch) -> CoreResult<Task> {
        // `ownerId` is immutable, so the scope found here stays the right one.
        let owner_id = self.store.get_by_id::<Task>(id)?.owner_id;
        self.locks.with_owner(&owner_id, || -> CoreResult<Task> {
            let current: Task = self.store.get_by_id(id)?;
            let updated = self.patcher.apply(&current, patch)?;
            let saved = self.store.save(updated)?;
            tracing::debug!(task = %id, fields = ?patch.keys().collect::<Vec<_>>(), "task patched");
            Ok(saved)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use std::sync::Arc;
    use std::thread;

    fn setup() -> (Stacker, EntityId, EntityId) {
        let stacker = Stacker::in_memory();
        let owner = stacker
            .create_user(User::new("Ada Lovelace", "ada"))
            .unwrap()
            .id
            .unwrap();
        let task = stacker
            .create_task(Task::new("Write spec", "core design", owner.clone()))
            .unwrap()
            .id
            .unwrap();
        (stacker, owner, task)
    }

    #[test]
    fn unknown_field_leaves_snapshot_unchanged() {
        let (stacker, _, task) = setup();
        let before = stacker.get_task(&task).unwrap();
        let err = stacker
            .patch_task(&task, &Patch::from_pairs([("title", "x"), ("colour", "red")]))
            .unwrap_err();
        assert!(matches!(err, CoreError::UnknownField(f) if f == "colour"));
        assert_eq!(stacker.get_task(&task).unwrap(), before);
    }

    #[test]
    fn id_in_patch_is_ignored() {
        let (stacker, _, task) = setup();
        let patched = stacker
            .patch_task(&task, &Patch::from_pairs([("id", "other"), ("priority", "2")]))
            .unwrap();
        assert_eq!(patched.id.as_ref(), Some(&task));
        assert_eq!(patched.priority, Some(2));
        assert!(matches!(
            stacker.get_task(&EntityId::parse("other").unwrap()),
            Err(CoreError::NotFound { .. })
        ));
    }

    #[test]
    fn empty_patch_rejected() {
        let (stacker, owner, _) = setup();
        assert!(matches!(
            stacker.patch_user(&owner, &Patch::from_pairs([("id", "x")])),
            Err(CoreError::EmptyPatch)
        ));
    }

    #[test]
    fn patch_missing_entity_is_not_found() {
        let (stacker, _, _) = setup();
        let ghost = EntityId::parse("ghost").unwrap();
        assert!(matches!(
            stacker.patch_task(&ghost, &Patch::from_pairs([("title", "x")])),
            Err(CoreError::NotFound { .. })
        ));
    }

    #[test]
    fn user_patch_preserves_index() {
        let (stacker, owner, task) = setup();
        let patched = stacker
            .patch_user(&owner, &Patch::from_pairs([("username", "countess")]))
            .unwrap();
        assert_eq!(patched.username, "countess");
        assert_eq!(patched.item_ids, vec![task]);
    }

    #[test]
    fn ownership_cannot_be_patched() {
        let (stacker, _, task) = setup();
        assert!(matches!(
            stacker.patch_task(&task, &Patch::from_pairs([("ownerId", "U2")])),
            Err(CoreError::UnknownField(_))
        ));
    }

    #[test]
    fn user_patches_race_with_task_creation_without_losing_links() {
        let stacker = Arc::new(Stacker::in_memory());
        let owner = stacker
            .create_user(User::new("Ada Lovelace", "ada"))
            .unwrap()
            .id
            .unwrap();

        let creators: Vec<_> = (0..16)
            .map(|i| {
                let stacker = Arc::clone(&stacker);
                let owner = owner.clone();
                thread::spawn(move || {
                    stacker
                        .create_task(Task::new(format!("t{i}"), "", owner))
                        .unwrap();
                })
            })
            .collect();
        let patchers: Vec<_> = (0..16)
            .map(|i| {
                let stacker = Arc::clone(&stacker);
                let owner = owner.clone();
                thread::spawn(move || {
                    let name = format!("ada{i}");
                    stacker
                        .patch_user(&owner, &Patch::from_pairs([("username", name)]))
                        .unwrap();
                })
            })
            .collect();
        for h in creators.into_iter().chain(patchers) {
            h.join().unwrap();
        }
        assert_eq!(stacker.get_user(&owner).unwrap().item_ids.len(), 16);
    }
}
