//! Creation and deletion paths that maintain each user's `itemIds` index.

use stacker_store::EntityStoreExt;
use stacker_types::{EntityId, EntityKind, Task, User};

use crate::error::{CoreError, CoreResult};
use crate::service::{saved_id, Stacker};

impl Stacker {
    /// Create a user. Any id or task ids on the input are discarded.
    pub fn create_user(&self, mut user: User) -> CoreResult<User> {
        user.id = None;
        user.item_ids.clear();
        let user = self.store.save(user)?;
        tracing::info!(id = %saved_id(&user)?, username = %user.username, "user created");
        Ok(user)
    }

    /// Create a task and append it to its owner's index.
    ///
    /// The owner is resolved before anything is written. The task is written
    /// first, then the owner. If the owner write fails the task is deleted
    /// again; if that fails too, the task stays behind as an orphan for the
    /// integrity scan to find.
    pub fn create_task(&self, mut task: Task) -> CoreResult<Task> {
        task.id = None;
        let owner_id = task.owner_id.clone();

        self.locks.with_owner(&owner_id, || -> CoreResult<Task> {
            let mut owner: User = self
                .store
                .find_by_id(&owner_id)?
                .ok_or_else(|| CoreError::OwnerNotFound(owner_id.clone()))?;

            let task = self.store.save(task)?;
            let task_id = saved_id(&task)?;

            owner.link(task_id.clone());
            if let Err(e) = self.store.save(owner) {
                self.compensate_orphan(&task_id, &owner_id);
                return Err(e.into());
            }

            tracing::info!(task = %task_id, owner = %owner_id, "task created");
            Ok(task)
        })
    }

    fn compensate_orphan(&self, task: &EntityId, owner: &EntityId) {
        match self.store.delete_by_id::<Task>(task) {
            Ok(_) => tracing::warn!(%task, %owner, "owner update failed; task creation rolled back"),
            Err(e) => tracing::error!(
                %task,
                %owner,
                error = %e,
                "owner update failed and rollback failed; task is orphaned until repaired"
            ),
        }
    }

    /// Delete a task and remove it from its owner's index.
    ///
    /// Returns `false` if the task did not exist. The owner is written before
    /// the task is deleted, so an interruption leaves an unreferenced task
    /// rather than an index entry pointing at nothing.
    pub fn delete_task(&self, id: &EntityId) -> CoreResult<bool> {
        let Some(task) = self.store.find_by_id::<Task>(id)? else {
            tracing::debug!(task = %id, "delete of absent task");
            return Ok(false);
        };
        let owner_id = task.owner_id;

        self.locks.with_owner(&owner_id, || -> CoreResult<bool> {
            // A concurrent delete may have won while we waited.
            if !self.store.exists(EntityKind::Task, id)? {
                return Ok(false);
            }

            match self.store.find_by_id::<User>(&owner_id)? {
                Some(mut owner) => {
                    if owner.unlink(id) {
                        self.store.save(owner)?;
                    } else {
                        tracing::warn!(task = %id, owner = %owner_id, "data integrity: task was not in its owner's index");
                    }
                }
                None => {
                    tracing::warn!(task = %id, owner = %owner_id, "data integrity: task owner does not exist");
                }
            }

            self.store.delete_by_id::<Task>(id)?;
            tracing::info!(task = %id, owner = %owner_id, "task deleted");
            Ok(true)
        })
    }

    /// Delete a user that owns no tasks.
    ///
    /// Returns `false` if the user did not exist, and
    /// [`CoreError::OwnerHasItems`] while its index is non-empty.
    pub fn delete_user(&self, id: &EntityId) -> CoreResult<bool> {
        self.locks.with_owner(id, || -> CoreResult<bool> {
            let Some(owner) = self.store.find_by_id::<User>(id)? else {
                return Ok(false);
            };
            if !owner.item_ids.is_empty() {
                return Err(CoreError::OwnerHasItems {
                    owner: id.clone(),
                    count: owner.item_ids.len(),
                });
            }
            self.store.delete_by_id::<User>(id)?;
            tracing::info!(user = %id, "user deleted");
            Ok(true)
        })
    }
}
