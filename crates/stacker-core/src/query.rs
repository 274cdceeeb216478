use stacker_store::{EntityStoreExt, StoreError};
use stacker_types::{EntityId, Task, User};

use crate::error::{CoreError, CoreResult};
use crate::service::Stacker;

impl Stacker {
    pub fn list_users(&self) -> CoreResult<Vec<User>> {
        Ok(self.store.list_all()?)
    }

    pub fn list_tasks(&self) -> CoreResult<Vec<Task>> {
        Ok(self.store.list_all()?)
    }

    pub fn get_user(&self, id: &EntityId) -> CoreResult<User> {
        Ok(self.store.get_by_id(id)?)
    }

    pub fn get_task(&self, id: &EntityId) -> CoreResult<Task> {
        Ok(self.store.get_by_id(id)?)
    }

    /// The tasks of a user, in the order of its `itemIds`.
    ///
    /// A referenced task that does not exist is reported as
    /// [`CoreError::InconsistentIndex`]; the index is left as it is.
    pub fn get_tasks_for_user(&self, id: &EntityId) -> CoreResult<Vec<Task>> {
        let owner: User = self.store.get_by_id(id)?;
        match self.store.get_many_by_id::<Task>(&owner.item_ids) {
            Ok(tasks) => Ok(tasks),
            Err(StoreError::NotFound { id: missing, .. }) => {
                tracing::warn!(
                    owner = %id,
                    missing = %missing,
                    "data integrity: user index references a missing task"
                );
                Err(CoreError::InconsistentIndex {
                    owner: id.clone(),
                    missing,
                })
            }
            Err(e) => Err(e.into()),
        }
    }
}
