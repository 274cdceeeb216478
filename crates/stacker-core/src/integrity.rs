//! Offline consistency scan of the user → task index, and its repairs.
//!
//! Nothing here runs implicitly. An operator runs the scan (`stacker check`)
//! and decides which reported issues to repair (`stacker repair`). Issues
//! found while requests are in flight can be transient; every repair
//! re-checks its precondition inside the owner's scope before writing.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::Serialize;
use stacker_store::EntityStoreExt;
use stacker_types::{EntityId, EntityKind, Task, User};

use crate::error::CoreResult;
use crate::service::Stacker;

/// One inconsistency between the user indexes and the stored tasks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "issue", rename_all = "camelCase")]
pub enum IntegrityIssue {
    /// `owner` lists `task`, which does not exist.
    /// Repair: drop the id from the index.
    DanglingReference { owner: EntityId, task: EntityId },
    /// `task` exists but its owner does not list it.
    /// Repair: append it to the owner's index.
    OrphanedTask { task: EntityId, owner: EntityId },
    /// `task` names an owner that does not exist.
    /// Repair: delete the task.
    MissingOwner { task: EntityId, owner: EntityId },
    /// `holder` lists `task`, which belongs to `owner`.
    /// Repair: drop the id from the holder's index.
    MisfiledReference {
        holder: EntityId,
        task: EntityId,
        owner: EntityId,
    },
    /// `owner` lists `task` more than once.
    /// Repair: keep the first occurrence.
    DuplicateReference { owner: EntityId, task: EntityId },
}

impl IntegrityIssue {
    /// The user whose scope a repair must hold.
    fn scope(&self) -> &EntityId {
        match self {
            Self::DanglingReference { owner, .. }
            | Self::OrphanedTask { owner, .. }
            | Self::MissingOwner { owner, .. }
            | Self::DuplicateReference { owner, .. } => owner,
            Self::MisfiledReference { holder, .. } => holder,
        }
    }
}

impl fmt::Display for IntegrityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DanglingReference { owner, task } => {
                write!(f, "user {owner} references missing task {task}")
            }
            Self::OrphanedTask { task, owner } => {
                write!(f, "task {task} is missing from the index of user {owner}")
            }
            Self::MissingOwner { task, owner } => {
                write!(f, "task {task} belongs to missing user {owner}")
            }
            Self::MisfiledReference {
                holder,
                task,
                owner,
            } => write!(f, "user {holder} references task {task} owned by {owner}"),
            Self::DuplicateReference { owner, task } => {
                write!(f, "user {owner} references task {task} more than once")
            }
        }
    }
}

/// Result of [`Stacker::check_integrity`].
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrityReport {
    pub users_scanned: usize,
    pub tasks_scanned: usize,
    pub issues: Vec<IntegrityIssue>,
}

impl IntegrityReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

impl Stacker {
    /// Scan every user index against every stored task.
    pub fn check_integrity(&self) -> CoreResult<IntegrityReport> {
        let users: Vec<User> = self.store.list_all()?;
        let tasks: Vec<Task> = self.store.list_all()?;

        let owners: HashMap<&EntityId, &EntityId> = tasks
            .iter()
            .filter_map(|t| t.id.as_ref().map(|id| (id, &t.owner_id)))
            .collect();
        let indexes: HashMap<&EntityId, &User> = users
            .iter()
            .filter_map(|u| u.id.as_ref().map(|id| (id, u)))
            .collect();

        let mut issues = Vec::new();
        for (user_id, user) in &indexes {
            let mut seen = HashSet::new();
            for task_id in &user.item_ids {
                if !seen.insert(task_id) {
                    issues.push(IntegrityIssue::DuplicateReference {
                        owner: (*user_id).clone(),
                        task: task_id.clone(),
                    });
                    continue;
                }
                match owners.get(task_id) {
                    None => issues.push(IntegrityIssue::DanglingReference {
                        owner: (*user_id).clone(),
                        task: task_id.clone(),
                    }),
                    Some(owner) if owner != user_id => {
                        issues.push(IntegrityIssue::MisfiledReference {
                            holder: (*user_id).clone(),
                            task: task_id.clone(),
                            owner: (*owner).clone(),
                        })
                    }
                    Some(_) => {}
                }
            }
        }

        for (task_id, owner_id) in &owners {
            match indexes.get(owner_id) {
                None => issues.push(IntegrityIssue::MissingOwner {
                    task: (*task_id).clone(),
                    owner: (*owner_id).clone(),
                }),
                Some(owner) if !owner.owns(task_id) => {
                    issues.push(IntegrityIssue::OrphanedTask {
                        task: (*task_id).clone(),
                        owner: (*owner_id).clone(),
                    })
                }
                Some(_) => {}
            }
        }

        // HashMap iteration order is arbitrary; keep reports reproducible.
        issues.sort_by_key(|i| i.to_string());

        for issue in &issues {
            tracing::warn!(%issue, "data integrity");
        }
        Ok(IntegrityReport {
            users_scanned: users.len(),
            tasks_scanned: tasks.len(),
            issues,
        })
    }

    /// Apply the documented repair for one issue.
    ///
    /// Returns `false` when the issue no longer holds and nothing was written.
    pub fn repair(&self, issue: &IntegrityIssue) -> CoreResult<bool> {
        let changed = self
            .locks
            .with_owner(issue.scope(), || self.apply_repair(issue))?;
        if changed {
            tracing::info!(%issue, "repaired");
        }
        Ok(changed)
    }

    fn apply_repair(&self, issue: &IntegrityIssue) -> CoreResult<bool> {
        match issue {
            IntegrityIssue::DanglingReference { owner, task } => {
                if self.store.exists(EntityKind::Task, task)? {
                    return Ok(false);
                }
                self.rewrite_index(owner, |u| u.unlink(task))
            }
            IntegrityIssue::OrphanedTask { task, owner } => {
                let still_owned = self
                    .store
                    .find_by_id::<Task>(task)?
                    .is_some_and(|t| &t.owner_id == owner);
                if !still_owned {
                    return Ok(false);
                }
                self.rewrite_index(owner, |u| u.link(task.clone()))
            }
            IntegrityIssue::MissingOwner { task, owner } => {
                if self.store.exists(EntityKind::User, owner)? {
                    return Ok(false);
                }
                Ok(self.store.delete_by_id::<Task>(task)?)
            }
            IntegrityIssue::MisfiledReference { holder, task, .. } => {
                let belongs_to_holder = self
                    .store
                    .find_by_id::<Task>(task)?
                    .is_some_and(|t| &t.owner_id == holder);
                if belongs_to_holder {
                    return Ok(false);
                }
                self.rewrite_index(holder, |u| u.unlink(task))
            }
            IntegrityIssue::DuplicateReference { owner, task } => {
                self.rewrite_index(owner, |u| {
                    let mut seen = false;
                    let before = u.item_ids.len();
                    u.item_ids.retain(|id| {
                        if id != task {
                            return true;
                        }
                        !std::mem::replace(&mut seen, true)
                    });
                    u.item_ids.len() != before
                })
            }
        }
    }

    /// Repair every issue in `report`, returning how many changed something.
    pub fn repair_all(&self, report: &IntegrityReport) -> CoreResult<usize> {
        let mut repaired = 0;
        for issue in &report.issues {
            if self.repair(issue)? {
                repaired += 1;
            }
        }
        Ok(repaired)
    }

    /// Load a user, apply `edit` to it, and save it if `edit` reports a change.
    fn rewrite_index(&self, owner: &EntityId, edit: impl FnOnce(&mut User) -> bool) -> CoreResult<bool> {
        let Some(mut user) = self.store.find_by_id::<User>(owner)? else {
            return Ok(false);
        };
        if !edit(&mut user) {
            return Ok(false);
        }
        self.store.save(user)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use stacker_model::ModelRegistry;
    use stacker_store::{InMemoryObjectStore, ObjectStore, StoreError, StoreResult, StoredEntity};

    use crate::error::CoreError;

    /// Fails user writes and all deletes while `broken` is set, to leave the
    /// half-finished state a crash would.
    #[derive(Default)]
    struct BrokenOwnerWrites {
        inner: InMemoryObjectStore,
        broken: AtomicBool,
    }

    impl BrokenOwnerWrites {
        fn fail(&self) -> StoreResult<()> {
            if self.broken.load(Ordering::SeqCst) {
                return Err(StoreError::Unavailable("injected".into()));
            }
            Ok(())
        }
    }

    impl ObjectStore for BrokenOwnerWrites {
        fn read(&self, kind: EntityKind, id: &EntityId) -> StoreResult<Option<StoredEntity>> {
            self.inner.read(kind, id)
        }

        fn write(&self, object: &StoredEntity) -> StoreResult<()> {
            if object.kind == EntityKind::User {
                self.fail()?;
            }
            self.inner.write(object)
        }

        fn delete(&self, kind: EntityKind, id: &EntityId) -> StoreResult<bool> {
            self.fail()?;
            self.inner.delete(kind, id)
        }

        fn list(&self, kind: EntityKind) -> StoreResult<Vec<StoredEntity>> {
            self.inner.list(kind)
        }
    }

    fn setup() -> (Arc<BrokenOwnerWrites>, Stacker, EntityId) {
        let store = Arc::new(BrokenOwnerWrites::default());
        let stacker = Stacker::new(store.clone(), Arc::new(ModelRegistry::standard()));
        let owner = stacker
            .create_user(User::new("Ada Lovelace", "ada"))
            .unwrap()
            .id
            .unwrap();
        (store, stacker, owner)
    }

    #[test]
    fn clean_store_reports_nothing() {
        let (_, stacker, owner) = setup();
        stacker.create_task(Task::new("a", "", owner)).unwrap();
        let report = stacker.check_integrity().unwrap();
        assert!(report.is_clean());
        assert_eq!(report.users_scanned, 1);
        assert_eq!(report.tasks_scanned, 1);
    }

    #[test]
    fn interrupted_creation_is_found_and_relinked() {
        let (store, stacker, owner) = setup();
        store.broken.store(true, Ordering::SeqCst);
        let err = stacker.create_task(Task::new("a", "", owner.clone())).unwrap_err();
        assert!(matches!(err, CoreError::StoreUnavailable(_)));
        store.broken.store(false, Ordering::SeqCst);

        let report = stacker.check_integrity().unwrap();
        let task = stacker.list_tasks().unwrap().remove(0).id.unwrap();
        assert_eq!(
            report.issues,
            vec![IntegrityIssue::OrphanedTask {
                task: task.clone(),
                owner: owner.clone()
            }]
        );

        assert_eq!(stacker.repair_all(&report).unwrap(), 1);
        assert_eq!(stacker.get_user(&owner).unwrap().item_ids, vec![task]);
        assert!(stacker.check_integrity().unwrap().is_clean());
    }

    #[test]
    fn dangling_reference_is_dropped() {
        let (_, stacker, owner) = setup();
        let keep = stacker.create_task(Task::new("keep", "", owner.clone())).unwrap();
        let lost = stacker.create_task(Task::new("lost", "", owner.clone())).unwrap();
        let lost_id = lost.id.unwrap();
        stacker.store().delete_by_id::<Task>(&lost_id).unwrap();

        let report = stacker.check_integrity().unwrap();
        assert_eq!(
            report.issues,
            vec![IntegrityIssue::DanglingReference {
                owner: owner.clone(),
                task: lost_id
            }]
        );
        stacker.repair_all(&report).unwrap();
        assert_eq!(stacker.get_tasks_for_user(&owner).unwrap(), vec![keep]);
    }

    #[test]
    fn task_with_missing_owner_is_deleted() {
        let (_, stacker, _) = setup();
        let ghost = EntityId::parse("ghost").unwrap();
        let orphan = stacker
            .store()
            .save(Task::new("stray", "", ghost.clone()))
            .unwrap();
        let report = stacker.check_integrity().unwrap();
        let issue = IntegrityIssue::MissingOwner {
            task: orphan.id.clone().unwrap(),
            owner: ghost,
        };
        assert_eq!(report.issues, vec![issue.clone()]);
        assert!(stacker.repair(&issue).unwrap());
        assert!(stacker.list_tasks().unwrap().is_empty());
    }

    #[test]
    fn misfiled_and_duplicate_references() {
        let (_, stacker, ada) = setup();
        let bob = stacker
            .create_user(User::new("Bob", "bob"))
            .unwrap()
            .id
            .unwrap();
        let task = stacker
            .create_task(Task::new("a", "", ada.clone()))
            .unwrap()
            .id
            .unwrap();

        let mut bob_user = stacker.get_user(&bob).unwrap();
        bob_user.item_ids.push(task.clone());
        stacker.store().save(bob_user).unwrap();
        let mut ada_user = stacker.get_user(&ada).unwrap();
        ada_user.item_ids.push(task.clone());
        stacker.store().save(ada_user).unwrap();

        let report = stacker.check_integrity().unwrap();
        assert_eq!(report.issues.len(), 2);
        assert!(report.issues.contains(&IntegrityIssue::DuplicateReference {
            owner: ada.clone(),
            task: task.clone()
        }));
        assert!(report.issues.contains(&IntegrityIssue::MisfiledReference {
            holder: bob.clone(),
            task: task.clone(),
            owner: ada.clone()
        }));

        assert_eq!(stacker.repair_all(&report).unwrap(), 2);
        assert_eq!(stacker.get_user(&ada).unwrap().item_ids, vec![task]);
        assert!(stacker.get_user(&bob).unwrap().item_ids.is_empty());
        assert!(stacker.check_integrity().unwrap().is_clean());
    }

    #[test]
    fn stale_issue_repairs_nothing() {
        let (_, stacker, owner) = setup();
        let task = stacker
            .create_task(Task::new("a", "", owner.clone()))
            .unwrap()
            .id
            .unwrap();
        let stale = IntegrityIssue::DanglingReference { owner, task };
        assert!(!stacker.repair(&stale).unwrap());
    }

    #[test]
    fn report_serializes_with_issue_tags() {
        let (_, stacker, _) = setup();
        let ghost = EntityId::parse("ghost").unwrap();
        stacker.store().save(Task::new("stray", "", ghost)).unwrap();
        let json = serde_json::to_value(stacker.check_integrity().unwrap()).unwrap();
        assert_eq!(json["issues"][0]["issue"], "missingOwner");
        assert_eq!(json["tasksScanned"], 1);
    }
}
