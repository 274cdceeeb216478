//! Typed entity access layered over any [`ObjectStore`].

use stacker_types::{Entity, EntityId};

use crate::error::{StoreError, StoreResult};
use crate::object::StoredEntity;
use crate::traits::ObjectStore;

/// Typed operations for every [`ObjectStore`], parameterized by entity type.
///
/// The entity type selects the store namespace through [`Entity::KIND`], so
/// callers never pass kind names around.
pub trait EntityStoreExt: ObjectStore {
    /// Persist a full snapshot, assigning an id first if the entity has none.
    fn save<E: Entity>(&self, mut entity: E) -> StoreResult<E> {
        if entity.id().is_none() {
            let id = self.generate_id(E::KIND);
            tracing::debug!(kind = %E::KIND, %id, "assigning id");
            entity.assign_id(id);
        }
        self.write(&StoredEntity::encode(&entity)?)?;
        Ok(entity)
    }

    /// Load an entity, failing with [`StoreError::NotFound`] if absent.
    fn get_by_id<E: Entity>(&self, id: &EntityId) -> StoreResult<E> {
        self.find_by_id(id)?.ok_or_else(|| StoreError::NotFound {
            kind: E::KIND,
            id: id.clone(),
        })
    }

    /// Load an entity if it exists.
    fn find_by_id<E: Entity>(&self, id: &EntityId) -> StoreResult<Option<E>> {
        self.read(E::KIND, id)?.map(|obj| obj.decode()).transpose()
    }

    /// Load entities in the order of `ids`.
    ///
    /// Fails fast with [`StoreError::NotFound`] naming the first missing id.
    fn get_many_by_id<E: Entity>(&self, ids: &[EntityId]) -> StoreResult<Vec<E>> {
        self.read_batch(E::KIND, ids)?
            .into_iter()
            .zip(ids)
            .map(|(obj, id)| match obj {
                Some(obj) => obj.decode(),
                None => Err(StoreError::NotFound {
                    kind: E::KIND,
                    id: id.clone(),
                }),
            })
            .collect()
    }

    /// Every entity of this type, ascending by id.
    fn list_all<E: Entity>(&self) -> StoreResult<Vec<E>> {
        self.list(E::KIND)?.iter().map(StoredEntity::decode).collect()
    }

    /// Delete an entity. Deleting a missing id is a no-op returning `false`.
    fn delete_by_id<E: Entity>(&self, id: &EntityId) -> StoreResult<bool> {
        self.delete(E::KIND, id)
    }
}

impl<S: ObjectStore + ?Sized> EntityStoreExt for S {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryObjectStore;
    use stacker_types::{EntityKind, Task, User};

    #[test]
    fn save_assigns_id_once() {
        let store = InMemoryObjectStore::new();
        let saved = store.save(User::new("Ada Lovelace", "ada")).unwrap();
        let id = saved.id.clone().expect("id assigned");

        let mut renamed = saved.clone();
        renamed.username = "countess".into();
        let resaved = store.save(renamed).unwrap();
        assert_eq!(resaved.id.as_ref(), Some(&id));
        assert_eq!(store.list_all::<User>().unwrap().len(), 1);
    }

    #[test]
    fn save_then_get_round_trips() {
        let store = InMemoryObjectStore::new();
        let owner = EntityId::parse("U1").unwrap();
        let task = Task::new("Write spec", "core design", owner).with_priority(2);
        let saved = store.save(task.clone()).unwrap();
        let loaded: Task = store.get_by_id(saved.id.as_ref().unwrap()).unwrap();
        assert_eq!(loaded, saved);
        assert_eq!(
            Task {
                id: None,
                ..loaded
            },
            task
        );
    }

    #[test]
    fn get_by_id_missing_is_not_found() {
        let store = InMemoryObjectStore::new();
        let id = EntityId::parse("nope").unwrap();
        let err = store.get_by_id::<User>(&id).unwrap_err();
        assert!(matches!(
            err,
            StoreError::NotFound { kind: EntityKind::User, .. }
        ));
    }

    #[test]
    fn get_many_preserves_input_order() {
        let store = InMemoryObjectStore::new();
        let a = store.save(User::new("A", "a")).unwrap();
        let b = store.save(User::new("B", "b")).unwrap();
        let ids = vec![b.id.clone().unwrap(), a.id.clone().unwrap()];
        let users: Vec<User> = store.get_many_by_id(&ids).unwrap();
        assert_eq!(users, vec![b, a]);
    }

    #[test]
    fn get_many_fails_on_first_missing() {
        let store = InMemoryObjectStore::new();
        let a = store.save(User::new("A", "a")).unwrap();
        let missing1 = EntityId::parse("missing1").unwrap();
        let missing2 = EntityId::parse("missing2").unwrap();
        let ids = vec![a.id.unwrap(), missing1.clone(), missing2];
        match store.get_many_by_id::<User>(&ids) {
            Err(StoreError::NotFound { id, .. }) => assert_eq!(id, missing1),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn namespaces_do_not_collide() {
        let store = InMemoryObjectStore::new();
        let user = store.save(User::new("A", "a")).unwrap();
        let id = user.id.unwrap();
        assert!(store.find_by_id::<Task>(&id).unwrap().is_none());
    }

    #[test]
    fn delete_is_idempotent() {
        let store = InMemoryObjectStore::new();
        let user = store.save(User::new("A", "a")).unwrap();
        let id = user.id.unwrap();
        assert!(store.delete_by_id::<User>(&id).unwrap());
        assert!(!store.delete_by_id::<User>(&id).unwrap());
        assert!(store.find_by_id::<User>(&id).unwrap().is_none());
    }

    #[test]
    fn list_all_is_stable_across_calls() {
        let store = InMemoryObjectStore::new();
        for i in 0..5 {
            store.save(User::new(format!("User {i}"), format!("u{i}"))).unwrap();
        }
        let first: Vec<User> = store.list_all().unwrap();
        let second: Vec<User> = store.list_all().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 5);
    }

    #[test]
    fn works_through_trait_object() {
        let store: Box<dyn ObjectStore> = Box::new(InMemoryObjectStore::new());
        let saved = store.save(User::new("A", "a")).unwrap();
        let loaded: User = store.get_by_id(saved.id.as_ref().unwrap()).unwrap();
        assert_eq!(loaded, saved);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn arb_id() -> impl Strategy<Value = EntityId> {
            "[A-Za-z0-9_-]{1,24}".prop_map(|s| EntityId::parse(&s).unwrap())
        }

        fn arb_user() -> impl Strategy<Value = User> {
            (
                "\\PC{0,20}",
                "\\PC{0,20}",
                proptest::collection::vec(arb_id(), 0..8),
            )
                .prop_map(|(full_name, username, item_ids)| {
                    let mut user = User::new(full_name, username);
                    for id in item_ids {
                        user.link(id);
                    }
                    user
                })
        }

        fn arb_task() -> impl Strategy<Value = Task> {
            (
                "\\PC{0,50}",
                "\\PC{0,200}",
                arb_id(),
                proptest::option::of(any::<i64>()),
                any::<bool>(),
            )
                .prop_map(|(title, description, owner, priority, accepted)| {
                    let task = Task::new(title, description, owner).with_accepted(accepted);
                    match priority {
                        Some(p) => task.with_priority(p),
                        None => task,
                    }
                })
        }

        proptest! {
            #[test]
            fn user_round_trips_except_assigned_id(user in arb_user()) {
                let store = InMemoryObjectStore::new();
                let saved = store.save(user.clone()).unwrap();
                let loaded: User = store.get_by_id(saved.id.as_ref().unwrap()).unwrap();
                prop_assert_eq!(&loaded, &saved);
                prop_assert_eq!(User { id: None, ..loaded }, user);
            }

            #[test]
            fn task_round_trips_except_assigned_id(task in arb_task()) {
                let store = InMemoryObjectStore::new();
                let saved = store.save(task.clone()).unwrap();
                let loaded: Task = store.get_by_id(saved.id.as_ref().unwrap()).unwrap();
                prop_assert_eq!(&loaded, &saved);
                prop_assert_eq!(Task { id: None, ..loaded }, task);
            }
        }
    }
}
