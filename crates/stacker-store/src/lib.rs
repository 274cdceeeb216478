//! Key-value object storage for Stacker.
//!
//! Every entity is persisted as a full JSON snapshot keyed by
//! `(EntityKind, EntityId)`. The store assigns ids on first save and never
//! interprets snapshot contents beyond decoding them back into typed entities.
//!
//! # Storage Backends
//!
//! All backends implement the [`ObjectStore`] trait:
//!
//! - [`InMemoryObjectStore`] -- `HashMap`-based store for tests and embedding,
//!   with fault injection for exercising partial-failure paths
//! - [`FsObjectStore`] -- one JSON file per entity under a root directory
//!
//! Typed access (`save`, `get_by_id`, `get_many_by_id`, `list_all`,
//! `delete_by_id`) is provided for every backend by [`EntityStoreExt`].
//!
//! # Design Rules
//!
//! 1. Each single read, write or delete is atomic with respect to other calls
//!    on the same key.
//! 2. There are no multi-key transactions. Callers that need to keep two
//!    snapshots consistent must order their writes and serialize them.
//! 3. Deleting a missing key is a no-op.
//! 4. Listing a kind returns snapshots in ascending id order.
//! 5. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod fs;
pub mod memory;
pub mod object;
pub mod traits;
pub mod typed;

pub use error::{StoreError, StoreResult};
pub use fs::FsObjectStore;
pub use memory::InMemoryObjectStore;
pub use object::StoredEntity;
pub use traits::ObjectStore;
pub use typed::EntityStoreExt;
