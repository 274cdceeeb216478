//! Foundation types for Stacker.
//!
//! Every other Stacker crate depends on `stacker-types`. It defines what is
//! stored, not how it is stored.
//!
//! # Key Types
//!
//! - [`EntityId`] — Opaque, store-assigned identifier (UUID v7 text by default)
//! - [`EntityKind`] — Closed set of persisted entity kinds
//! - [`Entity`] — Trait tying a Rust type to its kind and id slot
//! - [`User`] — An owner of tasks, holding the ordered `itemIds` index
//! - [`Task`] — A work item referencing exactly one owning user

pub mod entity;
pub mod error;
pub mod id;
pub mod kind;
pub mod task;
pub mod user;

pub use entity::Entity;
pub use error::TypeError;
pub use id::EntityId;
pub use kind::EntityKind;
pub use task::Task;
pub use user::User;
