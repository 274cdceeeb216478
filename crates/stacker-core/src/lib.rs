//! Stacker service core.
//!
//! [`Stacker`] ties an [`ObjectStore`](stacker_store::ObjectStore) and a
//! [`ModelRegistry`](stacker_model::ModelRegistry) together and exposes every
//! operation the HTTP layer needs: queries, partial updates, and the
//! create/delete paths that keep each user's `itemIds` index in step with the
//! tasks that exist.
//!
//! # Consistency model
//!
//! The store has no multi-key transactions. Every write that touches a
//! user's index, or a task that appears in one, runs inside that user's
//! exclusive scope ([`OwnerLocks`]), which rules out lost updates between
//! concurrent requests in this process. Crash atomicity is not provided:
//!
//! - task creation writes the task first and the user second; a failure in
//!   between is compensated by deleting the task, and if that also fails the
//!   task is left orphaned.
//! - task deletion writes the user first and deletes the task second; a
//!   failure in between leaves a task that no index references.
//!
//! Both leftovers are reported by [`Stacker::check_integrity`] and fixed by
//! [`Stacker::repair`]. Reads never repair anything on their own.

pub mod error;
pub mod integrity;
pub mod locks;
pub mod patching;
pub mod query;
pub mod relations;
pub mod service;

pub use error::{CoreError, CoreResult};
pub use integrity::{IntegrityIssue, IntegrityReport};
pub use locks::OwnerLocks;
pub use service::Stacker;
