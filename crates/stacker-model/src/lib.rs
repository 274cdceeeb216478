//! Model registry and field patcher for Stacker.
//!
//! Partial updates arrive as a sparse map of field name to raw string values
//! (the shape of an HTML form submission). Instead of inspecting entity types
//! at runtime, every entity kind declares a static table of its fields, each
//! tagged with its value kind and, if patchable, a typed setter. The
//! [`Patcher`] validates a whole [`Patch`] against that table before touching
//! anything, so a rejected patch never changes an entity.
//!
//! # Modules
//!
//! - [`registry`] — [`FieldSpec`] tables, the [`Model`] trait, [`ModelRegistry`]
//! - [`coerce`] — raw string to typed value conversion
//! - [`patch`] — [`Patch`] input and the [`Patcher`]
//! - [`models`] — field tables for [`User`](stacker_types::User) and
//!   [`Task`](stacker_types::Task)

pub mod coerce;
pub mod error;
pub mod models;
pub mod patch;
pub mod registry;

pub use error::{ModelError, ModelResult};
pub use patch::{Patch, Patcher, ID_FIELD};
pub use registry::{FieldAccess, FieldDescriptor, FieldKind, FieldSpec, Model, ModelRegistry, ModelSchema};
