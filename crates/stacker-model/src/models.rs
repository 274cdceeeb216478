//! Field tables for the built-in entities.

use stacker_types::{EntityKind, Task, User};

use crate::registry::{FieldAccess, FieldKind, FieldSpec, Model};

static USER_FIELDS: &[FieldSpec<User>] = &[
    FieldSpec {
        name: "id",
        access: FieldAccess::ReadOnly(FieldKind::Text),
        relation: None,
    },
    FieldSpec {
        name: "fullName",
        access: FieldAccess::Text(|u, v| u.full_name = v),
        relation: None,
    },
    FieldSpec {
        name: "username",
        access: FieldAccess::Text(|u, v| u.username = v),
        relation: None,
    },
    // Owned by the relationship layer.
    FieldSpec {
        name: "itemIds",
        access: FieldAccess::ReadOnly(FieldKind::IdList),
        relation: Some(EntityKind::Task),
    },
];

static TASK_FIELDS: &[FieldSpec<Task>] = &[
    FieldSpec {
        name: "id",
        access: FieldAccess::ReadOnly(FieldKind::Text),
        relation: None,
    },
    FieldSpec {
        name: "title",
        access: FieldAccess::Text(|t, v| t.title = v),
        relation: None,
    },
    FieldSpec {
        name: "description",
        access: FieldAccess::Text(|t, v| t.description = v),
        relation: None,
    },
    FieldSpec {
        name: "ownerId",
        access: FieldAccess::ReadOnly(FieldKind::Text),
        relation: Some(EntityKind::User),
    },
    FieldSpec {
        name: "priority",
        access: FieldAccess::Integer(|t, v| t.priority = Some(v)),
        relation: None,
    },
    FieldSpec {
        name: "accepted",
        access: FieldAccess::Boolean(|t, v| t.accepted = v),
        relation: None,
    },
];

impl Model for User {
    fn fields() -> &'static [FieldSpec<Self>] {
        USER_FIELDS
    }
}

impl Model for Task {
    fn fields() -> &'static [FieldSpec<Self>] {
        TASK_FIELDS
    }
}
