use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use stacker_types::{Entity, EntityKind};

use crate::error::{ModelError, ModelResult};

/// The value kind of a field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldKind {
    Text,
    Integer,
    Boolean,
    /// Ordered list of entity ids. Never patchable.
    IdList,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Integer => write!(f, "integer"),
            Self::Boolean => write!(f, "boolean"),
            Self::IdList => write!(f, "id list"),
        }
    }
}

/// How a field may be written through a patch.
///
/// Patchable variants carry a typed setter, so the value kind and the way it
/// is assigned cannot drift apart.
pub enum FieldAccess<E> {
    /// Not patchable. Written only by the store or the relationship layer.
    ReadOnly(FieldKind),
    Text(fn(&mut E, String)),
    Integer(fn(&mut E, i64)),
    Boolean(fn(&mut E, bool)),
}

impl<E> FieldAccess<E> {
    pub fn kind(&self) -> FieldKind {
        match self {
            Self::ReadOnly(kind) => *kind,
            Self::Text(_) => FieldKind::Text,
            Self::Integer(_) => FieldKind::Integer,
            Self::Boolean(_) => FieldKind::Boolean,
        }
    }

    pub fn is_patchable(&self) -> bool {
        !matches!(self, Self::ReadOnly(_))
    }
}

/// One row of an entity's field table.
pub struct FieldSpec<E> {
    /// Wire name (camelCase, as in JSON bodies and form keys).
    pub name: &'static str,
    pub access: FieldAccess<E>,
    /// The kind this field refers to, if it is a relationship reference.
    pub relation: Option<EntityKind>,
}

impl<E> FieldSpec<E> {
    pub fn descriptor(&self) -> FieldDescriptor {
        FieldDescriptor {
            name: self.name.to_string(),
            kind: self.access.kind(),
            patchable: self.access.is_patchable(),
            relation: self.relation,
        }
    }
}

impl<E> fmt::Debug for FieldSpec<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSpec")
            .field("name", &self.name)
            .field("kind", &self.access.kind())
            .field("patchable", &self.access.is_patchable())
            .field("relation", &self.relation)
            .finish()
    }
}

/// An entity type with a static field table.
pub trait Model: Entity {
    fn fields() -> &'static [FieldSpec<Self>];

    fn field(name: &str) -> Option<&'static FieldSpec<Self>> {
        Self::fields().iter().find(|f| f.name == name)
    }
}

/// Untyped description of a field, for introspection and the wire.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    pub name: String,
    pub kind: FieldKind,
    pub patchable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relation: Option<EntityKind>,
}

/// The registered schema of one entity kind.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSchema {
    pub kind: EntityKind,
    pub fields: Vec<FieldDescriptor>,
}

impl ModelSchema {
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Names of the fields a patch may set.
    pub fn patchable(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(|f| f.patchable)
            .map(|f| f.name.as_str())
    }

    /// The field referring to `kind`, if any.
    pub fn relation_to(&self, kind: EntityKind) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.relation == Some(kind))
    }
}

/// Per-kind schemas, built once at startup and shared by reference.
#[derive(Clone, Debug, Default)]
pub struct ModelRegistry {
    schemas: BTreeMap<EntityKind, ModelSchema>,
}

impl ModelRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with every built-in model registered.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry
            .register::<stacker_types::User>()
            .register::<stacker_types::Task>();
        registry
    }

    /// Register (or replace) the schema of `M`.
    pub fn register<M: Model>(&mut self) -> &mut Self {
        let schema = ModelSchema {
            kind: M::KIND,
            fields: M::fields().iter().map(FieldSpec::descriptor).collect(),
        };
        self.schemas.insert(M::KIND, schema);
        self
    }

    pub fn schema(&self, kind: EntityKind) -> ModelResult<&ModelSchema> {
        self.schemas
            .get(&kind)
            .ok_or_else(|| ModelError::UnknownKind(kind.to_string()))
    }

    /// Resolve a kind by name (`"user"`, `"tasks"`, ...).
    pub fn schema_named(&self, name: &str) -> ModelResult<&ModelSchema> {
        let kind: EntityKind = name
            .parse()
            .map_err(|_| ModelError::UnknownKind(name.to_string()))?;
        self.schema(kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = EntityKind> + '_ {
        self.schemas.keys().copied()
    }

    pub fn contains(&self, kind: EntityKind) -> bool {
        self.schemas.contains_key(&kind)
    }
}
