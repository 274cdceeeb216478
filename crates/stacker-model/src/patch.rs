use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;

use crate::coerce::{parse_boolean, parse_integer};
use crate::error::{ModelError, ModelResult};
use crate::registry::{FieldAccess, Model, ModelRegistry};

/// The immutable id key. Present in a patch, it is ignored.
pub const ID_FIELD: &str = "id";

/// A sparse update: field name to one or more raw values.
///
/// Repeated keys accumulate, matching how form submissions encode them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Patch {
    fields: BTreeMap<String, Vec<String>>,
}

impl Patch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(name, value)` pairs, grouping repeated names in order.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut patch = Self::new();
        for (k, v) in pairs {
            patch.push(k, v);
        }
        patch
    }

    /// Build from a JSON object body.
    ///
    /// Strings, numbers and booleans become a single raw value; arrays become
    /// one raw value per element; `null` becomes an empty value list. Nested
    /// objects are rejected.
    pub fn from_json(object: &serde_json::Map<String, Value>) -> ModelResult<Self> {
        let mut patch = Self::new();
        for (name, value) in object {
            let values = match value {
                Value::Array(items) => items
                    .iter()
                    .map(|item| json_scalar(name, item))
                    .collect::<ModelResult<Vec<_>>>()?,
                Value::Null => Vec::new(),
                scalar => vec![json_scalar(name, scalar)?],
            };
            patch.fields.insert(name.clone(), values);
        }
        Ok(patch)
    }

    /// Append one raw value for `name`.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.fields.entry(name.into()).or_default().push(value.into());
        self
    }

    /// Field names, in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.fields.get(name).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Entries other than the ignored `id` key.
    fn updates(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.fields
            .iter()
            .filter(|(k, _)| k.as_str() != ID_FIELD)
            .map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

fn json_scalar(field: &str, value: &Value) -> ModelResult<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Err(ModelError::mismatch(field, "null inside a value list")),
        Value::Array(_) | Value::Object(_) => {
            Err(ModelError::mismatch(field, "nested values are not supported"))
        }
    }
}

/// A validated, typed write waiting to be applied.
enum Assignment<M> {
    Text(fn(&mut M, String), String),
    Integer(fn(&mut M, i64), i64),
    Boolean(fn(&mut M, bool), bool),
}

impl<M> Assignment<M> {
    fn apply(self, target: &mut M) {
        match self {
            Self::Text(set, v) => set(target, v),
            Self::Integer(set, v) => set(target, v),
            Self::Boolean(set, v) => set(target, v),
        }
    }
}

/// Applies [`Patch`]es to entities using the field tables of the registry.
#[derive(Clone, Debug)]
pub struct Patcher {
    registry: Arc<ModelRegistry>,
}

impl Patcher {
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Validate `patch` in full, then apply it to a copy of `entity`.
    ///
    /// Rules, checked for every key before any assignment happens:
    /// - `id` is ignored.
    /// - every other key must name a patchable field (`UnknownField`).
    /// - scalar fields take exactly one value (`MultiValueNotAllowed`, or
    ///   `TypeMismatch` when none was given).
    /// - values must coerce to the field's kind (`TypeMismatch`).
    /// - at least one key besides `id` must remain (`EmptyPatch`).
    ///
    /// Keys are visited in sorted order, so the reported error is
    /// deterministic when several keys are invalid.
    pub fn apply<M: Model>(&self, entity: &M, patch: &Patch) -> ModelResult<M> {
        self.registry.schema(M::KIND)?;

        let mut assignments = Vec::with_capacity(patch.len());
        for (name, values) in patch.updates() {
            assignments.push(Self::validate_field::<M>(name, values)?);
        }
        if assignments.is_empty() {
            return Err(ModelError::EmptyPatch);
        }

        let mut updated = entity.clone();
        for assignment in assignments {
            assignment.apply(&mut updated);
        }
        tracing::trace!(kind = %M::KIND, fields = ?patch.keys().collect::<Vec<_>>(), "patch applied");
        Ok(updated)
    }

    fn validate_field<M: Model>(name: &str, values: &[String]) -> ModelResult<Assignment<M>> {
        let spec = M::field(name)
            .filter(|spec| spec.access.is_patchable())
            .ok_or_else(|| ModelError::UnknownField(name.to_string()))?;

        let raw = match values {
            [single] => single.as_str(),
            [] => return Err(ModelError::mismatch(name, "no value supplied")),
            // Every patchable field is scalar.
            [_, _, ..] => return Err(ModelError::MultiValueNotAllowed(name.to_string())),
        };

        Ok(match spec.access {
            FieldAccess::Text(set) => Assignment::Text(set, raw.to_string()),
            FieldAccess::Integer(set) => Assignment::Integer(set, parse_integer(name, raw)?),
            FieldAccess::Boolean(set) => Assignment::Boolean(set, parse_boolean(name, raw)?),
            FieldAccess::ReadOnly(_) => return Err(ModelError::UnknownField(name.to_string())),
        })
    }
}
