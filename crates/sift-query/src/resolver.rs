use std::collections::HashMap;

use bson::Bson;

/// The narrow contract with the model layer that owns field metadata.
///
/// `resolve` maps a logical field name to the physical column both
/// backends should address; `encode` lets a field substitute its stored
/// representation for a condition value before evaluation (skipped for
/// pattern operators, which match against the stored form directly).
pub trait FieldResolver: std::fmt::Debug {
    fn resolve(&self, field: &str) -> Option<String>;

    fn encode(&self, _field: &str, value: Bson) -> Bson {
        value
    }
}

/// Resolves every field to itself. The default on both backends.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityResolver;

impl FieldResolver for IdentityResolver {
    fn resolve(&self, field: &str) -> Option<String> {
        Some(field.to_string())
    }
}

/// An explicit field → column table. Unknown fields resolve to `None`,
/// which backends surface as an unresolved-field error.
#[derive(Debug, Clone, Default)]
pub struct FieldMap {
    columns: HashMap<String, String>,
}

impl FieldMap {
    pub fn new() -> FieldMap {
        FieldMap::default()
    }

    pub fn map(mut self, field: impl Into<String>, column: impl Into<String>) -> FieldMap {
        self.columns.insert(field.into(), column.into());
        self
    }
}

impl FieldResolver for FieldMap {
    fn resolve(&self, field: &str) -> Option<String> {
        self.columns.get(field).cloned()
    }
}
