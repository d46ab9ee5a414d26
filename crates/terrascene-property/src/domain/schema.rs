//! Configuration schemas declared by plugins.

use serde::{Deserialize, Serialize};
use terrascene_core::plugin_id::PropertySchemaId;

use super::value::ValueType;

/// A field declared by a schema group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaField {
    /// Field identifier, unique within the schema.
    pub id: String,
    /// Declared value type.
    #[serde(rename = "type")]
    pub value_type: ValueType,
}

/// A named group of fields. List groups hold repeated entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaGroup {
    /// Group identifier.
    pub id: String,
    /// Whether the group is repeatable.
    #[serde(default)]
    pub list: bool,
    /// Fields in declaration order.
    #[serde(default)]
    pub fields: Vec<SchemaField>,
}

impl SchemaGroup {
    /// Looks up a field by id.
    #[must_use]
    pub fn field(&self, id: &str) -> Option<&SchemaField> {
        self.fields.iter().find(|f| f.id == id)
    }
}

/// The shape every property bound to this schema follows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertySchema {
    /// Schema identifier.
    pub id: PropertySchemaId,
    /// Groups in declaration order.
    pub groups: Vec<SchemaGroup>,
}

impl PropertySchema {
    /// Looks up a group by id.
    #[must_use]
    pub fn group(&self, id: &str) -> Option<&SchemaGroup> {
        self.groups.iter().find(|g| g.id == id)
    }

    /// Finds the group declaring `field`, with the field itself.
    #[must_use]
    pub fn find_field(&self, field: &str) -> Option<(&SchemaGroup, &SchemaField)> {
        self.groups
            .iter()
            .find_map(|g| g.field(field).map(|f| (g, f)))
    }
}
