//! Field-level differences between two versions of a configuration schema.
//!
//! Fields are matched by id across the whole schema: a field whose id
//! disappears is deleted, one that reappears under another group is moved,
//! and one whose declared type changed is retyped.

use serde::{Deserialize, Serialize};
use terrascene_core::plugin_id::PropertySchemaId;

use super::schema::PropertySchema;
use super::value::ValueType;

/// Locates a field inside a schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldPointer {
    /// Schema group id.
    pub group: String,
    /// Field id.
    pub field: String,
}

impl FieldPointer {
    /// Builds a pointer.
    #[must_use]
    pub fn new(group: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            field: field.into(),
        }
    }
}

/// A field that moved to another group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovedField {
    /// Location in the old schema.
    pub from: FieldPointer,
    /// Location in the new schema.
    pub to: FieldPointer,
    /// Whether the destination group is a list.
    pub to_list: bool,
}

/// A field whose declared type changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetypedField {
    /// Location in the new schema.
    pub field: FieldPointer,
    /// The new declared type.
    pub new_type: ValueType,
}

/// Everything a property must undergo to follow a schema upgrade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDiff {
    /// The old schema.
    pub from: PropertySchemaId,
    /// The new schema.
    pub to: PropertySchemaId,
    /// Fields that no longer exist.
    pub deleted: Vec<FieldPointer>,
    /// Fields that changed group.
    pub moved: Vec<MovedField>,
    /// Fields that changed type.
    pub type_changed: Vec<RetypedField>,
}

impl SchemaDiff {
    /// Computes the diff from `old` to `new`.
    #[must_use]
    pub fn between(old: &PropertySchema, new: &PropertySchema) -> Self {
        let mut diff = Self::rename_only(old.id.clone(), new.id.clone());

        for old_group in &old.groups {
            for old_field in &old_group.fields {
                let from = FieldPointer::new(&old_group.id, &old_field.id);
                let Some((new_group, new_field)) = new.find_field(&old_field.id) else {
                    diff.deleted.push(from);
                    continue;
                };
                let to = FieldPointer::new(&new_group.id, &new_field.id);
                if new_group.id != old_group.id || new_group.list != old_group.list {
                    diff.moved.push(MovedField {
                        from,
                        to: to.clone(),
                        to_list: new_group.list,
                    });
                }
                if new_field.value_type != old_field.value_type {
                    diff.type_changed.push(RetypedField {
                        field: to,
                        new_type: new_field.value_type,
                    });
                }
            }
        }

        diff
    }

    /// A diff that only rewrites the schema id.
    #[must_use]
    pub fn rename_only(from: PropertySchemaId, to: PropertySchemaId) -> Self {
        Self {
            from,
            to,
            deleted: Vec::new(),
            moved: Vec::new(),
            type_changed: Vec::new(),
        }
    }

    /// Returns `true` if no field changes are required.
    #[must_use]
    pub fn is_field_change_free(&self) -> bool {
        self.deleted.is_empty() && self.moved.is_empty() && self.type_changed.is_empty()
    }

    /// Returns `true` if nothing at all changes, schema id included.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.from == self.to && self.is_field_change_free()
    }
}
