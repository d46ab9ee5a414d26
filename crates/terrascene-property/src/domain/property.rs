//! The configuration instance aggregate.

use serde::{Deserialize, Serialize};
use terrascene_core::error::DomainError;
use terrascene_core::id::{PropertyId, SceneId};
use terrascene_core::plugin_id::PropertySchemaId;

use super::diff::{FieldPointer, SchemaDiff};
use super::value::{Value, ValueType};

/// A field holding a value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyField {
    /// Schema field id.
    pub field: String,
    /// The stored value.
    pub value: Value,
}

impl PropertyField {
    /// Builds a field.
    #[must_use]
    pub fn new(field: impl Into<String>, value: Value) -> Self {
        Self {
            field: field.into(),
            value,
        }
    }

    /// The type of the stored value.
    #[must_use]
    pub fn value_type(&self) -> ValueType {
        self.value.value_type()
    }
}

/// Values of one schema group.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PropertyGroup {
    /// Schema group id.
    pub schema_group: String,
    /// Fields that have values.
    pub fields: Vec<PropertyField>,
}

impl PropertyGroup {
    /// An empty group for `schema_group`.
    #[must_use]
    pub fn new(schema_group: impl Into<String>) -> Self {
        Self {
            schema_group: schema_group.into(),
            fields: Vec::new(),
        }
    }

    fn field(&self, field: &str) -> Option<&PropertyField> {
        self.fields.iter().find(|f| f.field == field)
    }

    fn field_mut(&mut self, field: &str) -> Option<&mut PropertyField> {
        self.fields.iter_mut().find(|f| f.field == field)
    }

    fn take(&mut self, field: &str) -> Option<PropertyField> {
        let index = self.fields.iter().position(|f| f.field == field)?;
        Some(self.fields.remove(index))
    }

    fn put(&mut self, new: PropertyField) {
        match self.field_mut(&new.field) {
            Some(existing) => *existing = new,
            None => self.fields.push(new),
        }
    }

    fn retype(&mut self, field: &str, to: ValueType) -> bool {
        let Some(index) = self.fields.iter().position(|f| f.field == field) else {
            return false;
        };
        match self.fields[index].value.cast(to) {
            Some(v) if v == self.fields[index].value => false,
            Some(v) => {
                self.fields[index].value = v;
                true
            }
            None => {
                self.fields.remove(index);
                true
            }
        }
    }
}

/// Repeated entries of a list schema group.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PropertyGroupList {
    /// Schema group id.
    pub schema_group: String,
    /// Entries in display order.
    pub groups: Vec<PropertyGroup>,
}

/// A top-level item of a property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PropertyItem {
    /// A single group.
    Group(PropertyGroup),
    /// A repeatable group.
    GroupList(PropertyGroupList),
}

impl PropertyItem {
    /// The schema group this item instantiates.
    #[must_use]
    pub fn schema_group(&self) -> &str {
        match self {
            Self::Group(g) => &g.schema_group,
            Self::GroupList(l) => &l.schema_group,
        }
    }

    fn groups_mut(&mut self) -> Vec<&mut PropertyGroup> {
        match self {
            Self::Group(g) => vec![g],
            Self::GroupList(l) => l.groups.iter_mut().collect(),
        }
    }
}

/// A schema-typed bag of values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    id: PropertyId,
    scene: SceneId,
    schema: PropertySchemaId,
    items: Vec<PropertyItem>,
}

impl Property {
    /// Creates an empty property under `schema`.
    #[must_use]
    pub fn new(id: PropertyId, scene: SceneId, schema: PropertySchemaId) -> Self {
        Self {
            id,
            scene,
            schema,
            items: Vec::new(),
        }
    }

    /// Property identifier.
    #[must_use]
    pub fn id(&self) -> PropertyId {
        self.id
    }

    /// Owning scene.
    #[must_use]
    pub fn scene(&self) -> SceneId {
        self.scene
    }

    /// Schema this property follows.
    #[must_use]
    pub fn schema(&self) -> &PropertySchemaId {
        &self.schema
    }

    /// Top-level items.
    #[must_use]
    pub fn items(&self) -> &[PropertyItem] {
        &self.items
    }

    /// Points this property at another schema without touching values.
    pub fn set_schema(&mut self, schema: PropertySchemaId) {
        self.schema = schema;
    }

    /// Reads a value from a non-list group.
    #[must_use]
    pub fn value(&self, group: &str, field: &str) -> Option<&Value> {
        self.items.iter().find_map(|item| match item {
            PropertyItem::Group(g) if g.schema_group == group => g.field(field).map(|f| &f.value),
            _ => None,
        })
    }

    /// Writes a value into a non-list group, creating the group if needed.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if `group` is a list group.
    pub fn set_value(&mut self, group: &str, field: &str, value: Value) -> Result<(), DomainError> {
        if matches!(self.item(group), Some(PropertyItem::GroupList(_))) {
            return Err(DomainError::Validation(format!(
                "group '{group}' of property {} is a list",
                self.id
            )));
        }
        self.put_field(group, PropertyField::new(field, value));
        Ok(())
    }

    /// Appends an entry to a list group, creating the list if needed.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if `group` is not a list group.
    pub fn add_list_entry(
        &mut self,
        group: &str,
        fields: Vec<PropertyField>,
    ) -> Result<(), DomainError> {
        if self.item(group).is_none() {
            self.items.push(PropertyItem::GroupList(PropertyGroupList {
                schema_group: group.to_owned(),
                groups: Vec::new(),
            }));
        }
        match self.items.iter_mut().find(|i| i.schema_group() == group) {
            Some(PropertyItem::GroupList(list)) => {
                list.groups.push(PropertyGroup {
                    schema_group: group.to_owned(),
                    fields,
                });
                Ok(())
            }
            _ => Err(DomainError::Validation(format!(
                "group '{group}' of property {} is not a list",
                self.id
            ))),
        }
    }

    /// Removes a field wherever its group appears. Returns whether anything
    /// was removed.
    pub fn remove_field(&mut self, pointer: &FieldPointer) -> bool {
        let mut removed = false;
        for item in self.items.iter_mut().filter(|i| i.schema_group() == pointer.group) {
            for group in item.groups_mut() {
                removed |= group.take(&pointer.field).is_some();
            }
        }
        removed
    }

    /// Applies a schema diff. Properties not following `diff.from` are left
    /// untouched. Returns whether the property changed.
    pub fn migrate(&mut self, diff: &SchemaDiff) -> bool {
        if self.schema != diff.from {
            return false;
        }
        let mut changed = diff.from != diff.to;
        self.schema = diff.to.clone();
        if diff.is_field_change_free() {
            return changed;
        }

        for pointer in &diff.deleted {
            changed |= self.remove_field(pointer);
        }

        for moved in &diff.moved {
            let taken = match self.item_mut(&moved.from.group) {
                Some(PropertyItem::Group(g)) => g.take(&moved.from.field),
                Some(PropertyItem::GroupList(list)) => {
                    // List entries cannot be folded into one group.
                    for g in &mut list.groups {
                        changed |= g.take(&moved.from.field).is_some();
                    }
                    None
                }
                None => None,
            };
            let Some(mut field) = taken else { continue };
            changed = true;
            if moved.to_list {
                continue;
            }
            field.field.clone_from(&moved.to.field);
            self.put_field(&moved.to.group, field);
        }

        for retyped in &diff.type_changed {
            if let Some(item) = self.item_mut(&retyped.field.group) {
                for g in item.groups_mut() {
                    changed |= g.retype(&retyped.field.field, retyped.new_type);
                }
            }
        }

        self.items.retain(|item| match item {
            PropertyItem::Group(g) => !g.fields.is_empty(),
            PropertyItem::GroupList(_) => true,
        });

        changed
    }

    fn item(&self, group: &str) -> Option<&PropertyItem> {
        self.items.iter().find(|i| i.schema_group() == group)
    }

    fn item_mut(&mut self, group: &str) -> Option<&mut PropertyItem> {
        self.items.iter_mut().find(|i| i.schema_group() == group)
    }

    fn put_field(&mut self, group: &str, field: PropertyField) {
        for item in &mut self.items {
            if let PropertyItem::Group(g) = item {
                if g.schema_group == group {
                    g.put(field);
                    return;
                }
            }
        }
        let mut created = PropertyGroup::new(group);
        created.put(field);
        self.items.push(PropertyItem::Group(created));
    }
}
