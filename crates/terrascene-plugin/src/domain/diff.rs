//! Structural differences between two versions of one plugin.

use serde::{Deserialize, Serialize};
use terrascene_core::plugin_id::{ExtensionId, PluginId, PropertySchemaId};
use terrascene_property::domain::diff::SchemaDiff;

use super::manifest::Manifest;

/// An extension that the new version no longer provides (or provides with
/// a different type).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedExtension {
    /// The removed extension.
    pub extension: ExtensionId,
    /// Its schema in the old version.
    pub schema: PropertySchemaId,
}

/// What must change in a scene when `from` is replaced by `to`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestDiff {
    /// The installed plugin.
    pub from: PluginId,
    /// The upgrade target.
    pub to: PluginId,
    /// Plugin-level schema of the old version.
    pub from_schema: Option<PropertySchemaId>,
    /// Plugin-level schema of the new version.
    pub to_schema: Option<PropertySchemaId>,
    /// The plugin-level schema exists in the old version only.
    pub schema_deleted: bool,
    /// Extensions that disappeared.
    pub deleted_extensions: Vec<DeletedExtension>,
    /// Field migrations for every schema present in both versions.
    pub schema_diffs: Vec<SchemaDiff>,
}

impl ManifestDiff {
    /// Compares two manifests of the same plugin.
    #[must_use]
    pub fn between(old: &Manifest, new: &Manifest) -> Self {
        let mut schema_diffs = Vec::new();
        if let (Some(old_schema), Some(new_schema)) = (&old.schema, &new.schema) {
            schema_diffs.push(SchemaDiff::between(old_schema, new_schema));
        }

        let mut deleted_extensions = Vec::new();
        for old_ext in &old.extensions {
            match new.extension(&old_ext.id) {
                Some(new_ext) if new_ext.extension_type == old_ext.extension_type => {
                    schema_diffs.push(SchemaDiff::between(&old_ext.schema, &new_ext.schema));
                }
                _ => deleted_extensions.push(DeletedExtension {
                    extension: old_ext.id.clone(),
                    schema: old_ext.schema.id.clone(),
                }),
            }
        }

        schema_diffs.retain(|d| !d.is_empty());

        Self {
            from: old.id.clone(),
            to: new.id.clone(),
            from_schema: old.schema.as_ref().map(|s| s.id.clone()),
            to_schema: new.schema.as_ref().map(|s| s.id.clone()),
            schema_deleted: old.schema.is_some() && new.schema.is_none(),
            deleted_extensions,
            schema_diffs,
        }
    }

    /// Returns `true` if `extension` was removed.
    #[must_use]
    pub fn is_extension_deleted(&self, extension: &ExtensionId) -> bool {
        self.deleted_extensions
            .iter()
            .any(|d| &d.extension == extension)
    }

    /// The old-version schemas whose properties must be migrated.
    #[must_use]
    pub fn migrated_schemas(&self) -> Vec<PropertySchemaId> {
        self.schema_diffs.iter().map(|d| d.from.clone()).collect()
    }

    /// The migration for properties following `schema`.
    #[must_use]
    pub fn schema_diff_for(&self, schema: &PropertySchemaId) -> Option<&SchemaDiff> {
        self.schema_diffs.iter().find(|d| &d.from == schema)
    }

    /// Schemas left without any owner once the upgrade completes.
    #[must_use]
    pub fn deleted_schemas(&self) -> Vec<PropertySchemaId> {
        let mut schemas: Vec<PropertySchemaId> = self
            .deleted_extensions
            .iter()
            .map(|d| d.schema.clone())
            .collect();
        if self.schema_deleted {
            schemas.extend(self.from_schema.iter().cloned());
        }
        schemas
    }
}
