//! Repository traits for properties and property schemas.

use async_trait::async_trait;
use terrascene_core::error::DomainError;
use terrascene_core::id::{PropertyId, SceneId};
use terrascene_core::plugin_id::{PluginId, PropertySchemaId};

use crate::domain::property::Property;
use crate::domain::schema::PropertySchema;

/// Stores configuration instances.
#[async_trait]
pub trait PropertyRepository: Send + Sync {
    /// Loads one property.
    async fn find_property(&self, id: PropertyId) -> Result<Option<Property>, DomainError>;

    /// Loads every property among `ids` that exists.
    async fn find_properties(&self, ids: &[PropertyId]) -> Result<Vec<Property>, DomainError>;

    /// Loads the properties of `scene` that follow any of `schemas`.
    async fn find_properties_by_schemas(
        &self,
        scene: SceneId,
        schemas: &[PropertySchemaId],
    ) -> Result<Vec<Property>, DomainError>;

    /// Inserts or replaces one property.
    async fn save_property(&self, property: &Property) -> Result<(), DomainError>;

    /// Inserts or replaces many properties.
    async fn save_properties(&self, properties: &[Property]) -> Result<(), DomainError>;

    /// Deletes one property. Missing ids are ignored.
    async fn remove_property(&self, id: PropertyId) -> Result<(), DomainError>;

    /// Deletes many properties. Missing ids are ignored.
    async fn remove_properties(&self, ids: &[PropertyId]) -> Result<(), DomainError>;

    /// Rewrites the plugin part of the schema id of every property in `scene`
    /// whose schema belongs to `old`.
    async fn update_schema_plugin(
        &self,
        scene: SceneId,
        old: &PluginId,
        new: &PluginId,
    ) -> Result<(), DomainError>;
}

/// Stores configuration schemas.
#[async_trait]
pub trait PropertySchemaRepository: Send + Sync {
    /// Loads every schema among `ids` that exists.
    async fn find_schemas(
        &self,
        ids: &[PropertySchemaId],
    ) -> Result<Vec<PropertySchema>, DomainError>;

    /// Inserts or replaces many schemas.
    async fn save_schemas(&self, schemas: &[PropertySchema]) -> Result<(), DomainError>;

    /// Deletes many schemas. Missing ids are ignored.
    async fn remove_schemas(&self, ids: &[PropertySchemaId]) -> Result<(), DomainError>;
}
