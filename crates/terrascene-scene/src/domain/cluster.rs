//! Named marker-clustering configurations.

use serde::{Deserialize, Serialize};
use terrascene_core::error::DomainError;
use terrascene_core::id::{ClusterId, PropertyId};

/// One clustering configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    id: ClusterId,
    name: String,
    property: PropertyId,
}

impl Cluster {
    /// Builds a cluster.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if `name` is blank.
    pub fn new(
        id: ClusterId,
        name: impl Into<String>,
        property: PropertyId,
    ) -> Result<Self, DomainError> {
        let name = name.into();
        validate_name(&name)?;
        Ok(Self { id, name, property })
    }

    /// Cluster identifier.
    #[must_use]
    pub fn id(&self) -> ClusterId {
        self.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cluster configuration.
    #[must_use]
    pub fn property(&self) -> PropertyId {
        self.property
    }

    /// Renames the cluster.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if `name` is blank.
    pub fn rename(&mut self, name: impl Into<String>) -> Result<(), DomainError> {
        let name = name.into();
        validate_name(&name)?;
        self.name = name;
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<(), DomainError> {
    if name.trim().is_empty() {
        return Err(DomainError::Validation(
            "cluster name must not be empty".to_owned(),
        ));
    }
    Ok(())
}

/// The clusters of one scene, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterRegistry {
    clusters: Vec<Cluster>,
}

impl ClusterRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if `id` exists.
    #[must_use]
    pub fn has(&self, id: ClusterId) -> bool {
        self.clusters.iter().any(|c| c.id == id)
    }

    /// Looks up a cluster.
    #[must_use]
    pub fn get(&self, id: ClusterId) -> Option<&Cluster> {
        self.clusters.iter().find(|c| c.id == id)
    }

    /// Adds a cluster. Ignored if one with the same id exists.
    pub fn add(&mut self, cluster: Cluster) {
        if !self.has(cluster.id) {
            self.clusters.push(cluster);
        }
    }

    /// Removes every listed cluster and returns their configuration
    /// references.
    pub fn remove(&mut self, ids: &[ClusterId]) -> Vec<PropertyId> {
        let mut removed = Vec::new();
        self.clusters.retain(|c| {
            if ids.contains(&c.id) {
                removed.push(c.property);
                false
            } else {
                true
            }
        });
        removed
    }

    /// Renames a cluster.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ClusterNotFound` if `id` does not exist and
    /// `DomainError::Validation` if `name` is blank.
    pub fn rename(&mut self, id: ClusterId, name: impl Into<String>) -> Result<(), DomainError> {
        self.clusters
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(DomainError::ClusterNotFound(id))?
            .rename(name)
    }

    /// Every cluster, copied.
    #[must_use]
    pub fn all(&self) -> Vec<Cluster> {
        self.clusters.clone()
    }

    /// Every configuration reference.
    #[must_use]
    pub fn properties(&self) -> Vec<PropertyId> {
        self.clusters.iter().map(Cluster::property).collect()
    }
}
