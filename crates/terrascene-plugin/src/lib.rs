//! Terrascene — plugin manifests.
//!
//! A manifest lists the extensions one plugin version exposes and the
//! configuration schemas they use. Comparing two versions of the same
//! plugin yields a [`domain::diff::ManifestDiff`], the input of the scene
//! migration.

pub mod domain;
pub mod repository;
