//! Terrascene — configuration instances ("properties") and their schemas.
//!
//! A property is a schema-typed bag of values bound to a plugin, a layer,
//! or a widget. When a plugin upgrade reshapes a schema, [`domain::diff`]
//! computes the field-level changes and [`domain::property::Property::migrate`]
//! applies them.

pub mod domain;
pub mod repository;
