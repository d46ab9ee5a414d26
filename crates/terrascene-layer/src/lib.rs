//! Terrascene — layers.
//!
//! Layers are the map content of a scene. Each one may be rendered by a
//! plugin extension and may carry an info-box whose block fields are bound
//! to other extensions.

pub mod domain;
pub mod repository;
