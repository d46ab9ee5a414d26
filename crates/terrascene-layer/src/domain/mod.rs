//! Domain types for layers.

pub mod infobox;
pub mod layer;
