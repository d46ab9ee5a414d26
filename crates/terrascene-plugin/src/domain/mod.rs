//! Domain types for plugins.

pub mod diff;
pub mod manifest;
