//! Domain types for configuration instances.

pub mod diff;
pub mod property;
pub mod schema;
pub mod value;
