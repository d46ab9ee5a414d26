//! Use cases over the scene aggregate.

pub mod command_handlers;
pub mod plugin_migrator;
pub mod query_handlers;
pub mod scene_lock;
pub mod services;
