//! Shared test fixtures and utilities for the Terrascene engine.

mod clock;
mod fixtures;
mod logging;

pub use clock::FixedClock;
pub use fixtures::{plugin_id, reader_of, writer_of};
pub use logging::init_tracing;
