//! Terrascene — storage.
//!
//! An in-memory implementation of every repository, with snapshot
//! transactions, for embedding and tests; and a PostgreSQL lock store whose
//! compare-and-swap is a single atomic statement.

pub mod config;
pub mod memory;
pub mod pg_lock_repository;
pub mod telemetry;
