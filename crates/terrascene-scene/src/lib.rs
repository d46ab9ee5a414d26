//! Terrascene — Scene bounded context.
//!
//! Owns the live, editable state of a scene: installed plugins, placed
//! widgets, widget layout, and cluster styles. The application layer wraps
//! every multi-store mutation in a transaction and serializes long-running
//! edits through the scene lock.

pub mod application;
pub mod domain;
pub mod repository;
