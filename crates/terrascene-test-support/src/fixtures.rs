//! Identity and identifier fixtures.

use terrascene_core::id::WorkspaceId;
use terrascene_core::operator::Operator;
use terrascene_core::plugin_id::PluginId;

/// An operator with write access to `workspace` only.
#[must_use]
pub fn writer_of(workspace: WorkspaceId) -> Operator {
    Operator::writer([workspace])
}

/// An operator with read-only access to `workspace`.
#[must_use]
pub fn reader_of(workspace: WorkspaceId) -> Operator {
    Operator {
        writable_workspaces: Vec::new(),
        readable_workspaces: vec![workspace],
    }
}

/// Parses a plugin id.
///
/// # Panics
///
/// Panics if `raw` is not a valid plugin id.
#[must_use]
pub fn plugin_id(raw: &str) -> PluginId {
    raw.parse()
        .unwrap_or_else(|e| panic!("invalid plugin id fixture '{raw}': {e}"))
}
