//! The acting user and their workspace permissions.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::id::WorkspaceId;

/// The identity on whose behalf a use case runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Operator {
    /// Workspaces the operator may modify.
    pub writable_workspaces: Vec<WorkspaceId>,
    /// Workspaces the operator may only read.
    pub readable_workspaces: Vec<WorkspaceId>,
}

impl Operator {
    /// An operator with write access to the given workspaces.
    #[must_use]
    pub fn writer(workspaces: impl IntoIterator<Item = WorkspaceId>) -> Self {
        Self {
            writable_workspaces: workspaces.into_iter().collect(),
            readable_workspaces: Vec::new(),
        }
    }

    /// Returns `true` if the operator can modify `workspace`.
    #[must_use]
    pub fn can_write(&self, workspace: WorkspaceId) -> bool {
        self.writable_workspaces.contains(&workspace)
    }

    /// Returns `true` if the operator can read `workspace`.
    #[must_use]
    pub fn can_read(&self, workspace: WorkspaceId) -> bool {
        self.can_write(workspace) || self.readable_workspaces.contains(&workspace)
    }

    /// Fails unless the operator can modify `workspace`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::OperationDenied` if write access is missing.
    pub fn ensure_writable(&self, workspace: WorkspaceId) -> Result<(), DomainError> {
        if self.can_write(workspace) {
            Ok(())
        } else {
            Err(DomainError::OperationDenied)
        }
    }

    /// Fails unless the operator can read `workspace`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::OperationDenied` if read access is missing.
    pub fn ensure_readable(&self, workspace: WorkspaceId) -> Result<(), DomainError> {
        if self.can_read(workspace) {
            Ok(())
        } else {
            Err(DomainError::OperationDenied)
        }
    }
}
