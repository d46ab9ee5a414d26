//! The scene lock token.
//!
//! `free` and `pending` never block other edits. The remaining modes are
//! mutually exclusive: a scene in one of them rejects every other lock
//! transition until it is released back to `free`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use terrascene_core::error::DomainError;

/// The exclusive-state token serializing long-running scene mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LockMode {
    /// Nothing in progress. Also the meaning of "no stored value".
    #[default]
    Free,
    /// A short, non-blocking edit is in progress.
    Pending,
    /// A plugin upgrade is migrating scene data.
    PluginUpgrading,
    /// A dataset is being synchronized.
    DatasetSyncing,
    /// The scene is being published.
    Publishing,
}

impl LockMode {
    /// Every mode.
    pub const ALL: [Self; 5] = [
        Self::Free,
        Self::Pending,
        Self::PluginUpgrading,
        Self::DatasetSyncing,
        Self::Publishing,
    ];

    /// Returns `true` for the exclusive modes.
    #[must_use]
    pub fn is_locked(self) -> bool {
        !matches!(self, Self::Free | Self::Pending)
    }

    /// The stored text form.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Pending => "pending",
            Self::PluginUpgrading => "plugin-upgrading",
            Self::DatasetSyncing => "dataset-syncing",
            Self::Publishing => "publishing",
        }
    }
}

impl fmt::Display for LockMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LockMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // An empty stored value is the same as no value.
        if s.is_empty() {
            return Ok(Self::Free);
        }
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| DomainError::Validation(format!("unknown lock mode '{s}'")))
    }
}
