//! Typed aggregate identifiers.
//!
//! Each identifier is a transparent newtype over a UUID so that a scene id
//! can never be passed where a layer id is expected.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generates a fresh random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Returns the nil (empty) identifier.
            #[must_use]
            pub const fn nil() -> Self {
                Self(Uuid::nil())
            }

            /// Wraps an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the underlying UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> Uuid {
                self.0
            }

            /// Returns `true` if this is the nil identifier.
            #[must_use]
            pub fn is_nil(&self) -> bool {
                self.0.is_nil()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s)
                    .map(Self)
                    .map_err(|e| DomainError::MalformedId(format!("invalid {} '{s}': {e}", $label)))
            }
        }
    };
}

define_id!(
    /// Identifies a scene.
    SceneId,
    "scene id"
);
define_id!(
    /// Identifies the workspace (team) owning a scene.
    WorkspaceId,
    "workspace id"
);
define_id!(
    /// Identifies the project a scene belongs to.
    ProjectId,
    "project id"
);
define_id!(
    /// Identifies a layer item or layer group.
    LayerId,
    "layer id"
);
define_id!(
    /// Identifies a configuration instance (property).
    PropertyId,
    "property id"
);
define_id!(
    /// Identifies a widget instance.
    WidgetId,
    "widget id"
);
define_id!(
    /// Identifies a marker-cluster configuration.
    ClusterId,
    "cluster id"
);
define_id!(
    /// Identifies a block field inside a layer info-box.
    InfoboxFieldId,
    "infobox field id"
);
