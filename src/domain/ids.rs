//! Domain identifier types
//!
//! Source and portable case databases each allocate their own identifiers, so an
//! id is only meaningful relative to the store it came from. Newtypes keep object
//! ids, artifact ids, type ids and tag ids from being mixed up while remapping
//! between the two stores.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $inner:ty, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name($inner);

        impl $name {
            /// Wraps a raw database identifier
            pub const fn new(raw: $inner) -> Self {
                Self(raw)
            }

            /// Returns the raw database identifier
            pub const fn get(self) -> $inner {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim()
                    .parse::<$inner>()
                    .map(Self)
                    .map_err(|e| format!("Invalid {} '{}': {}", $label, s, e))
            }
        }

        impl From<$name> for $inner {
            fn from(id: $name) -> $inner {
                id.0
            }
        }
    };
}

define_id!(
    /// Identifier of a row in `tsk_objects`: images, volumes, file systems,
    /// files and artifacts all share this sequence.
    ObjectId,
    i64,
    "object id"
);

define_id!(
    /// Identifier of a blackboard artifact (distinct from the artifact's object id)
    ArtifactId,
    i64,
    "artifact id"
);

define_id!(
    /// Identifier of an artifact type
    ArtifactTypeId,
    i32,
    "artifact type id"
);

define_id!(
    /// Identifier of an attribute type
    AttributeTypeId,
    i32,
    "attribute type id"
);

define_id!(
    /// Identifier of a tag definition (tag name)
    TagNameId,
    i64,
    "tag name id"
);

define_id!(
    /// Identifier of a content tag or artifact tag assignment
    TagId,
    i64,
    "tag id"
);
