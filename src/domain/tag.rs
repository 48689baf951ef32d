//! Tag definitions and tag assignments

use super::content::KnownStatus;
use super::ids::{ArtifactId, ObjectId, TagId, TagNameId};
use serde::{Deserialize, Serialize};

/// A user-defined label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagDefinition {
    pub id: TagNameId,
    /// Unique display name
    pub display_name: String,
    pub description: String,
    pub color: String,
    pub known_status: KnownStatus,
}

impl TagDefinition {
    pub fn is_notable(&self) -> bool {
        self.known_status == KnownStatus::Notable
    }
}

/// Inclusive-exclusive byte offsets into a file's content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByteRange {
    pub begin: i64,
    pub end: i64,
}

/// A tag definition applied to a content node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentTag {
    pub id: TagId,
    pub tag_name: TagNameId,
    pub content_id: ObjectId,
    pub comment: String,
    pub byte_range: Option<ByteRange>,
}

/// A tag definition applied to an artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactTag {
    pub id: TagId,
    pub tag_name: TagNameId,
    pub artifact_id: ArtifactId,
    /// Content the tagged artifact is attached to
    pub content_id: ObjectId,
    pub comment: String,
}
