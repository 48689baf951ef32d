//! Case store abstraction traits
//!
//! The export engine reads from a [`SourceCase`] and writes into a
//! [`PortableCaseStore`]. Both are synchronous: all store access happens on
//! the single blocking task that runs the graph copy.

use crate::domain::{
    ArtifactId, ArtifactRecord, ArtifactTag, ArtifactType, ArtifactTypeId, AttributeRecord,
    AttributeType, AttributeValueType, ByteRange, ContentNode, ContentTag, FileInfo,
    FileSystemInfo, ImageInfo, LocalFilesDataSourceInfo, ObjectId, Result, TagDefinition, TagId,
    TagNameId, VolumeInfo, VolumeSystemInfo,
};
use std::collections::BTreeMap;
use std::io::Read;

/// Identifier sequences whose high-water marks are recorded in the baseline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdSequence {
    Objects,
    ContentTags,
    ArtifactTags,
    Examiners,
}

impl IdSequence {
    pub const ALL: [IdSequence; 4] = [
        IdSequence::Objects,
        IdSequence::ContentTags,
        IdSequence::ArtifactTags,
        IdSequence::Examiners,
    ];

    /// Table holding the sequence
    pub fn table(self) -> &'static str {
        match self {
            Self::Objects => "tsk_objects",
            Self::ContentTags => "content_tags",
            Self::ArtifactTags => "blackboard_artifact_tags",
            Self::Examiners => "tsk_examiners",
        }
    }

    /// Identifier column of [`IdSequence::table`]
    pub fn column(self) -> &'static str {
        match self {
            Self::Objects => "obj_id",
            Self::ContentTags | Self::ArtifactTags => "tag_id",
            Self::Examiners => "examiner_id",
        }
    }
}

/// Auxiliary two-column table in a case database
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyValueTable {
    pub name: &'static str,
    pub key_column: &'static str,
    pub value_column: &'static str,
}

/// Read-only query surface of a case
pub trait SourceCase: Send + Sync {
    /// Human readable case name
    fn display_name(&self) -> Result<String>;

    /// Artifact types with at least one artifact in the case
    fn artifact_types_in_use(&self) -> Result<Vec<ArtifactType>>;

    /// Loads a content node
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no object has this id.
    fn content(&self, id: ObjectId) -> Result<ContentNode>;

    /// Loads the parent of a content node, `None` for a root
    fn parent(&self, id: ObjectId) -> Result<Option<ContentNode>>;

    /// All artifacts of a type, attributes included
    fn artifacts_by_type(&self, type_name: &str) -> Result<Vec<ArtifactRecord>>;

    /// Loads one artifact, attributes included
    fn artifact(&self, id: ArtifactId) -> Result<ArtifactRecord>;

    /// Attributes of an artifact in insertion order
    fn attributes(&self, artifact_id: ArtifactId) -> Result<Vec<AttributeRecord>>;

    /// Tag definitions referenced by at least one tag assignment
    fn tag_names_in_use(&self) -> Result<Vec<TagDefinition>>;

    fn content_tags_by_tag_name(&self, tag_name: TagNameId) -> Result<Vec<ContentTag>>;

    fn artifact_tags_by_tag_name(&self, tag_name: TagNameId) -> Result<Vec<ArtifactTag>>;

    /// Distinct interesting-item set names with the number of hits in each
    fn interesting_item_set_counts(&self) -> Result<BTreeMap<String, u64>>;

    /// Highest identifier allocated in a sequence, `None` if it is empty
    fn max_id(&self, sequence: IdSequence) -> Result<Option<i64>>;

    /// Opens the bytes of a regular file
    fn open_file(&self, id: ObjectId) -> Result<Box<dyn Read + Send>>;

    /// Content-viewer image tag data attached to a content tag
    fn image_tag_data(&self, tag: TagId) -> Result<Option<String>>;

    /// Rows of an auxiliary key/value table, ordered by key; empty if the
    /// table does not exist
    fn key_value_rows(&self, table: &KeyValueTable) -> Result<Vec<(String, String)>>;
}

/// Mutation surface of a portable case under construction
///
/// Row creation methods take already-remapped destination ids; none of them
/// look at source identifiers.
pub trait PortableCaseStore: Send + Sync {
    fn add_image(&self, image: &ImageInfo) -> Result<ObjectId>;

    fn add_volume_system(&self, parent: ObjectId, info: &VolumeSystemInfo) -> Result<ObjectId>;

    fn add_volume(&self, parent: ObjectId, info: &VolumeInfo) -> Result<ObjectId>;

    fn add_file_system(&self, parent: ObjectId, info: &FileSystemInfo) -> Result<ObjectId>;

    fn add_local_files_data_source(&self, info: &LocalFilesDataSourceInfo) -> Result<ObjectId>;

    fn add_local_directory(&self, parent: ObjectId, name: &str) -> Result<ObjectId>;

    /// Adds a file whose bytes live at `relative_path` under the case folder
    fn add_local_file(
        &self,
        parent: ObjectId,
        info: &FileInfo,
        relative_path: &str,
    ) -> Result<ObjectId>;

    fn artifact_type_by_name(&self, type_name: &str) -> Result<Option<ArtifactType>>;

    fn add_artifact_type(&self, type_name: &str, display_name: &str) -> Result<ArtifactType>;

    fn attribute_type_by_name(&self, type_name: &str) -> Result<Option<AttributeType>>;

    fn add_attribute_type(
        &self,
        type_name: &str,
        display_name: &str,
        value_type: AttributeValueType,
    ) -> Result<AttributeType>;

    /// Creates an artifact on `source` and writes all attributes in one batch
    fn add_artifact(
        &self,
        artifact_type: ArtifactTypeId,
        source: ObjectId,
        attributes: &[AttributeRecord],
    ) -> Result<ArtifactRecord>;

    /// Adds a tag definition, or updates the existing one with the same
    /// display name, and returns the stored row
    fn add_or_update_tag_name(&self, tag: &TagDefinition) -> Result<TagDefinition>;

    fn add_content_tag(
        &self,
        content: ObjectId,
        tag_name: TagNameId,
        comment: &str,
        byte_range: Option<ByteRange>,
    ) -> Result<TagId>;

    fn add_artifact_tag(
        &self,
        artifact: ArtifactId,
        tag_name: TagNameId,
        comment: &str,
    ) -> Result<TagId>;

    /// Creates the content-viewer image tag table if it does not exist
    fn ensure_image_tag_table(&self) -> Result<()>;

    fn add_image_tag(&self, tag: TagId, app_data: &str) -> Result<()>;

    fn create_key_value_table(&self, table: &KeyValueTable) -> Result<()>;

    fn put_key_value(&self, table: &KeyValueTable, key: &str, value: &str) -> Result<()>;

    /// Starts a transaction; transactions do not nest
    ///
    /// # Errors
    ///
    /// Returns `StoreError::TransactionFailed` if one is already open.
    fn begin_transaction(&self) -> Result<()>;

    fn commit_transaction(&self) -> Result<()>;

    fn rollback_transaction(&self) -> Result<()>;

    /// Releases the underlying handle; later calls fail with `StoreError::Closed`
    ///
    /// Closing twice is not an error.
    fn close(&self) -> Result<()>;
}

/// Scoped transaction on a [`PortableCaseStore`]
///
/// Rolls back on drop unless [`TransactionGuard::commit`] succeeded, so every
/// early return and `?` between `begin` and `commit` leaves nothing behind.
pub struct TransactionGuard<'a> {
    store: &'a dyn PortableCaseStore,
    finished: bool,
}

impl<'a> TransactionGuard<'a> {
    pub fn begin(store: &'a dyn PortableCaseStore) -> Result<Self> {
        store.begin_transaction()?;
        Ok(Self {
            store,
            finished: false,
        })
    }

    pub fn commit(mut self) -> Result<()> {
        self.store.commit_transaction()?;
        self.finished = true;
        Ok(())
    }
}

impl Drop for TransactionGuard<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        if let Err(e) = self.store.rollback_transaction() {
            tracing::warn!(error = %e, "Failed to roll back transaction");
        }
    }
}
