//! Content graph model
//!
//! A case is a tree of content objects: an image contains volume systems,
//! volumes and file systems, which contain directories and files; artifacts hang
//! off the content they were derived from and can themselves be addressed as
//! content. Each node is a [`ContentNode`] whose payload is a closed
//! [`ContentKind`] union, matched exhaustively by the copier.

use super::artifact::ArtifactRecord;
use super::ids::ObjectId;
use serde::{Deserialize, Serialize};

/// Object type codes stored in `tsk_objects.type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectType {
    Image,
    VolumeSystem,
    Volume,
    FileSystem,
    AbstractFile,
    Artifact,
}

impl ObjectType {
    pub fn code(self) -> i64 {
        match self {
            Self::Image => 0,
            Self::VolumeSystem => 1,
            Self::Volume => 2,
            Self::FileSystem => 3,
            Self::AbstractFile => 4,
            Self::Artifact => 5,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Image),
            1 => Some(Self::VolumeSystem),
            2 => Some(Self::Volume),
            3 => Some(Self::FileSystem),
            4 => Some(Self::AbstractFile),
            5 => Some(Self::Artifact),
            _ => None,
        }
    }
}

/// Known-file status of a file or tag definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KnownStatus {
    #[default]
    Unknown,
    Known,
    /// Flagged as notable ("known bad")
    Notable,
}

impl KnownStatus {
    pub fn code(self) -> i64 {
        match self {
            Self::Unknown => 0,
            Self::Known => 1,
            Self::Notable => 2,
        }
    }

    /// Unrecognised codes decode as `Unknown`
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Self::Known,
            2 => Self::Notable,
            _ => Self::Unknown,
        }
    }
}

/// Disk image data source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageInfo {
    pub name: String,
    pub image_type: i64,
    pub sector_size: i64,
    pub size: i64,
    pub paths: Vec<String>,
    pub time_zone: String,
    pub md5: Option<String>,
    pub sha1: Option<String>,
    pub sha256: Option<String>,
    pub device_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeSystemInfo {
    pub vs_type: i64,
    pub offset: i64,
    pub block_size: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeInfo {
    pub addr: i64,
    pub start: i64,
    pub length: i64,
    pub description: String,
    pub flags: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileSystemInfo {
    pub name: String,
    pub image_offset: i64,
    pub fs_type: i64,
    pub block_size: i64,
    pub block_count: i64,
    pub root_inum: i64,
    pub first_inum: i64,
    pub last_inum: i64,
}

/// Virtual data source grouping logically added local files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalFilesDataSourceInfo {
    pub name: String,
    pub device_id: String,
    pub time_zone: String,
}

/// Regular file metadata
///
/// `local_path` is where the bytes can be read from in the store that owns the
/// row; it is rewritten to a case-relative path when the file is copied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileInfo {
    pub name: String,
    pub size: i64,
    pub ctime: i64,
    pub crtime: i64,
    pub atime: i64,
    pub mtime: i64,
    pub md5: Option<String>,
    pub known: KnownStatus,
    pub mime_type: Option<String>,
    pub local_path: Option<String>,
}

impl FileInfo {
    /// File metadata with zeroed timestamps and no hash or MIME type
    pub fn named(name: impl Into<String>, size: i64) -> Self {
        Self {
            name: name.into(),
            size,
            ctime: 0,
            crtime: 0,
            atime: 0,
            mtime: 0,
            md5: None,
            known: KnownStatus::Unknown,
            mime_type: None,
            local_path: None,
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn with_local_path(mut self, path: impl Into<String>) -> Self {
        self.local_path = Some(path.into());
        self
    }
}

/// Variant payload of a content node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ContentKind {
    Image(ImageInfo),
    VolumeSystem(VolumeSystemInfo),
    Volume(VolumeInfo),
    FileSystem(FileSystemInfo),
    LocalFilesDataSource(LocalFilesDataSourceInfo),
    LocalDirectory { name: String },
    LocalFile(FileInfo),
    ArtifactAsContent(Box<ArtifactRecord>),
}

impl ContentKind {
    /// Short label used in logs and error messages
    pub fn label(&self) -> &'static str {
        match self {
            Self::Image(_) => "image",
            Self::VolumeSystem(_) => "volume system",
            Self::Volume(_) => "volume",
            Self::FileSystem(_) => "file system",
            Self::LocalFilesDataSource(_) => "local files data source",
            Self::LocalDirectory { .. } => "local directory",
            Self::LocalFile(_) => "local file",
            Self::ArtifactAsContent(_) => "artifact",
        }
    }
}

/// A forensic object in a case store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentNode {
    pub id: ObjectId,
    pub parent: Option<ObjectId>,
    pub kind: ContentKind,
}

impl ContentNode {
    pub fn new(id: ObjectId, parent: Option<ObjectId>, kind: ContentKind) -> Self {
        Self { id, parent, kind }
    }

    /// Display name, or a synthesized one for unnamed variants
    pub fn name(&self) -> String {
        match &self.kind {
            ContentKind::Image(info) => info.name.clone(),
            ContentKind::FileSystem(info) => info.name.clone(),
            ContentKind::LocalFilesDataSource(info) => info.name.clone(),
            ContentKind::LocalDirectory { name } => name.clone(),
            ContentKind::LocalFile(info) => info.name.clone(),
            ContentKind::Volume(info) => format!("vol{}", info.addr),
            ContentKind::VolumeSystem(_) => format!("vs{}", self.id),
            ContentKind::ArtifactAsContent(artifact) => artifact.artifact_type.type_name.clone(),
        }
    }
}

/// Nodes that may hang off another node in the content tree
pub trait HasParent {
    fn parent_id(&self) -> Option<ObjectId>;

    fn is_root(&self) -> bool {
        self.parent_id().is_none()
    }
}

impl HasParent for ContentNode {
    fn parent_id(&self) -> Option<ObjectId> {
        self.parent
    }
}

/// Nodes that carry bytes which must be duplicated on export
pub trait IsPhysicalFile {
    fn file_info(&self) -> Option<&FileInfo>;

    fn is_physical_file(&self) -> bool {
        self.file_info().is_some()
    }
}

impl IsPhysicalFile for ContentNode {
    fn file_info(&self) -> Option<&FileInfo> {
        match &self.kind {
            ContentKind::LocalFile(info) => Some(info),
            _ => None,
        }
    }
}
