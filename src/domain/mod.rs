//! Domain models and types
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`ObjectId`], [`ArtifactId`], [`TagNameId`], ...)
//! - **The content graph model** ([`ContentNode`], [`ContentKind`])
//! - **Artifacts and attributes** ([`ArtifactRecord`], [`AttributeRecord`])
//! - **Tags** ([`TagDefinition`], [`ContentTag`], [`ArtifactTag`])
//! - **Error types** ([`PortableCaseError`], [`StoreError`]) and the [`Result`] alias
//!
//! Identifiers are scoped to the store they were read from. Newtypes keep a
//! source object id from being handed to the portable case as if it were one
//! of its own.

pub mod artifact;
pub mod builtin;
pub mod chunk;
pub mod content;
pub mod context;
pub mod errors;
pub mod ids;
pub mod result;
pub mod tag;

pub use artifact::{
    ArtifactRecord, ArtifactType, AttributeRecord, AttributeType, AttributeValue,
    AttributeValueType,
};
pub use chunk::ChunkSize;
pub use content::{
    ContentKind, ContentNode, FileInfo, FileSystemInfo, HasParent, ImageInfo, IsPhysicalFile,
    KnownStatus, LocalFilesDataSourceInfo, ObjectType, VolumeInfo, VolumeSystemInfo,
};
pub use errors::{PortableCaseError, StoreError};
pub use ids::{ArtifactId, ArtifactTypeId, AttributeTypeId, ObjectId, TagId, TagNameId};
pub use result::Result;
pub use tag::{ArtifactTag, ByteRange, ContentTag, TagDefinition};
