//! Archive packaging
//!
//! The finished portable case folder is handed to an [`Archiver`], which turns
//! it into a (possibly multi-volume) zip archive. [`SevenZipArchiver`] drives
//! an external 7-Zip executable; tests substitute their own implementations.

mod sevenzip;

pub use sevenzip::SevenZipArchiver;

use crate::domain::{ChunkSize, Result};
use async_trait::async_trait;
use std::path::Path;

/// Compresses a directory into an archive file
///
/// Cancellation is expressed by dropping the returned future; implementations
/// must not leave background work running after that.
#[async_trait]
pub trait Archiver: Send + Sync {
    /// Compresses `source_dir` into `dest_file`, splitting into volumes of
    /// `chunk_size` when it is not [`ChunkSize::None`]
    async fn compress(&self, source_dir: &Path, dest_file: &Path, chunk_size: ChunkSize)
        -> Result<()>;
}
