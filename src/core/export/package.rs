//! Packaging stage
//!
//! The finished case folder is compressed into a temporary folder next to it.
//! Only once the archiver succeeds is the case folder swapped for the
//! archive; on failure or cancellation the temporary folder is removed and
//! the uncompressed case stays as it was.

use crate::adapters::archive::Archiver;
use crate::core::export::layout::CaseLayout;
use crate::core::export::progress::ProgressPanel;
use crate::domain::context::ResultExt;
use crate::domain::{ChunkSize, PortableCaseError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackagingOutcome {
    /// The case folder now holds the archive at this path
    Packaged(PathBuf),
    Cancelled,
}

/// Compresses the case folder and replaces its contents with the archive
///
/// # Errors
///
/// Archiver failures are returned as `PortableCaseError::Packaging`; the
/// uncompressed case folder is left intact.
pub async fn package_case(
    archiver: &dyn Archiver,
    layout: &CaseLayout,
    chunk_size: ChunkSize,
    progress: &ProgressPanel,
) -> Result<PackagingOutcome> {
    progress.update_status("Compressing case");
    progress.set_indeterminate(true);

    let case_dir = layout.case_dir();
    let folder_name = case_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| {
            PortableCaseError::Packaging(format!("{} has no folder name", case_dir.display()))
        })?;
    let archive_name = format!("{folder_name}.zip");

    let temp_dir = layout
        .output_dir()
        .join(format!("portableCase-{}", Uuid::new_v4()));
    fs::create_dir(&temp_dir)
        .with_context(|| format!("Failed to create {}", temp_dir.display()))?;
    let temp_archive = temp_dir.join(&archive_name);

    let compressed = tokio::select! {
        result = archiver.compress(case_dir, &temp_archive, chunk_size) => Some(result),
        _ = progress.cancelled() => None,
    };

    match compressed {
        None => {
            info!("Packaging cancelled, keeping uncompressed case");
            remove_dir(&temp_dir);
            return Ok(PackagingOutcome::Cancelled);
        }
        Some(Err(e)) => {
            remove_dir(&temp_dir);
            return Err(e);
        }
        Some(Ok(())) => {}
    }

    if progress.is_cancelled() {
        remove_dir(&temp_dir);
        return Ok(PackagingOutcome::Cancelled);
    }

    replace_case_folder(case_dir, &temp_dir)?;
    let archive = case_dir.join(&archive_name);
    info!(archive = %archive.display(), "Case folder replaced by archive");
    Ok(PackagingOutcome::Packaged(archive))
}

/// Swaps `case_dir` for `replacement`, restoring the original on failure
fn replace_case_folder(case_dir: &Path, replacement: &Path) -> Result<()> {
    let backup = case_dir.with_file_name(format!("portableCase-{}-backup", Uuid::new_v4()));

    if let Err(e) = fs::rename(case_dir, &backup) {
        remove_dir(replacement);
        return Err(PortableCaseError::Packaging(format!(
            "Failed to move {} aside: {e}",
            case_dir.display()
        )));
    }

    if let Err(e) = fs::rename(replacement, case_dir) {
        if let Err(restore) = fs::rename(&backup, case_dir) {
            warn!(
                backup = %backup.display(),
                error = %restore,
                "Failed to restore case folder from backup"
            );
        }
        remove_dir(replacement);
        return Err(PortableCaseError::Packaging(format!(
            "Failed to move archive into {}: {e}",
            case_dir.display()
        )));
    }

    remove_dir(&backup);
    Ok(())
}

fn remove_dir(path: &Path) {
    if let Err(e) = fs::remove_dir_all(path) {
        warn!(path = %path.display(), error = %e, "Failed to remove folder");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::time::Duration;
    use tempfile::TempDir;

    struct WritingArchiver;

    #[async_trait]
    impl Archiver for WritingArchiver {
        async fn compress(&self, _source: &Path, dest: &Path, _chunk: ChunkSize) -> Result<()> {
            fs::write(dest, b"PK")?;
            Ok(())
        }
    }

    struct FailingArchiver;

    #[async_trait]
    impl Archiver for FailingArchiver {
        async fn compress(&self, _source: &Path, dest: &Path, _chunk: ChunkSize) -> Result<()> {
            fs::write(dest, b"partial")?;
            Err(PortableCaseError::Packaging("disk full".to_string()))
        }
    }

    struct HangingArchiver;

    #[async_trait]
    impl Archiver for HangingArchiver {
        async fn compress(&self, _source: &Path, _dest: &Path, _chunk: ChunkSize) -> Result<()> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(())
        }
    }

    fn case(dir: &TempDir) -> CaseLayout {
        let layout = CaseLayout::new(dir.path(), "Case");
        layout.create_directories().unwrap();
        fs::write(layout.database_path(), b"db").unwrap();
        layout
    }

    fn only_entry(dir: &Path) -> Vec<String> {
        fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect()
    }

    #[tokio::test]
    async fn test_successful_packaging_replaces_folder() {
        let dir = TempDir::new().unwrap();
        let layout = case(&dir);
        let progress = ProgressPanel::new();

        let outcome = package_case(&WritingArchiver, &layout, ChunkSize::None, &progress)
            .await
            .unwrap();
        assert_eq!(
            outcome,
            PackagingOutcome::Packaged(layout.case_dir().join("Case (Portable).zip"))
        );
        assert_eq!(only_entry(layout.case_dir()), vec!["Case (Portable).zip"]);
        assert_eq!(only_entry(dir.path()), vec!["Case (Portable)"]);
    }

    #[tokio::test]
    async fn test_failed_packaging_keeps_case() {
        let dir = TempDir::new().unwrap();
        let layout = case(&dir);
        let progress = ProgressPanel::new();

        let err = package_case(&FailingArchiver, &layout, ChunkSize::Cd, &progress)
            .await
            .unwrap_err();
        assert!(matches!(err, PortableCaseError::Packaging(_)));
        assert!(layout.database_path().is_file());
        assert_eq!(only_entry(dir.path()), vec!["Case (Portable)"]);
    }

    #[tokio::test]
    async fn test_cancelled_packaging_keeps_case() {
        let dir = TempDir::new().unwrap();
        let layout = case(&dir);
        let progress = std::sync::Arc::new(ProgressPanel::new());
        progress.start();

        let canceller = {
            let progress = std::sync::Arc::clone(&progress);
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                progress.cancel();
            })
        };

        let outcome = package_case(&HangingArchiver, &layout, ChunkSize::None, &progress)
            .await
            .unwrap();
        canceller.await.unwrap();
        assert_eq!(outcome, PackagingOutcome::Cancelled);
        assert!(layout.database_path().is_file());
        assert_eq!(only_entry(dir.path()), vec!["Case (Portable)"]);
    }
}
