//! 7-Zip command line archiver

use super::Archiver;
use crate::config::PackagingConfig;
use crate::domain::{ChunkSize, PortableCaseError, Result};
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::process::Command;

/// Runs `7z a <dest> <source> [-v<size>]`
#[derive(Debug, Clone)]
pub struct SevenZipArchiver {
    executable: PathBuf,
    poll_interval: Duration,
}

impl SevenZipArchiver {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            poll_interval: Duration::from_millis(200),
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn from_config(config: &PackagingConfig) -> Self {
        Self::new(config.seven_zip_path.clone())
            .with_poll_interval(Duration::from_millis(config.poll_interval_ms))
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    fn arguments(source_dir: &Path, dest_file: &Path, chunk_size: ChunkSize) -> Vec<OsString> {
        let mut args = vec![
            OsString::from("a"),
            dest_file.as_os_str().to_owned(),
            source_dir.as_os_str().to_owned(),
        ];
        if let Some(param) = chunk_size.seven_zip_param() {
            args.push(OsString::from(format!("-v{param}")));
        }
        args
    }
}

#[async_trait]
impl Archiver for SevenZipArchiver {
    async fn compress(
        &self,
        source_dir: &Path,
        dest_file: &Path,
        chunk_size: ChunkSize,
    ) -> Result<()> {
        let args = Self::arguments(source_dir, dest_file, chunk_size);
        tracing::info!(
            executable = %self.executable.display(),
            source = %source_dir.display(),
            dest = %dest_file.display(),
            chunk_size = chunk_size.as_str(),
            "Starting archiver"
        );

        let mut child = Command::new(&self.executable)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                PortableCaseError::Packaging(format!(
                    "Failed to start {}: {}",
                    self.executable.display(),
                    e
                ))
            })?;

        // Drained concurrently so a chatty archiver cannot block on a full pipe.
        let stderr_task = child.stderr.take().map(|mut stderr| {
            tokio::spawn(async move {
                let mut output = String::new();
                let _ = stderr.read_to_string(&mut output).await;
                output
            })
        });

        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => tokio::time::sleep(self.poll_interval).await,
                Err(e) => {
                    return Err(PortableCaseError::Packaging(format!(
                        "Failed to poll {}: {}",
                        self.executable.display(),
                        e
                    )))
                }
            }
        };

        let stderr = match stderr_task {
            Some(task) => task.await.unwrap_or_default(),
            None => String::new(),
        };

        if status.success() {
            tracing::info!(dest = %dest_file.display(), "Archiver finished");
            Ok(())
        } else {
            Err(PortableCaseError::Packaging(format!(
                "{} exited with {}: {}",
                self.executable.display(),
                status,
                stderr.trim()
            )))
        }
    }
}
