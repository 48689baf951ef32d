//! Export command implementation
//!
//! This module implements the `export` command, which builds a portable case
//! from the tags and interesting-item sets selected in the configuration.

use crate::config::{load_config, PortableCaseConfig};
use crate::core::export::{ExportCoordinator, ExportErrorType, ReportStatus};
use crate::domain::ChunkSize;
use clap::Args;
use std::path::PathBuf;
use tokio::sync::watch;

/// Arguments for the export command
#[derive(Args, Debug, Default)]
pub struct ExportArgs {
    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Tag name to export (repeatable; replaces the configured tag names)
    #[arg(long)]
    pub tag: Vec<String>,

    /// Export every tag name in use
    #[arg(long)]
    pub all_tags: bool,

    /// Interesting-item set to export (repeatable; replaces the configured sets)
    #[arg(long)]
    pub set: Vec<String>,

    /// Export every interesting-item set in use
    #[arg(long)]
    pub all_sets: bool,

    /// Override the output directory
    #[arg(long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Override the portable case name
    #[arg(long)]
    pub case_name: Option<String>,

    /// Compress the finished case with 7-Zip
    #[arg(long)]
    pub compress: bool,

    /// Archive volume size (none, 100mb, 700mb, 1gb, 4.5gb)
    #[arg(long, value_name = "SIZE")]
    pub chunk_size: Option<String>,
}

impl ExportArgs {
    /// Applies command line overrides on top of the loaded configuration
    ///
    /// # Errors
    ///
    /// Returns an error if `--chunk-size` is not a known size.
    pub fn apply_overrides(&self, config: &mut PortableCaseConfig) -> Result<(), String> {
        if !self.tag.is_empty() {
            tracing::info!(tags = ?self.tag, "Overriding tag names from CLI");
            config.selection.tag_names = self.tag.clone();
        }
        if self.all_tags {
            config.selection.all_tags = true;
        }
        if !self.set.is_empty() {
            tracing::info!(sets = ?self.set, "Overriding interesting-item sets from CLI");
            config.selection.interesting_set_names = self.set.clone();
        }
        if self.all_sets {
            config.selection.all_sets = true;
        }
        if let Some(output) = &self.output {
            tracing::info!(output = %output.display(), "Overriding output directory from CLI");
            config.output.directory = output.clone();
        }
        if let Some(case_name) = &self.case_name {
            config.source.case_name = Some(case_name.clone());
        }
        if self.compress {
            config.packaging.compress = true;
        }
        if let Some(chunk_size) = &self.chunk_size {
            config.packaging.chunk_size = chunk_size.parse::<ChunkSize>()?;
        }
        Ok(())
    }

    /// Execute the export command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting export command");

        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(2);
            }
        };

        if let Err(e) = self.apply_overrides(&mut config) {
            eprintln!("Invalid command line option: {e}");
            return Ok(2);
        }

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(2); // Configuration error exit code
        }

        if !self.yes {
            println!("Export Configuration:");
            println!("  Source case: {}", config.source.case_database.display());
            println!(
                "  Tags: {}",
                if config.selection.all_tags {
                    "All".to_string()
                } else {
                    format!("{:?}", config.selection.tag_names)
                }
            );
            println!(
                "  Interesting-item sets: {}",
                if config.selection.all_sets {
                    "All".to_string()
                } else {
                    format!("{:?}", config.selection.interesting_set_names)
                }
            );
            println!("  Output: {}", config.output.directory.display());
            println!(
                "  Compression: {}",
                if config.packaging.compress {
                    config.packaging.chunk_size.display_name()
                } else {
                    "off"
                }
            );
            println!();
            print!("Proceed with export? [y/N]: ");
            use std::io::{self, Write};
            io::stdout().flush()?;

            let mut input = String::new();
            io::stdin().read_line(&mut input)?;

            if !input.trim().eq_ignore_ascii_case("y") {
                println!("Export cancelled.");
                return Ok(0);
            }
        }

        tracing::info!("Creating export coordinator");
        let coordinator = match ExportCoordinator::new(config) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create export coordinator");
                eprintln!("Failed to open source case: {e}");
                return Ok(5);
            }
        };

        let progress = coordinator.progress();
        let mut shutdown = shutdown_signal;
        let cancel_task = tokio::spawn(async move {
            if shutdown.wait_for(|requested| *requested).await.is_ok() {
                progress.cancel();
            }
        });

        println!("Starting export...");
        println!();

        let result = coordinator.execute_export().await;
        cancel_task.abort();

        let summary = match result {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Export failed: {e}");
                return Ok(match ExportErrorType::classify(&e) {
                    ExportErrorType::Validation | ExportErrorType::Configuration => 2,
                    _ => 5,
                });
            }
        };

        println!();
        println!("Export Summary:");
        println!("  Case: {}", summary.case_name);
        println!("  Location: {}", summary.case_dir.display());
        println!("  Status: {}", summary.status);
        println!("  Tag definitions: {}", summary.counts.tag_definitions);
        println!("  Tagged files: {}", summary.counts.content_tags);
        println!("  Tagged results: {}", summary.counts.artifact_tags);
        println!("  Interesting items: {}", summary.counts.interesting_items);
        println!(
            "  Files copied: {} ({} bytes)",
            summary.counts.files, summary.counts.bytes
        );
        println!("  Artifacts copied: {}", summary.counts.artifacts);
        println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
        if summary.compressed {
            println!("  Archive: {}", summary.case_dir.display());
        }
        println!();

        let exit_code = match summary.status {
            ReportStatus::Complete => {
                println!("Export completed successfully!");
                0
            }
            ReportStatus::Canceled => {
                println!("Export cancelled. The partial case folder was left in place.");
                tracing::info!("Export interrupted by user signal");
                130 // SIGINT exit code (standard Unix convention)
            }
            _ => 5,
        };

        Ok(exit_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;

    fn config() -> PortableCaseConfig {
        parse_config(
            r#"
[source]
case_database = "/cases/Case1/case.db"

[selection]
tag_names = ["Bookmark"]

[output]
directory = "/exports"
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_no_overrides_keeps_config() {
        let mut config = config();
        ExportArgs::default().apply_overrides(&mut config).unwrap();
        assert_eq!(config.selection.tag_names, vec!["Bookmark"]);
        assert!(!config.packaging.compress);
    }

    #[test]
    fn test_overrides_replace_selection_and_packaging() {
        let mut config = config();
        let args = ExportArgs {
            tag: vec!["Notable Item".to_string()],
            all_sets: true,
            output: Some(PathBuf::from("/elsewhere")),
            compress: true,
            chunk_size: Some("1gb".to_string()),
            ..ExportArgs::default()
        };

        args.apply_overrides(&mut config).unwrap();

        assert_eq!(config.selection.tag_names, vec!["Notable Item"]);
        assert!(config.selection.all_sets);
        assert_eq!(config.output.directory, PathBuf::from("/elsewhere"));
        assert!(config.packaging.compress);
        assert_eq!(config.packaging.chunk_size, ChunkSize::OneGb);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_chunk_size_is_rejected() {
        let mut config = config();
        let args = ExportArgs {
            chunk_size: Some("3mb".to_string()),
            ..ExportArgs::default()
        };
        assert!(args.apply_overrides(&mut config).is_err());
    }
}
