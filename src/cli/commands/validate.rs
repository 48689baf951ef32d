//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the portable-case configuration file.

use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("Validating configuration file: {config_path}");
        println!();

        // Loading already substitutes variables, applies overrides and validates
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("Configuration validation failed");
                println!("   Error: {e}");
                println!();
                return Ok(2); // Configuration error exit code
            }
        };

        println!("Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!(
            "  Source Case: {}",
            config.source.case_database.display()
        );
        if let Some(name) = &config.source.case_name {
            println!("  Case Name: {name}");
        }
        if config.selection.all_tags {
            println!("  Tags: all tag names in use");
        } else {
            println!("  Tags: {:?}", config.selection.tag_names);
        }
        if config.selection.all_sets {
            println!("  Interesting-item Sets: all sets in use");
        } else {
            println!(
                "  Interesting-item Sets: {:?}",
                config.selection.interesting_set_names
            );
        }
        println!("  Output Directory: {}", config.output.directory.display());
        println!("  Compress: {}", config.packaging.compress);
        if config.packaging.compress {
            println!("  Chunk Size: {}", config.packaging.chunk_size);
            println!(
                "  7-Zip: {}",
                config.packaging.seven_zip_path.display()
            );
        }
        println!();

        if !config.source.case_database.exists() {
            println!(
                "Warning: source case database {} does not exist",
                config.source.case_database.display()
            );
        }
        if !config.output.directory.is_dir() {
            println!(
                "Warning: output directory {} does not exist",
                config.output.directory.display()
            );
        }

        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_valid_config_exits_zero() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("portable-case.toml");
        fs::write(
            &path,
            r#"
[source]
case_database = "/cases/Case1/case.db"

[selection]
tag_names = ["Bookmark"]

[output]
directory = "/exports"
"#,
        )
        .unwrap();

        let code = ValidateArgs {}
            .execute(path.to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(code, 0);
    }

    #[tokio::test]
    async fn test_missing_config_exits_two() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.toml");

        let code = ValidateArgs {}
            .execute(path.to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(code, 2);
    }
}
