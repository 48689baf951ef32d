//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "portable-case.toml")]
    pub output: String,

    /// Include example values and comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("Initializing portable-case configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2); // Configuration error exit code
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!("  2. Point source.case_database at the case to export");
                println!("  3. See what can be selected: portable-case list");
                println!("  4. Validate configuration: portable-case validate-config");
                println!("  5. Run export: portable-case export");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5) // Fatal error exit code
            }
        }
    }

    /// Generate minimal configuration
    fn generate_minimal_config() -> String {
        r#"# portable-case configuration

[application]
log_level = "info"

[source]
case_database = "/cases/Case1/autopsy.db"

[selection]
tag_names = ["Bookmark"]
all_tags = false
interesting_set_names = []
all_sets = false

[output]
directory = "/exports"

[packaging]
compress = false
chunk_size = "none"

[logging]
local_enabled = false
local_path = "./logs"
local_rotation = "daily"
"#
        .to_string()
    }

    /// Generate configuration with examples and comments
    fn generate_config_with_examples() -> String {
        r#"# portable-case configuration
#
# Exports tagged files, tagged results and interesting items from a case
# into a self-contained "<case name> (Portable)" folder.
#
# Values may reference environment variables as ${VAR_NAME}. Any value can
# also be overridden with PORTABLE_CASE_<SECTION>_<KEY>, for example
# PORTABLE_CASE_OUTPUT_DIRECTORY=/mnt/usb.

# ============================================================================
# Application Settings
# ============================================================================
[application]
# Log level (trace, debug, info, warn, error)
log_level = "info"

# ============================================================================
# Source Case
# ============================================================================
[source]
# Case database to export from
case_database = "${CASES_ROOT}/Case1/autopsy.db"

# Name of the portable case (defaults to the source case name).
# The folder is named "<case_name> (Portable)".
# case_name = "Case1"

# ============================================================================
# Selection
# ============================================================================
[selection]
# Tag names whose tagged files and tagged results are exported
tag_names = ["Bookmark", "Notable Item"]

# Export every tag name in use instead of the list above
all_tags = false

# Interesting-item sets whose hits are exported
interesting_set_names = []

# Export every interesting-item set in use instead of the list above
all_sets = false

# ============================================================================
# Output
# ============================================================================
[output]
# Existing directory; the portable case folder must not exist yet
directory = "/exports"

# ============================================================================
# Packaging
# ============================================================================
[packaging]
# Compress the finished case into "<case_name> (Portable).zip" with 7-Zip
compress = false

# Split the archive: none, 100mb, 700mb (CD), 1gb, 4.5gb (DVD)
chunk_size = "none"

# 7-Zip executable
seven_zip_path = "7z"

# How often the running archiver is checked, in milliseconds
poll_interval_ms = 200

# ============================================================================
# Logging Configuration
# ============================================================================
[logging]
# Enable local JSON file logging
local_enabled = false

# Local log directory
local_path = "./logs"

# Log rotation (daily or hourly)
local_rotation = "daily"
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;

    #[test]
    fn test_init_args_defaults() {
        let args = InitArgs {
            output: "portable-case.toml".to_string(),
            with_examples: false,
            force: false,
        };

        assert_eq!(args.output, "portable-case.toml");
        assert!(!args.with_examples);
        assert!(!args.force);
    }

    #[test]
    fn test_generate_minimal_config_parses() {
        let config = parse_config(&InitArgs::generate_minimal_config()).unwrap();
        assert_eq!(config.selection.tag_names, vec!["Bookmark"]);
        assert!(!config.packaging.compress);
    }

    #[test]
    fn test_generate_config_with_examples() {
        std::env::set_var("CASES_ROOT", "/cases");
        let config = parse_config(&InitArgs::generate_config_with_examples()).unwrap();
        assert_eq!(
            config.source.case_database,
            std::path::PathBuf::from("/cases/Case1/autopsy.db")
        );
        assert_eq!(config.packaging.poll_interval_ms, 200);
    }

    #[tokio::test]
    async fn test_existing_file_is_not_overwritten() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("portable-case.toml");
        fs::write(&path, "keep me").unwrap();

        let args = InitArgs {
            output: path.to_string_lossy().into_owned(),
            with_examples: false,
            force: false,
        };

        assert_eq!(args.execute().await.unwrap(), 2);
        assert_eq!(fs::read_to_string(&path).unwrap(), "keep me");
    }
}
