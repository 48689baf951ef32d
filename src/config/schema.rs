//! Configuration schema types
//!
//! Maps one-to-one onto the sections of `portable-case.toml`.

use crate::domain::ChunkSize;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortableCaseConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Case to export from
    pub source: SourceConfig,

    /// Tags and interesting-item sets to export
    #[serde(default)]
    pub selection: SelectionConfig,

    /// Where the portable case folder is created
    pub output: OutputConfig,

    /// Optional compression of the finished case
    #[serde(default)]
    pub packaging: PackagingConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl PortableCaseConfig {
    /// Validates the configuration
    ///
    /// Only checks that can be made without touching the source case happen
    /// here; whether the selection is empty is decided by the export itself.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.source.validate()?;
        self.selection.validate()?;
        self.output.validate()?;
        self.packaging.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Source case configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Path to the source case database
    pub case_database: PathBuf,

    /// Name for the portable case; defaults to the source case's own name
    #[serde(default)]
    pub case_name: Option<String>,
}

impl SourceConfig {
    fn validate(&self) -> Result<(), String> {
        if self.case_database.as_os_str().is_empty() {
            return Err("source.case_database cannot be empty".to_string());
        }
        if let Some(name) = &self.case_name {
            if name.trim().is_empty() {
                return Err("source.case_name cannot be blank".to_string());
            }
            if name.contains(['/', '\\']) {
                return Err(format!(
                    "source.case_name '{name}' cannot contain path separators"
                ));
            }
        }
        Ok(())
    }
}

/// What to export
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Tag display names whose tagged files and results are exported
    #[serde(default)]
    pub tag_names: Vec<String>,

    /// Export every tag name in use, ignoring `tag_names`
    #[serde(default)]
    pub all_tags: bool,

    /// Interesting-item set names whose hits are exported
    #[serde(default)]
    pub interesting_set_names: Vec<String>,

    /// Export every interesting-item set in use, ignoring `interesting_set_names`
    #[serde(default)]
    pub all_sets: bool,
}

impl SelectionConfig {
    fn validate(&self) -> Result<(), String> {
        if self.tag_names.iter().any(|t| t.trim().is_empty()) {
            return Err("selection.tag_names cannot contain blank names".to_string());
        }
        if self.interesting_set_names.iter().any(|s| s.trim().is_empty()) {
            return Err("selection.interesting_set_names cannot contain blank names".to_string());
        }
        Ok(())
    }
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Existing directory that will contain the `<case> (Portable)` folder
    pub directory: PathBuf,
}

impl OutputConfig {
    fn validate(&self) -> Result<(), String> {
        if self.directory.as_os_str().is_empty() {
            return Err("output.directory cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Packaging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackagingConfig {
    /// Compress the finished case into a zip archive
    #[serde(default)]
    pub compress: bool,

    /// Split the archive into volumes of this size
    #[serde(default)]
    pub chunk_size: ChunkSize,

    /// 7-Zip executable
    #[serde(default = "default_seven_zip_path")]
    pub seven_zip_path: PathBuf,

    /// How often the running archiver is checked for completion
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl PackagingConfig {
    fn validate(&self) -> Result<(), String> {
        if self.poll_interval_ms == 0 || self.poll_interval_ms > 60_000 {
            return Err(format!(
                "packaging.poll_interval_ms must be between 1 and 60000 (got {})",
                self.poll_interval_ms
            ));
        }
        if self.compress && self.seven_zip_path.as_os_str().is_empty() {
            return Err("packaging.seven_zip_path cannot be empty when compress = true".to_string());
        }
        if !self.compress && self.chunk_size != ChunkSize::None {
            return Err(format!(
                "packaging.chunk_size '{}' requires compress = true",
                self.chunk_size.as_str()
            ));
        }
        Ok(())
    }
}

impl Default for PackagingConfig {
    fn default() -> Self {
        Self {
            compress: false,
            chunk_size: ChunkSize::None,
            seven_zip_path: default_seven_zip_path(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy (daily or hourly)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }
        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local_enabled = true".to_string());
        }
        Ok(())
    }

    /// Console-only logging, used before a configuration file is loaded
    pub fn console_only() -> Self {
        Self {
            local_enabled: false,
            ..Self::default()
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_seven_zip_path() -> PathBuf {
    PathBuf::from("7z")
}

fn default_poll_interval_ms() -> u64 {
    200
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
