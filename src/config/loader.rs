//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::PortableCaseConfig;
use crate::domain::errors::PortableCaseError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into PortableCaseConfig
/// 4. Applies environment variable overrides (PORTABLE_CASE_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - A referenced environment variable is not set
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use portable_case::config::loader::load_config;
///
/// let config = load_config("portable-case.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<PortableCaseConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(PortableCaseError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        PortableCaseError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    parse_config(&contents)
}

/// Parses configuration text, applying substitution, overrides and validation
///
/// # Errors
///
/// Same as [`load_config`], minus the file access.
pub fn parse_config(contents: &str) -> Result<PortableCaseConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: PortableCaseConfig = toml::from_str(&contents)
        .map_err(|e| PortableCaseError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        PortableCaseError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| PortableCaseError::Configuration(format!("Invalid placeholder pattern: {e}")))?;
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(PortableCaseError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using the PORTABLE_CASE_* prefix
///
/// Variables follow the pattern `PORTABLE_CASE_<SECTION>_<KEY>`, for example
/// `PORTABLE_CASE_OUTPUT_DIRECTORY` or `PORTABLE_CASE_PACKAGING_CHUNK_SIZE`.
/// List values are comma separated.
fn apply_env_overrides(config: &mut PortableCaseConfig) -> Result<()> {
    if let Ok(val) = std::env::var("PORTABLE_CASE_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    if let Ok(val) = std::env::var("PORTABLE_CASE_SOURCE_CASE_DATABASE") {
        config.source.case_database = PathBuf::from(val);
    }
    if let Ok(val) = std::env::var("PORTABLE_CASE_SOURCE_CASE_NAME") {
        config.source.case_name = Some(val);
    }

    if let Ok(val) = std::env::var("PORTABLE_CASE_SELECTION_TAG_NAMES") {
        config.selection.tag_names = split_list(&val);
    }
    if let Ok(val) = std::env::var("PORTABLE_CASE_SELECTION_ALL_TAGS") {
        config.selection.all_tags = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("PORTABLE_CASE_SELECTION_INTERESTING_SET_NAMES") {
        config.selection.interesting_set_names = split_list(&val);
    }
    if let Ok(val) = std::env::var("PORTABLE_CASE_SELECTION_ALL_SETS") {
        config.selection.all_sets = val.parse().unwrap_or(false);
    }

    if let Ok(val) = std::env::var("PORTABLE_CASE_OUTPUT_DIRECTORY") {
        config.output.directory = PathBuf::from(val);
    }

    if let Ok(val) = std::env::var("PORTABLE_CASE_PACKAGING_COMPRESS") {
        config.packaging.compress = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("PORTABLE_CASE_PACKAGING_CHUNK_SIZE") {
        config.packaging.chunk_size = val.parse().map_err(PortableCaseError::Configuration)?;
    }
    if let Ok(val) = std::env::var("PORTABLE_CASE_PACKAGING_SEVEN_ZIP_PATH") {
        config.packaging.seven_zip_path = PathBuf::from(val);
    }
    if let Ok(val) = std::env::var("PORTABLE_CASE_PACKAGING_POLL_INTERVAL_MS") {
        if let Ok(interval) = val.parse() {
            config.packaging.poll_interval_ms = interval;
        }
    }

    if let Ok(val) = std::env::var("PORTABLE_CASE_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(true);
    }
    if let Ok(val) = std::env::var("PORTABLE_CASE_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Ok(val) = std::env::var("PORTABLE_CASE_LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }

    Ok(())
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
