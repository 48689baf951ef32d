//! Configuration management.
//!
//! TOML configuration with `${VAR_NAME}` substitution, `PORTABLE_CASE_*`
//! environment overrides and per-section validation.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use portable_case::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("portable-case.toml")?;
//! println!("Source case: {}", config.source.case_database.display());
//! println!("Output: {}", config.output.directory.display());
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level
//! - [`SourceConfig`] - Source case database and portable case name
//! - [`SelectionConfig`] - Tags and interesting-item sets to export
//! - [`OutputConfig`] - Output directory
//! - [`PackagingConfig`] - Compression and archive volume size
//! - [`LoggingConfig`] - Local file logging
//!
//! # Example Configuration
//!
//! ```toml
//! [source]
//! case_database = "${CASES_ROOT}/Case1/autopsy.db"
//!
//! [selection]
//! tag_names = ["Bookmark", "Notable Item"]
//! all_sets = true
//!
//! [output]
//! directory = "/exports"
//!
//! [packaging]
//! compress = true
//! chunk_size = "4.5gb"
//! ```

pub mod loader;
pub mod schema;

pub use loader::{load_config, parse_config};
pub use schema::{
    ApplicationConfig, LoggingConfig, OutputConfig, PackagingConfig, PortableCaseConfig,
    SelectionConfig, SourceConfig,
};
