//! Core export engine.
//!
//! # Modules
//!
//! - [`session`] - Per-export state: identifier map, type registry, tag map
//! - [`copy`] - Content graph, artifact and tag copy
//! - [`state`] - Schema baseline recorded in the portable case
//! - [`export`] - Selection, progress, packaging and orchestration
//!
//! # Export Workflow
//!
//! 1. **Resolve**: turn the selected tag names and interesting-item sets into
//!    a work list, rejecting empty selections
//! 2. **Create**: make the case folder and an empty portable case database
//! 3. **Baseline**: record the source case's highest ids
//! 4. **Copy**: tag definitions, then every tagged file, tagged result and
//!    interesting item with the content they hang off
//! 5. **Package** (optional): compress the case folder
//!
//! # Example
//!
//! ```rust,no_run
//! use portable_case::config::load_config;
//! use portable_case::core::export::ExportCoordinator;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("portable-case.toml")?;
//! let coordinator = ExportCoordinator::new(config)?;
//!
//! let summary = coordinator.execute_export().await?;
//! println!("Status: {}", summary.status);
//! println!("Files: {}", summary.counts.files);
//! # Ok(())
//! # }
//! ```

pub mod copy;
pub mod export;
pub mod session;
pub mod state;
