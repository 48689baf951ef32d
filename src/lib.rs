// portable-case - Forensic Portable Case Exporter
// Copyright (c) 2025 Portable Case Contributors
// Licensed under the MIT License

//! # portable-case
//!
//! Exports a selected subset of a forensic case (tagged files, tagged
//! results and interesting items) into a new, self-contained case that can
//! be handed to another examiner.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Selecting** tag names and interesting-item sets from a source case
//! - **Copying** every selected item together with its full ancestry
//!   (image, volume system, volume, file system, directories) exactly once
//! - **Replicating** custom artifact and attribute types, tag definitions
//!   and tag assignments against the new identifiers
//! - **Packaging** the finished case folder into a (split) zip archive
//!
//! ## Architecture
//!
//! The crate follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (session, copy, state, export)
//! - [`adapters`] - Case databases and the external archiver
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use portable_case::config::load_config;
//! use portable_case::core::export::ExportCoordinator;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("portable-case.toml")?;
//!     let coordinator = ExportCoordinator::new(config)?;
//!
//!     let summary = coordinator.execute_export().await?;
//!
//!     println!(
//!         "Exported {} files into {}",
//!         summary.counts.files,
//!         summary.case_dir.display()
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Cancellation
//!
//! Every export reports through a [`core::export::ProgressPanel`]. Calling
//! [`cancel`](core::export::ProgressPanel::cancel) on it stops the copy
//! between items and kills a running archiver; the export then finishes
//! with status `Canceled`.
//!
//! ```rust,no_run
//! # use portable_case::core::export::ExportCoordinator;
//! # async fn example(coordinator: ExportCoordinator) {
//! let progress = coordinator.progress();
//! tokio::spawn(async move {
//!     let _ = tokio::signal::ctrl_c().await;
//!     progress.cancel();
//! });
//! # }
//! ```
//!
//! ## Error Handling
//!
//! All library errors are [`domain::PortableCaseError`]:
//!
//! ```rust,no_run
//! use portable_case::domain::PortableCaseError;
//!
//! fn example() -> Result<(), PortableCaseError> {
//!     let config = portable_case::config::load_config("portable-case.toml")?;
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
