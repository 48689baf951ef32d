//! SQLite case database
//!
//! Source cases and portable cases share one schema, so a single
//! [`SqliteCaseDb`] implements both the read-only [`SourceCase`] surface and
//! the [`PortableCaseStore`] mutation surface.
//!
//! [`SourceCase`]: crate::adapters::database::SourceCase
//! [`PortableCaseStore`]: crate::adapters::database::PortableCaseStore

pub mod client;
pub mod models;
mod portable;
mod source;

pub use client::SqliteCaseDb;
