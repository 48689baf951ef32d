//! External system integrations.
//!
//! - [`database`] - Store traits consumed by the export engine and the scoped
//!   transaction guard
//! - [`sqlite`] - SQLite case database implementing both store traits
//! - [`archive`] - Archive packaging through an external 7-Zip executable
//!
//! The export engine only sees the traits in [`database`] and [`archive`], so
//! tests can swap in their own implementations.

pub mod archive;
pub mod database;
pub mod sqlite;
