//! Case store factory
//!
//! Opens source cases and creates portable case stores for the export
//! coordinator. Only SQLite case databases exist today; callers depend on the
//! trait objects so tests can substitute their own stores.

use crate::adapters::database::traits::{PortableCaseStore, SourceCase};
use crate::adapters::sqlite::SqliteCaseDb;
use crate::domain::Result;
use std::path::Path;
use std::sync::Arc;

/// Opens an existing case database for reading
///
/// # Errors
///
/// Returns `StoreError::OpenFailed` if the file does not exist or is not a
/// case database.
pub fn open_source_case(path: &Path) -> Result<Arc<dyn SourceCase>> {
    tracing::info!(path = %path.display(), "Opening source case");
    let db = SqliteCaseDb::open(path)?;
    Ok(Arc::new(db) as Arc<dyn SourceCase>)
}

/// Creates a new, empty portable case database named `case_name` at `path`
///
/// # Errors
///
/// Returns an error if the file already exists or the schema cannot be
/// created.
pub fn create_portable_case(path: &Path, case_name: &str) -> Result<Arc<dyn PortableCaseStore>> {
    tracing::info!(path = %path.display(), case_name, "Creating portable case database");
    let db = SqliteCaseDb::create(path, case_name)?;
    Ok(Arc::new(db) as Arc<dyn PortableCaseStore>)
}
