//! Error context extension trait
//!
//! Works like `anyhow::Context` but keeps the library on [`PortableCaseError`].
//!
//! ```rust
//! use portable_case::domain::Result;
//! use portable_case::domain::context::ResultExt;
//!
//! fn read_metadata(path: &str) -> Result<String> {
//!     std::fs::read_to_string(path).with_context(|| format!("Failed to read {path}"))
//! }
//! ```

use crate::domain::errors::PortableCaseError;
use crate::domain::result::Result;

/// Adds context to the error of any result whose error converts to
/// `PortableCaseError`
///
/// The variant of the original error is kept; only its message is prefixed,
/// so callers can still match on `Store`, `Io` and so on.
pub trait ResultExt<T> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: std::fmt::Display;

    /// Lazily evaluated version of [`ResultExt::context`]
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: std::fmt::Display,
        F: FnOnce() -> C;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<PortableCaseError>,
{
    fn context<C>(self, context: C) -> Result<T>
    where
        C: std::fmt::Display,
    {
        self.map_err(|e| prefix(e.into(), &context))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: std::fmt::Display,
        F: FnOnce() -> C,
    {
        self.map_err(|e| prefix(e.into(), &f()))
    }
}

fn prefix(err: PortableCaseError, context: &dyn std::fmt::Display) -> PortableCaseError {
    use crate::domain::errors::StoreError;
    use PortableCaseError as E;

    match err {
        E::Configuration(m) => E::Configuration(format!("{context}: {m}")),
        E::Validation(m) => E::Validation(format!("{context}: {m}")),
        E::Copy(m) => E::Copy(format!("{context}: {m}")),
        E::Packaging(m) => E::Packaging(format!("{context}: {m}")),
        E::Io(m) => E::Io(format!("{context}: {m}")),
        E::Serialization(m) => E::Serialization(format!("{context}: {m}")),
        E::Store(StoreError::QueryFailed(m)) => {
            E::Store(StoreError::QueryFailed(format!("{context}: {m}")))
        }
        E::Store(StoreError::InsertFailed(m)) => {
            E::Store(StoreError::InsertFailed(format!("{context}: {m}")))
        }
        E::Other(m) => E::Other(format!("{context}: {m}")),
        other => other,
    }
}
