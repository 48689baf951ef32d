//! Case store abstraction layer
//!
//! Trait-based access to source and portable case databases, so the export
//! engine can be driven against SQLite or against in-memory fakes in tests.

pub mod factory;
pub mod traits;

pub use factory::{create_portable_case, open_source_case};
pub use traits::{IdSequence, KeyValueTable, PortableCaseStore, SourceCase, TransactionGuard};
