//! Export orchestration
//!
//! - [`selection`] - Turns tag and set names into a work list
//! - [`layout`] - Case folder layout and file categories
//! - [`progress`] - Progress reporting and cancellation
//! - [`package`] - Optional compression of the finished case
//! - [`coordinator`] - Drives the whole export
//! - [`summary`] - What an export did

pub mod coordinator;
pub mod layout;
pub mod package;
pub mod progress;
pub mod selection;
pub mod summary;

pub use coordinator::ExportCoordinator;
pub use layout::{CaseLayout, FileCategory};
pub use package::{package_case, PackagingOutcome};
pub use progress::{ProgressPanel, ProgressSnapshot, ReportStatus};
pub use selection::{Selection, TagWork, WorkList};
pub use summary::{ExportError, ExportErrorType, ExportSummary};
