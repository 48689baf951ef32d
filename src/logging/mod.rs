//! Logging and observability
//!
//! Structured logging through `tracing`: console output plus an optional
//! rotating JSON log file.
//!
//! # Example
//!
//! ```no_run
//! use portable_case::logging::init_logging;
//! use portable_case::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the start of an export
///
/// # Example
///
/// ```no_run
/// use portable_case::log_export_start;
///
/// log_export_start!("Case1 (Portable)", 2, 1);
/// ```
#[macro_export]
macro_rules! log_export_start {
    ($case_name:expr, $tag_count:expr, $set_count:expr) => {
        tracing::info!(
            case_name = %$case_name,
            tags = $tag_count,
            interesting_sets = $set_count,
            "Starting portable case export"
        );
    };
}

/// Log the completion of an export
///
/// # Example
///
/// ```no_run
/// use portable_case::log_export_complete;
/// use std::time::Duration;
///
/// log_export_complete!(42, 7, Duration::from_secs(10));
/// ```
#[macro_export]
macro_rules! log_export_complete {
    ($files:expr, $artifacts:expr, $duration:expr) => {
        tracing::info!(
            files = $files,
            artifacts = $artifacts,
            duration_ms = $duration.as_millis(),
            "Portable case export completed"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use portable_case::log_error_with_context;
/// use portable_case::domain::PortableCaseError;
///
/// let error = PortableCaseError::Validation("nothing selected".to_string());
/// log_error_with_context!(&error, "Export rejected");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}

/// Log progress through a list of items being copied
///
/// # Example
///
/// ```no_run
/// use portable_case::log_copy_progress;
///
/// log_copy_progress!("Bookmark", 10, 100);
/// ```
#[macro_export]
macro_rules! log_copy_progress {
    ($label:expr, $current:expr, $total:expr) => {
        tracing::debug!(
            label = %$label,
            current = $current,
            total = $total,
            progress_pct = (if $total == 0 {
                100.0
            } else {
                $current as f64 / $total as f64 * 100.0
            }),
            "Copying"
        );
    };
}
