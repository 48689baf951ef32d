//! Export summary and reporting

use crate::core::export::progress::ReportStatus;
use crate::core::session::CopyStats;
use crate::domain::PortableCaseError;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

/// Summary of an export operation
#[derive(Debug, Clone, Serialize)]
pub struct ExportSummary {
    /// Name of the portable case
    pub case_name: String,

    /// Portable case folder
    pub case_dir: PathBuf,

    /// Terminal status
    pub status: ReportStatus,

    /// What was written
    pub counts: CopyStats,

    /// Whether the case folder was replaced by an archive
    pub compressed: bool,

    /// Duration of the export
    pub duration: Duration,

    /// Errors encountered during export
    pub errors: Vec<ExportError>,
}

impl ExportSummary {
    pub fn new(case_name: impl Into<String>, case_dir: impl Into<PathBuf>) -> Self {
        Self {
            case_name: case_name.into(),
            case_dir: case_dir.into(),
            status: ReportStatus::Queuing,
            counts: CopyStats::default(),
            compressed: false,
            duration: Duration::from_secs(0),
            errors: Vec::new(),
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_status(mut self, status: ReportStatus) -> Self {
        self.status = status;
        self
    }

    /// Add an error
    pub fn add_error(&mut self, error: ExportError) {
        self.errors.push(error);
    }

    pub fn is_successful(&self) -> bool {
        self.status == ReportStatus::Complete && self.errors.is_empty()
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == ReportStatus::Canceled
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            case_name = %self.case_name,
            case_dir = %self.case_dir.display(),
            status = %self.status,
            content_rows = self.counts.content_rows,
            files = self.counts.files,
            bytes = self.counts.bytes,
            artifacts = self.counts.artifacts,
            custom_artifact_types = self.counts.custom_artifact_types,
            custom_attribute_types = self.counts.custom_attribute_types,
            tag_definitions = self.counts.tag_definitions,
            content_tags = self.counts.content_tags,
            artifact_tags = self.counts.artifact_tags,
            interesting_items = self.counts.interesting_items,
            compressed = self.compressed,
            duration_secs = self.duration.as_secs(),
            "Export summary"
        );

        if !self.errors.is_empty() {
            tracing::warn!(
                error_count = self.errors.len(),
                "Export completed with errors"
            );
            for error in &self.errors {
                tracing::warn!(
                    error_type = ?error.error_type,
                    message = %error.message,
                    context = ?error.context,
                    "Export error"
                );
            }
        }
    }
}

/// Type of export error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExportErrorType {
    /// Selection or output directory rejected
    Validation,
    /// Case database error
    Storage,
    /// Copy pipeline error
    Copy,
    /// Archiving error
    Packaging,
    /// Configuration error
    Configuration,
    /// Unknown error
    Unknown,
}

impl ExportErrorType {
    pub fn classify(error: &PortableCaseError) -> Self {
        match error {
            PortableCaseError::Validation(_) => Self::Validation,
            PortableCaseError::Configuration(_) => Self::Configuration,
            PortableCaseError::Store(_) => Self::Storage,
            PortableCaseError::Packaging(_) => Self::Packaging,
            PortableCaseError::AttributeKindMismatch(_)
            | PortableCaseError::UnsupportedValueType(_)
            | PortableCaseError::MissingTagMapping(_)
            | PortableCaseError::CycleDetected(_)
            | PortableCaseError::Copy(_)
            | PortableCaseError::Io(_) => Self::Copy,
            PortableCaseError::Serialization(_) | PortableCaseError::Other(_) => Self::Unknown,
        }
    }
}

/// Export error with context
#[derive(Debug, Clone, Serialize)]
pub struct ExportError {
    /// Type of error
    pub error_type: ExportErrorType,

    /// Error message
    pub message: String,

    /// Optional context (e.g., tag name, stage)
    pub context: Option<String>,
}

impl ExportError {
    pub fn new(error_type: ExportErrorType, message: String) -> Self {
        Self {
            error_type,
            message,
            context: None,
        }
    }

    pub fn from_error(error: &PortableCaseError) -> Self {
        Self::new(ExportErrorType::classify(error), error.to_string())
    }

    /// Add context to the error
    pub fn with_context(mut self, context: String) -> Self {
        self.context = Some(context);
        self
    }
}
