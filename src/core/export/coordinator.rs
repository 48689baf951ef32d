//! Export coordinator - main orchestrator for the export process
//!
//! Resolves the selection, builds the portable case on a blocking task,
//! optionally packages it, and is the single place that decides the terminal
//! status of an export.

use crate::adapters::archive::{Archiver, SevenZipArchiver};
use crate::adapters::database::{create_portable_case, open_source_case, SourceCase};
use crate::config::PortableCaseConfig;
use crate::core::copy::{
    copy_artifact_tag, copy_content_tag, copy_interesting_item, copy_tag_definitions,
};
use crate::core::export::layout::CaseLayout;
use crate::core::export::package::{package_case, PackagingOutcome};
use crate::core::export::progress::{ProgressPanel, ReportStatus};
use crate::core::export::selection::{Selection, WorkList};
use crate::core::export::summary::ExportSummary;
use crate::core::session::{CopyStats, ExportSession};
use crate::core::state::record_baseline;
use crate::domain::context::ResultExt;
use crate::domain::{PortableCaseError, Result};
use crate::{log_copy_progress, log_error_with_context, log_export_complete, log_export_start};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Export coordinator
pub struct ExportCoordinator {
    config: PortableCaseConfig,
    source: Arc<dyn SourceCase>,
    archiver: Arc<dyn Archiver>,
    progress: Arc<ProgressPanel>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PipelineFlow {
    Finished,
    Cancelled,
}

struct CaseBuild {
    stats: CopyStats,
    flow: PipelineFlow,
}

#[derive(Serialize)]
struct CaseMetadata<'a> {
    case_name: &'a str,
    source_case: &'a Path,
    created: DateTime<Utc>,
    tool_version: &'static str,
    counts: &'a CopyStats,
}

impl ExportCoordinator {
    /// Opens the configured source case and sets up the 7-Zip archiver
    ///
    /// # Errors
    ///
    /// Returns an error if the source case cannot be opened.
    pub fn new(config: PortableCaseConfig) -> Result<Self> {
        let source = open_source_case(&config.source.case_database)?;
        let archiver: Arc<dyn Archiver> = Arc::new(SevenZipArchiver::from_config(&config.packaging));
        Ok(Self::from_parts(
            config,
            source,
            archiver,
            Arc::new(ProgressPanel::new()),
        ))
    }

    pub fn from_parts(
        config: PortableCaseConfig,
        source: Arc<dyn SourceCase>,
        archiver: Arc<dyn Archiver>,
        progress: Arc<ProgressPanel>,
    ) -> Self {
        Self {
            config,
            source,
            archiver,
            progress,
        }
    }

    /// Handle for reporting progress and requesting cancellation
    pub fn progress(&self) -> Arc<ProgressPanel> {
        Arc::clone(&self.progress)
    }

    /// Execute the export
    ///
    /// 1. Validates the output directory and resolves the selection
    /// 2. Creates the case folder and portable case database
    /// 3. Records the schema baseline
    /// 4. Copies tag definitions, tagged content, tagged results and
    ///    interesting items
    /// 5. Creates the reports folder and writes `case.json`
    /// 6. Compresses the case if requested
    ///
    /// A cancelled export returns `Ok` with status `Canceled`.
    ///
    /// # Errors
    ///
    /// Validation failures happen before anything is created. Any later
    /// failure leaves the partially built case folder in place and sets the
    /// progress status to `Error`.
    pub async fn execute_export(&self) -> Result<ExportSummary> {
        let start_time = Instant::now();
        self.progress.start();

        match self.run(start_time).await {
            Ok(summary) => {
                summary.log_summary();
                Ok(summary)
            }
            Err(e) => {
                log_error_with_context!(&e, "Portable case export failed");
                self.progress
                    .complete_with_message(ReportStatus::Error, e.to_string());
                Err(e)
            }
        }
    }

    async fn run(&self, start_time: Instant) -> Result<ExportSummary> {
        let case_name = match &self.config.source.case_name {
            Some(name) => name.clone(),
            None => self.source.display_name()?,
        };
        let layout = CaseLayout::new(&self.config.output.directory, &case_name);
        layout.validate_output()?;

        let build = {
            let source = Arc::clone(&self.source);
            let progress = Arc::clone(&self.progress);
            let layout = layout.clone();
            let selection = Selection::from_config(&self.config.selection);
            let source_path = self.config.source.case_database.clone();
            tokio::task::spawn_blocking(move || {
                build_case(source, layout, selection, progress, source_path)
            })
            .await
            .map_err(|e| PortableCaseError::Other(format!("Export task failed: {e}")))??
        };

        let mut summary = ExportSummary::new(layout.case_name(), layout.case_dir());
        summary.counts = build.stats;

        if build.flow == PipelineFlow::Cancelled {
            self.progress.complete(ReportStatus::Canceled);
            return Ok(summary
                .with_status(ReportStatus::Canceled)
                .with_duration(start_time.elapsed()));
        }

        if self.config.packaging.compress {
            let outcome = package_case(
                self.archiver.as_ref(),
                &layout,
                self.config.packaging.chunk_size,
                &self.progress,
            )
            .await?;
            match outcome {
                PackagingOutcome::Packaged(_) => summary.compressed = true,
                PackagingOutcome::Cancelled => {
                    self.progress.complete(ReportStatus::Canceled);
                    return Ok(summary
                        .with_status(ReportStatus::Canceled)
                        .with_duration(start_time.elapsed()));
                }
            }
        }

        self.progress.complete(ReportStatus::Complete);
        let duration = start_time.elapsed();
        log_export_complete!(summary.counts.files, summary.counts.artifacts, duration);
        Ok(summary
            .with_status(self.progress.status())
            .with_duration(duration))
    }
}

/// Builds the portable case; runs on a blocking task
fn build_case(
    source: Arc<dyn SourceCase>,
    layout: CaseLayout,
    selection: Selection,
    progress: Arc<ProgressPanel>,
    source_path: PathBuf,
) -> Result<CaseBuild> {
    progress.update_status("Resolving selection");
    let work = selection.resolve(source.as_ref())?;
    log_export_start!(layout.case_name(), work.tags.len(), work.interesting.len());

    if progress.is_cancelled() {
        return Ok(CaseBuild {
            stats: CopyStats::default(),
            flow: PipelineFlow::Cancelled,
        });
    }

    progress.update_status("Creating case");
    layout.create_directories()?;
    let store = create_portable_case(&layout.database_path(), layout.case_name())?;

    let mut session = ExportSession::new(source, store, layout, Arc::clone(&progress));
    let outcome = run_pipeline(&mut session, &work, &progress, &source_path);
    let stats = session.stats();
    let closed = session.teardown();

    match (outcome, closed) {
        (Err(e), closed) => {
            if let Err(close_err) = closed {
                tracing::warn!(error = %close_err, "Failed to close portable case after error");
            }
            Err(e)
        }
        (Ok(_), Err(e)) => Err(e),
        (Ok(flow), Ok(())) => Ok(CaseBuild { stats, flow }),
    }
}

fn run_pipeline(
    session: &mut ExportSession,
    work: &WorkList,
    progress: &ProgressPanel,
    source_path: &Path,
) -> Result<PipelineFlow> {
    let source = session.source();
    let store = session.store()?;
    record_baseline(source.as_ref(), store.as_ref()).context("Failed to record schema baseline")?;
    store.ensure_image_tag_table()?;

    let total = work.total_items();
    progress.set_max(total as u64);
    copy_tag_definitions(session, &work.definitions())?;

    let mut done = 0usize;
    for tag in &work.tags {
        let tag_name = &tag.definition.display_name;

        progress.update_status(format!("Copying files tagged as {tag_name}"));
        for content_tag in &tag.content_tags {
            if progress.is_cancelled() {
                return Ok(PipelineFlow::Cancelled);
            }
            copy_content_tag(session, content_tag).with_context(|| {
                format!("Failed to copy content tag {} ({tag_name})", content_tag.id)
            })?;
            progress.increment();
            done += 1;
            log_copy_progress!(tag_name, done, total);
        }

        progress.update_status(format!("Copying results tagged as {tag_name}"));
        for artifact_tag in &tag.artifact_tags {
            if progress.is_cancelled() {
                return Ok(PipelineFlow::Cancelled);
            }
            copy_artifact_tag(session, artifact_tag).with_context(|| {
                format!("Failed to copy artifact tag {} ({tag_name})", artifact_tag.id)
            })?;
            progress.increment();
            done += 1;
            log_copy_progress!(tag_name, done, total);
        }
    }

    if !work.interesting.is_empty() {
        progress.update_status("Copying interesting items");
        for artifact in &work.interesting {
            if progress.is_cancelled() {
                return Ok(PipelineFlow::Cancelled);
            }
            copy_interesting_item(session, artifact).with_context(|| {
                format!("Failed to copy interesting item {}", artifact.id)
            })?;
            progress.increment();
            done += 1;
            log_copy_progress!("interesting items", done, total);
        }
    }

    if progress.is_cancelled() {
        return Ok(PipelineFlow::Cancelled);
    }

    progress.update_status("Creating reports folder");
    session.layout().create_reports_dir()?;
    write_case_metadata(session.layout(), source_path, &session.stats())?;
    Ok(PipelineFlow::Finished)
}

fn write_case_metadata(layout: &CaseLayout, source_case: &Path, counts: &CopyStats) -> Result<()> {
    let metadata = CaseMetadata {
        case_name: layout.case_name(),
        source_case,
        created: Utc::now(),
        tool_version: env!("CARGO_PKG_VERSION"),
        counts,
    };
    let json = serde_json::to_string_pretty(&metadata)?;
    let path = layout.metadata_path();
    std::fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))
}
