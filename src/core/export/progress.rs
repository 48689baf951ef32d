//! Progress and cancellation surface of an export
//!
//! The panel is shared between the caller (who may cancel) and the export
//! task (which reports progress and polls for cancellation between steps).
//! Every change is published on a watch channel.

use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::watch;

/// Lifecycle of an export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Queuing,
    Running,
    Complete,
    Canceled,
    Error,
}

impl ReportStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Canceled | Self::Error)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Queuing => "queuing",
            Self::Running => "running",
            Self::Complete => "complete",
            Self::Canceled => "canceled",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressSnapshot {
    pub status: ReportStatus,
    pub message: String,
    pub max: u64,
    pub value: u64,
    pub indeterminate: bool,
}

impl Default for ProgressSnapshot {
    fn default() -> Self {
        Self {
            status: ReportStatus::Queuing,
            message: String::new(),
            max: 0,
            value: 0,
            indeterminate: true,
        }
    }
}

pub struct ProgressPanel {
    tx: watch::Sender<ProgressSnapshot>,
    cancelled: AtomicBool,
}

impl ProgressPanel {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ProgressSnapshot::default());
        Self {
            tx,
            cancelled: AtomicBool::new(false),
        }
    }

    /// Moves a queued export to `Running`
    pub fn start(&self) {
        self.tx.send_modify(|s| {
            if s.status == ReportStatus::Queuing {
                s.status = ReportStatus::Running;
            }
        });
        tracing::info!("Export started");
    }

    pub fn update_status(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!(status = %message, "Export status");
        self.tx.send_modify(|s| s.message = message);
    }

    /// Switches to determinate progress over `max` steps
    pub fn set_max(&self, max: u64) {
        self.tx.send_modify(|s| {
            s.max = max;
            s.value = 0;
            s.indeterminate = false;
        });
    }

    pub fn increment(&self) {
        self.tx.send_modify(|s| s.value = s.value.saturating_add(1));
    }

    pub fn set_indeterminate(&self, indeterminate: bool) {
        self.tx.send_modify(|s| s.indeterminate = indeterminate);
    }

    /// Sets the terminal status; a cancelled export stays cancelled
    pub fn complete(&self, status: ReportStatus) {
        self.tx.send_modify(|s| {
            if s.status == ReportStatus::Canceled {
                return;
            }
            s.status = status;
            if status == ReportStatus::Complete {
                s.value = s.max;
            }
        });
        tracing::info!(status = %self.status(), "Export finished");
    }

    pub fn complete_with_message(&self, status: ReportStatus, message: impl Into<String>) {
        let message = message.into();
        self.tx.send_modify(|s| s.message = message);
        self.complete(status);
    }

    /// Requests cancellation; the export stops at its next check
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.tx.send_modify(|s| {
            if !s.status.is_terminal() {
                s.status = ReportStatus::Canceled;
            }
        });
        tracing::warn!("Export cancellation requested");
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Resolves once the export has been cancelled
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        let _ = rx
            .wait_for(|s| s.status == ReportStatus::Canceled)
            .await;
    }

    pub fn subscribe(&self) -> watch::Receiver<ProgressSnapshot> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        self.tx.borrow().clone()
    }

    pub fn status(&self) -> ReportStatus {
        self.tx.borrow().status
    }
}

impl Default for ProgressPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ProgressPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressPanel")
            .field("snapshot", &self.snapshot())
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
