use crate::estimator::{estimate, PENDING_PERCENT};
use crate::request::ExportFormat;
use crate::status::{RunSummary, StatusSnapshot};
use crate::view_model::{ArtifactRowView, PanelViewModel, RunMetricsView};

/// Maximum number of status polls before the session gives up
/// (about ten minutes at the default two-second cadence).
pub const POLL_CEILING: u32 = 300;

/// Lifecycle of one interactive session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No job submitted yet, or state was reset.
    #[default]
    Idle,
    /// A job was accepted and is being polled.
    Polling,
    /// The job reported completion.
    Completed,
    /// The job failed, or submit/polling hit a fatal error.
    Failed,
    /// The poll ceiling was exceeded while the job was still in flight.
    TimedOut,
}

/// Estimated percentage plus poll bookkeeping for the active job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgressState {
    pub percent: u8,
    pub polls: u32,
}

/// Outcome of one artifact fetch during result presentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactOutcome {
    Saved { filename: String, size_label: String },
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactRow {
    pub format: ExportFormat,
    pub outcome: ArtifactOutcome,
}

/// The whole session state, private to one panel session. All transitions go
/// through [`crate::update`]; no field is mutated ad hoc by the front-end.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PanelState {
    session: SessionState,
    job_id: Option<String>,
    target_url: Option<String>,
    progress: ProgressState,
    activity: String,
    status_label: String,
    summary: Option<RunSummary>,
    artifacts: Vec<ArtifactRow>,
    sheets_upload_requested: bool,
    sheets_id: Option<String>,
    error: Option<String>,
    dirty: bool,
}

impl PanelState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> SessionState {
        self.session
    }

    pub fn job_id(&self) -> Option<&str> {
        self.job_id.as_deref()
    }

    pub fn target_url(&self) -> Option<&str> {
        self.target_url.as_deref()
    }

    pub fn progress(&self) -> ProgressState {
        self.progress
    }

    pub fn summary(&self) -> Option<&RunSummary> {
        self.summary.as_ref()
    }

    /// Tears the session down to a blank slate, ready for a new submission.
    pub fn reset(&mut self) {
        *self = Self {
            dirty: true,
            ..Self::default()
        };
    }

    pub(crate) fn record_submission(
        &mut self,
        url: String,
        sheets_upload: bool,
        sheets_id: Option<String>,
    ) {
        self.target_url = Some(url);
        self.sheets_upload_requested = sheets_upload;
        self.sheets_id = sheets_id.clone();
        self.activity = "Submitting scraping job".to_string();
        self.error = None;
        self.mark_dirty();
    }

    /// Transition on submit success: the job handle is pinned and progress
    /// starts at the pending floor with a fresh poll count.
    pub(crate) fn on_submit(&mut self, job_id: String) {
        self.session = SessionState::Polling;
        self.job_id = Some(job_id);
        self.progress = ProgressState {
            percent: PENDING_PERCENT,
            polls: 0,
        };
        self.activity = "Job accepted, waiting for first status".to_string();
        self.mark_dirty();
    }

    pub(crate) fn fail(&mut self, reason: String) {
        self.session = SessionState::Failed;
        self.progress.percent = 0;
        self.error = Some(reason);
        self.mark_dirty();
    }

    /// Applies one status snapshot: runs the estimator, advances the poll
    /// count and performs any terminal transition. Returns the session state
    /// after the snapshot so the caller can emit follow-up effects.
    pub(crate) fn apply_snapshot(&mut self, snapshot: &StatusSnapshot) -> SessionState {
        self.progress.polls += 1;
        self.progress.percent = estimate(
            self.progress.percent,
            &snapshot.status,
            snapshot.stage,
            &snapshot.message,
        );
        self.status_label = snapshot.status.label();
        if !snapshot.message.is_empty() {
            self.activity = snapshot.message.clone();
        }

        match &snapshot.status {
            crate::JobStatus::Completed => {
                self.session = SessionState::Completed;
                self.summary = snapshot.result.clone();
            }
            crate::JobStatus::Failed => {
                self.session = SessionState::Failed;
                self.error = Some(if snapshot.message.is_empty() {
                    "job failed".to_string()
                } else {
                    snapshot.message.clone()
                });
            }
            _ => {
                if self.progress.polls >= POLL_CEILING {
                    self.session = SessionState::TimedOut;
                    self.error = Some(
                        "poll ceiling exceeded; the job may still be running on the backend"
                            .to_string(),
                    );
                }
            }
        }
        self.mark_dirty();
        self.session
    }

    pub(crate) fn time_out(&mut self) {
        self.session = SessionState::TimedOut;
        self.error = Some(
            "poll ceiling exceeded; the job may still be running on the backend".to_string(),
        );
        self.mark_dirty();
    }

    pub(crate) fn record_artifact(&mut self, row: ArtifactRow) {
        self.artifacts.push(row);
        self.mark_dirty();
    }

    pub(crate) fn record_sheet_url(&mut self, url: Option<String>) {
        if let Some(summary) = self.summary.as_mut() {
            summary.sheet_url = url;
        }
        self.mark_dirty();
    }

    pub(crate) fn wants_sheet_upload(&self) -> bool {
        let already_uploaded = self
            .summary
            .as_ref()
            .is_some_and(|summary| summary.sheet_url.is_some());
        self.sheets_upload_requested && !already_uploaded
    }

    pub(crate) fn sheets_id(&self) -> Option<String> {
        self.sheets_id.clone()
    }

    pub(crate) fn set_error(&mut self, reason: String) {
        self.error = Some(reason);
        self.mark_dirty();
    }

    /// Recognized export formats from the completed job's file map, in stable
    /// order. Unknown tags are skipped silently.
    pub(crate) fn recognized_formats(&self) -> Vec<ExportFormat> {
        self.summary
            .as_ref()
            .map(|summary| {
                summary
                    .files
                    .keys()
                    .filter_map(|tag| ExportFormat::from_tag(tag))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn view(&self) -> PanelViewModel {
        let metrics = self.summary.as_ref().map(|summary| RunMetricsView {
            total_products: summary.total_products,
            pages_crawled: summary.pages_crawled,
            duration: summary.duration.clone().unwrap_or_else(|| "N/A".to_string()),
            file_count: summary.files.len(),
        });
        PanelViewModel {
            session: self.session,
            percent: self.progress.percent,
            polls: self.progress.polls,
            job_id: self.job_id.clone(),
            status_label: self.status_label.clone(),
            activity: self.activity.clone(),
            metrics,
            artifacts: self
                .artifacts
                .iter()
                .map(|row| ArtifactRowView::from_row(row))
                .collect(),
            sheet_url: self
                .summary
                .as_ref()
                .and_then(|summary| summary.sheet_url.clone()),
            error: self.error.clone(),
            dirty: self.dirty,
        }
    }

    pub fn consume_dirty(&mut self) -> bool {
        let was_dirty = self.dirty;
        self.dirty = false;
        was_dirty
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}
