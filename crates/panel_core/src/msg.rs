use crate::request::ExportFormat;
use crate::status::StatusSnapshot;

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User submitted the configuration form.
    SubmitRequested(crate::JobRequest),
    /// Backend accepted the job and returned a handle.
    SubmitSucceeded { job_id: String },
    /// Health check or submit call failed; the whole operation aborts.
    SubmitFailed { reason: String },
    /// One poll result for the active job.
    SnapshotArrived(StatusSnapshot),
    /// Polling hit a fatal error after the retry budget was spent.
    PollFailed { reason: String },
    /// The poller gave up after the configured ceiling.
    PollTimedOut,
    /// One result artifact was downloaded and saved.
    ArtifactSaved {
        format: ExportFormat,
        filename: String,
        size_label: String,
    },
    /// One result artifact could not be fetched. Non-fatal; remaining
    /// formats are still presented.
    ArtifactFailed { format: ExportFormat, reason: String },
    /// Post-hoc spreadsheet upload finished.
    SheetUploadFinished { success: bool, url: Option<String> },
    /// User asked to discard the session and start over.
    ResetRequested,
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
