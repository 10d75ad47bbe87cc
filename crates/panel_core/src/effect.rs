use crate::request::{ExportFormat, JobRequest};

/// Parameters for a post-hoc spreadsheet upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetUploadRequest {
    pub job_id: String,
    pub spreadsheet_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// POST the job to the backend.
    Submit(JobRequest),
    /// Begin the background status poll for an accepted job.
    StartPolling { job_id: String },
    /// Stop the background poll; terminal states never resume it.
    StopPolling,
    /// Download every recognized artifact of a completed job.
    FetchArtifacts {
        job_id: String,
        formats: Vec<ExportFormat>,
    },
    /// Upload completed results to a spreadsheet.
    UploadToSheet(SheetUploadRequest),
}
