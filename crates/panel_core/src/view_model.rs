use crate::state::{ArtifactOutcome, ArtifactRow, SessionState};
use crate::ExportFormat;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PanelViewModel {
    pub session: SessionState,
    pub percent: u8,
    pub polls: u32,
    pub job_id: Option<String>,
    pub status_label: String,
    pub activity: String,
    pub metrics: Option<RunMetricsView>,
    pub artifacts: Vec<ArtifactRowView>,
    pub sheet_url: Option<String>,
    pub error: Option<String>,
    pub dirty: bool,
}

/// Headline numbers of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunMetricsView {
    pub total_products: u64,
    pub pages_crawled: u64,
    pub duration: String,
    pub file_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactRowView {
    pub format: ExportFormat,
    pub label: &'static str,
    pub filename: Option<String>,
    pub size_label: Option<String>,
    pub failure: Option<String>,
}

impl ArtifactRowView {
    pub(crate) fn from_row(row: &ArtifactRow) -> Self {
        match &row.outcome {
            ArtifactOutcome::Saved {
                filename,
                size_label,
            } => Self {
                format: row.format,
                label: row.format.label(),
                filename: Some(filename.clone()),
                size_label: Some(size_label.clone()),
                failure: None,
            },
            ArtifactOutcome::Failed { reason } => Self {
                format: row.format,
                label: row.format.label(),
                filename: None,
                size_label: None,
                failure: Some(reason.clone()),
            },
        }
    }
}
