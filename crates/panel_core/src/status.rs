use std::collections::BTreeMap;

/// Backend-reported lifecycle of a job. The heuristic table is not exhaustive
/// over everything a backend may report, so unknown values are carried as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Running,
    Exporting,
    Completed,
    Failed,
    Other(String),
}

impl JobStatus {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "pending" => JobStatus::Pending,
            "running" => JobStatus::Running,
            "exporting" => JobStatus::Exporting,
            "completed" => JobStatus::Completed,
            "failed" => JobStatus::Failed,
            other => JobStatus::Other(other.to_string()),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    /// Human-readable label, e.g. `in_review` becomes `In Review`.
    pub fn label(&self) -> String {
        let tag = match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Exporting => "exporting",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Other(tag) => tag.as_str(),
        };
        tag.split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Structured progress stage, when the backend reports one. Preferred over
/// message pattern-matching by the estimator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageHint {
    Crawling,
    Scraping,
    Uploading,
    Exporting,
}

impl StageHint {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "crawling" | "discovery" => Some(StageHint::Crawling),
            "scraping" => Some(StageHint::Scraping),
            "uploading" => Some(StageHint::Uploading),
            "exporting" => Some(StageHint::Exporting),
            _ => None,
        }
    }
}

/// Result summary attached to a completed job.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunSummary {
    /// Format tag to backend-side path. BTreeMap keeps download order stable.
    pub files: BTreeMap<String, String>,
    pub total_products: u64,
    pub pages_crawled: u64,
    pub duration: Option<String>,
    pub sheet_url: Option<String>,
}

/// One poll result. Replaced wholesale on every poll, never merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub status: JobStatus,
    pub message: String,
    pub stage: Option<StageHint>,
    pub result: Option<RunSummary>,
}

impl StatusSnapshot {
    pub fn new(status: JobStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            stage: None,
            result: None,
        }
    }
}
