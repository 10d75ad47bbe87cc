use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One error kind per logical operation. Network failures (timeout, DNS,
/// connection refused) are not distinguished from HTTP failures; both carry
/// a display string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),
    #[error("submit failed: {0}")]
    SubmitFailed(String),
    #[error("status fetch failed: {0}")]
    StatusFetchFailed(String),
    #[error("download failed for {format}: {reason}")]
    DownloadFailed { format: String, reason: String },
    #[error("sheet upload failed: {0}")]
    SheetUploadFailed(String),
    #[error("recommendation failed: {0}")]
    RecommendFailed(String),
}

/// Base URL plus fixed per-operation timeouts. No operation retries at this
/// layer; each call succeeds once within its timeout or fails.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub health_timeout: Duration,
    pub features_timeout: Duration,
    pub submit_timeout: Duration,
    pub status_timeout: Duration,
    pub download_timeout: Duration,
    pub sheet_timeout: Duration,
    pub recommend_timeout: Duration,
    pub max_download_bytes: u64,
}

impl ClientSettings {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            health_timeout: Duration::from_secs(5),
            features_timeout: Duration::from_secs(5),
            submit_timeout: Duration::from_secs(10),
            status_timeout: Duration::from_secs(5),
            download_timeout: Duration::from_secs(30),
            sheet_timeout: Duration::from_secs(30),
            recommend_timeout: Duration::from_secs(10),
            max_download_bytes: 64 * 1024 * 1024,
        }
    }
}

/// Cadence and limits of the background status watch.
#[derive(Debug, Clone)]
pub struct PollSettings {
    /// Sleep between successful polls.
    pub interval: Duration,
    /// Maximum number of status fetches before giving up.
    pub ceiling: u32,
    /// Consecutive fetch failures tolerated before the watch turns fatal.
    pub max_retries: u32,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            ceiling: 300,
            max_retries: 3,
        }
    }
}

/// Opaque backend-assigned job identifier. Never reused across submissions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle {
    pub id: String,
}

/// Output encodings the panel knows how to label and save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Json,
    Csv,
    CsvPrices,
    Quotation,
}

impl ExportKind {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "json" => Some(ExportKind::Json),
            "csv" => Some(ExportKind::Csv),
            "csv_prices" => Some(ExportKind::CsvPrices),
            "quotation" => Some(ExportKind::Quotation),
            _ => None,
        }
    }

    /// Path segment of the download endpoint.
    pub fn tag(&self) -> &'static str {
        match self {
            ExportKind::Json => "json",
            ExportKind::Csv => "csv",
            ExportKind::CsvPrices => "csv_prices",
            ExportKind::Quotation => "quotation",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportKind::Json => ".json",
            ExportKind::Csv => ".csv",
            ExportKind::CsvPrices => "_with_prices.csv",
            ExportKind::Quotation => "_quotation.json",
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            ExportKind::Json | ExportKind::Quotation => "application/json",
            ExportKind::Csv | ExportKind::CsvPrices => "text/csv",
        }
    }
}

/// Request body for `POST /scrape`, sent as-is.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScrapePayload {
    pub url: String,
    pub max_pages: u32,
    pub max_depth: u32,
    pub crawl_delay: f64,
    pub export_formats: Vec<String>,
    pub strictness: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crawler: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scraper: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub force_ai: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optimize: Option<bool>,
    pub google_sheets_upload: bool,
    pub google_sheets_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubmitAck {
    #[serde(default)]
    pub job_id: Option<String>,
}

/// One poll result as reported by `GET /jobs/{id}`. Status and stage stay
/// raw tags here; interpretation belongs to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSnapshot {
    pub status_tag: String,
    pub message: String,
    pub stage_tag: Option<String>,
    pub result: Option<JobResult>,
}

impl JobSnapshot {
    pub fn is_terminal(&self) -> bool {
        matches!(self.status_tag.as_str(), "completed" | "failed")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobResult {
    pub files: BTreeMap<String, String>,
    pub total_products: u64,
    pub pages_crawled: u64,
    pub duration: Option<String>,
    pub sheet_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusBody {
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub progress: Option<ProgressBody>,
    #[serde(default)]
    pub result: Option<ResultBody>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProgressBody {
    #[serde(default)]
    pub stage: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResultBody {
    #[serde(default)]
    pub files: BTreeMap<String, String>,
    #[serde(default)]
    pub total_products: u64,
    #[serde(default)]
    pub pages_crawled: u64,
    #[serde(default)]
    pub duration: Option<serde_json::Value>,
    #[serde(default)]
    pub google_sheets: Option<SheetsResultBody>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SheetsResultBody {
    #[serde(default)]
    pub url: Option<String>,
}

impl From<StatusBody> for JobSnapshot {
    fn from(body: StatusBody) -> Self {
        let result = body.result.map(|result| JobResult {
            files: result.files,
            total_products: result.total_products,
            pages_crawled: result.pages_crawled,
            // The backend is loose here: some revisions send "73s", others a
            // raw number of seconds.
            duration: result.duration.map(|value| match value {
                serde_json::Value::String(text) => text,
                other => other.to_string(),
            }),
            sheet_url: result.google_sheets.and_then(|sheets| sheets.url),
        });
        Self {
            status_tag: body.status,
            message: body.message,
            stage_tag: body.progress.and_then(|progress| progress.stage),
            result,
        }
    }
}

/// Backend feature switches from `GET /features`. Everything defaults to
/// disabled when the endpoint is unreachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeatureFlags {
    pub google_sheets: bool,
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct FeaturesBody {
    #[serde(default)]
    pub google_sheets: FeatureToggleBody,
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct FeatureToggleBody {
    #[serde(default)]
    pub enabled: bool,
}

/// Request body for `POST /google-sheets/upload`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetUploadPayload {
    pub job_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spreadsheet_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spreadsheet_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_prices: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SheetUploadOutcome {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub url: Option<String>,
}

/// Crawler/scraper suggestion from `POST /recommend`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct Recommendation {
    #[serde(default)]
    pub crawler: Option<String>,
    #[serde(default)]
    pub scraper: Option<String>,
    #[serde(default)]
    pub strictness: Option<String>,
    #[serde(default)]
    pub reasoning: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RecommendBody {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub recommendation: Option<Recommendation>,
}
