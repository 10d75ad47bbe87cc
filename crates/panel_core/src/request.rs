use std::fmt;

use url::Url;

/// Recall/precision trade-off of the backend extraction. Opaque to the panel
/// beyond being forwarded with the job request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strictness {
    Lenient,
    #[default]
    Balanced,
    Strict,
}

impl Strictness {
    pub fn tag(&self) -> &'static str {
        match self {
            Strictness::Lenient => "lenient",
            Strictness::Balanced => "balanced",
            Strictness::Strict => "strict",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Strictness::Lenient => "Captures more products, may include some noise",
            Strictness::Balanced => "Optimal balance of coverage and accuracy",
            Strictness::Strict => "High precision, may miss some products",
        }
    }
}

/// Output encodings the backend can produce per job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ExportFormat {
    Json,
    Csv,
    CsvPrices,
    Quotation,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 4] = [
        ExportFormat::Json,
        ExportFormat::Csv,
        ExportFormat::CsvPrices,
        ExportFormat::Quotation,
    ];

    /// Parses a backend file-map tag. Unknown tags yield `None` so callers
    /// can skip formats this panel does not know how to label.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "json" => Some(ExportFormat::Json),
            "csv" => Some(ExportFormat::Csv),
            "csv_prices" => Some(ExportFormat::CsvPrices),
            "quotation" => Some(ExportFormat::Quotation),
            _ => None,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::CsvPrices => "csv_prices",
            ExportFormat::Quotation => "quotation",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExportFormat::Json => "JSON Export",
            ExportFormat::Csv => "CSV Export",
            ExportFormat::CsvPrices => "Prices CSV",
            ExportFormat::Quotation => "Quotation",
        }
    }
}

/// Crawler selector forwarded to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlerKind {
    Auto,
    Static,
    Dynamic,
}

impl CrawlerKind {
    pub fn tag(&self) -> &'static str {
        match self {
            CrawlerKind::Auto => "auto",
            CrawlerKind::Static => "static",
            CrawlerKind::Dynamic => "dynamic",
        }
    }
}

/// Scraper selector forwarded to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScraperKind {
    Auto,
    Heuristic,
    Ai,
}

impl ScraperKind {
    pub fn tag(&self) -> &'static str {
        match self {
            ScraperKind::Auto => "auto",
            ScraperKind::Heuristic => "heuristic",
            ScraperKind::Ai => "ai",
        }
    }
}

pub const MAX_PAGES_RANGE: std::ops::RangeInclusive<u32> = 10..=300;
pub const MAX_DEPTH_RANGE: std::ops::RangeInclusive<u32> = 1..=5;
pub const CRAWL_DELAY_RANGE: std::ops::RangeInclusive<f64> = 0.1..=5.0;

/// One job submission. Constructed once, immutable after send.
#[derive(Debug, Clone, PartialEq)]
pub struct JobRequest {
    pub url: String,
    pub max_pages: u32,
    pub max_depth: u32,
    pub crawl_delay: f64,
    pub strictness: Strictness,
    pub export_formats: Vec<ExportFormat>,
    pub crawler: Option<CrawlerKind>,
    pub scraper: Option<ScraperKind>,
    pub force_ai: Option<bool>,
    pub intent: Option<String>,
    pub optimize: Option<bool>,
    pub sheets_upload: bool,
    pub sheets_id: Option<String>,
}

impl JobRequest {
    /// A request with the panel's default crawl limits and JSON export.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_pages: 25,
            max_depth: 3,
            crawl_delay: 0.5,
            strictness: Strictness::Balanced,
            export_formats: vec![ExportFormat::Json],
            crawler: None,
            scraper: None,
            force_ai: None,
            intent: None,
            optimize: None,
            sheets_upload: false,
            sheets_id: None,
        }
    }

    /// Checks the request before any network call is made.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let parsed = Url::parse(&self.url)
            .map_err(|err| ValidationError::InvalidUrl(err.to_string()))?;
        match parsed.scheme() {
            "http" | "https" => {}
            other => return Err(ValidationError::UnsupportedScheme(other.to_string())),
        }
        if self.export_formats.is_empty() {
            return Err(ValidationError::NoExportFormats);
        }
        if !MAX_PAGES_RANGE.contains(&self.max_pages) {
            return Err(ValidationError::MaxPagesOutOfRange(self.max_pages));
        }
        if !MAX_DEPTH_RANGE.contains(&self.max_depth) {
            return Err(ValidationError::MaxDepthOutOfRange(self.max_depth));
        }
        if !CRAWL_DELAY_RANGE.contains(&self.crawl_delay) {
            return Err(ValidationError::CrawlDelayOutOfRange(self.crawl_delay));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    InvalidUrl(String),
    UnsupportedScheme(String),
    NoExportFormats,
    MaxPagesOutOfRange(u32),
    MaxDepthOutOfRange(u32),
    CrawlDelayOutOfRange(f64),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidUrl(err) => write!(f, "invalid url: {err}"),
            ValidationError::UnsupportedScheme(scheme) => {
                write!(f, "unsupported url scheme '{scheme}' (expected http or https)")
            }
            ValidationError::NoExportFormats => {
                write!(f, "at least one export format must be selected")
            }
            ValidationError::MaxPagesOutOfRange(value) => {
                write!(f, "max pages {value} outside {:?}", MAX_PAGES_RANGE)
            }
            ValidationError::MaxDepthOutOfRange(value) => {
                write!(f, "max depth {value} outside {:?}", MAX_DEPTH_RANGE)
            }
            ValidationError::CrawlDelayOutOfRange(value) => {
                write!(f, "crawl delay {value} outside {:?}", CRAWL_DELAY_RANGE)
            }
        }
    }
}
