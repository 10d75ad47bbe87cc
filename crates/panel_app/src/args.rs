use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use panel_core::{CrawlerKind, ExportFormat, JobRequest, ScraperKind, Strictness};

#[derive(Debug, Parser)]
#[command(name = "panel", about = "Control panel for the catalog scraping backend")]
pub struct PanelArgs {
    /// Base URL of the scraping backend.
    #[arg(long, global = true, default_value = "http://localhost:8000")]
    pub base_url: String,

    /// Where log lines go.
    #[arg(long, global = true, value_enum, default_value_t = LogArg::File)]
    pub log: LogArg,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Submit a scraping job and watch it to completion.
    Run(RunArgs),
    /// Check whether the backend is reachable.
    Health,
    /// Ask the backend for crawler/scraper settings for a site.
    Recommend(RecommendArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Target site URL.
    pub url: String,

    /// Directory downloaded artifacts are written into.
    #[arg(long, default_value = "output")]
    pub output_dir: PathBuf,

    #[arg(long, default_value_t = 25)]
    pub max_pages: u32,

    #[arg(long, default_value_t = 3)]
    pub max_depth: u32,

    /// Seconds between page fetches on the backend crawler.
    #[arg(long, default_value_t = 0.5)]
    pub crawl_delay: f64,

    #[arg(long, value_enum, default_value_t = StrictnessArg::Balanced)]
    pub strictness: StrictnessArg,

    /// Export formats to request and download.
    #[arg(long, value_enum, value_delimiter = ',', default_values_t = [FormatArg::Json])]
    pub formats: Vec<FormatArg>,

    #[arg(long, value_enum)]
    pub crawler: Option<CrawlerArg>,

    #[arg(long, value_enum)]
    pub scraper: Option<ScraperArg>,

    /// Force AI extraction even where heuristics would do.
    #[arg(long)]
    pub force_ai: bool,

    /// Free-text description of what to extract, forwarded to the backend.
    #[arg(long)]
    pub intent: Option<String>,

    /// Let the backend tune crawl settings for the site.
    #[arg(long)]
    pub optimize: bool,

    /// Upload results to Google Sheets after completion.
    #[arg(long)]
    pub sheets_upload: bool,

    /// Existing spreadsheet to upload into; omitted creates a new one.
    #[arg(long)]
    pub sheets_id: Option<String>,
}

#[derive(Debug, Args)]
pub struct RecommendArgs {
    /// Target site URL.
    pub url: String,

    /// What the extraction should focus on.
    #[arg(long, default_value = "product catalog")]
    pub intent: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogArg {
    File,
    Terminal,
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrictnessArg {
    Lenient,
    Balanced,
    Strict,
}

impl From<StrictnessArg> for Strictness {
    fn from(arg: StrictnessArg) -> Self {
        match arg {
            StrictnessArg::Lenient => Strictness::Lenient,
            StrictnessArg::Balanced => Strictness::Balanced,
            StrictnessArg::Strict => Strictness::Strict,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Json,
    Csv,
    CsvPrices,
    Quotation,
}

impl From<FormatArg> for ExportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Json => ExportFormat::Json,
            FormatArg::Csv => ExportFormat::Csv,
            FormatArg::CsvPrices => ExportFormat::CsvPrices,
            FormatArg::Quotation => ExportFormat::Quotation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CrawlerArg {
    Auto,
    Static,
    Dynamic,
}

impl From<CrawlerArg> for CrawlerKind {
    fn from(arg: CrawlerArg) -> Self {
        match arg {
            CrawlerArg::Auto => CrawlerKind::Auto,
            CrawlerArg::Static => CrawlerKind::Static,
            CrawlerArg::Dynamic => CrawlerKind::Dynamic,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScraperArg {
    Auto,
    Heuristic,
    Ai,
}

impl From<ScraperArg> for ScraperKind {
    fn from(arg: ScraperArg) -> Self {
        match arg {
            ScraperArg::Auto => ScraperKind::Auto,
            ScraperArg::Heuristic => ScraperKind::Heuristic,
            ScraperArg::Ai => ScraperKind::Ai,
        }
    }
}

impl RunArgs {
    /// Builds the core request; validation happens in the update loop.
    pub fn to_request(&self) -> JobRequest {
        let mut request = JobRequest::new(&self.url);
        request.max_pages = self.max_pages;
        request.max_depth = self.max_depth;
        request.crawl_delay = self.crawl_delay;
        request.strictness = self.strictness.into();
        request.export_formats = self.formats.iter().map(|&f| f.into()).collect();
        request.crawler = self.crawler.map(Into::into);
        request.scraper = self.scraper.map(Into::into);
        request.force_ai = self.force_ai.then_some(true);
        request.intent = self.intent.clone();
        request.optimize = self.optimize.then_some(true);
        request.sheets_upload = self.sheets_upload;
        request.sheets_id = self.sheets_id.clone();
        request
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn run_defaults_match_the_core_request_defaults() {
        let args = PanelArgs::parse_from(["panel", "run", "https://shop.example"]);
        let Command::Run(run) = args.command else {
            panic!("expected run command");
        };
        let request = run.to_request();
        assert_eq!(request, JobRequest::new("https://shop.example"));
    }

    #[test]
    fn formats_parse_as_a_comma_list() {
        let args = PanelArgs::parse_from([
            "panel",
            "run",
            "https://shop.example",
            "--formats",
            "json,csv-prices",
        ]);
        let Command::Run(run) = args.command else {
            panic!("expected run command");
        };
        assert_eq!(
            run.to_request().export_formats,
            vec![ExportFormat::Json, ExportFormat::CsvPrices]
        );
    }

    #[test]
    fn sheets_flags_are_forwarded() {
        let args = PanelArgs::parse_from([
            "panel",
            "run",
            "https://shop.example",
            "--sheets-upload",
            "--sheets-id",
            "sheet-1",
        ]);
        let Command::Run(run) = args.command else {
            panic!("expected run command");
        };
        let request = run.to_request();
        assert!(request.sheets_upload);
        assert_eq!(request.sheets_id.as_deref(), Some("sheet-1"));
    }
}
