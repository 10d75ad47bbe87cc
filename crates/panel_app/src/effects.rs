use std::path::PathBuf;

use panel_client::{
    BackendHandle, ExportKind, JobResult, JobSnapshot, PanelEvent, ScrapePayload,
    SheetUploadPayload,
};
use panel_core::{
    Effect, ExportFormat, JobRequest, JobStatus, Msg, RunSummary, StageHint, StatusSnapshot,
};
use panel_logging::panel_warn;

/// Executes update-loop effects against the backend worker and translates
/// its events back into messages.
pub struct EffectRunner {
    handle: BackendHandle,
    output_dir: PathBuf,
}

impl EffectRunner {
    pub fn new(handle: BackendHandle, output_dir: PathBuf) -> Self {
        Self { handle, output_dir }
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Submit(request) => {
                    self.handle.submit(scrape_payload(&request));
                }
                Effect::StartPolling { job_id } => {
                    self.handle.watch(job_id);
                }
                Effect::StopPolling => {
                    self.handle.stop_watch();
                }
                Effect::FetchArtifacts { job_id, formats } => {
                    for format in formats {
                        self.handle.fetch_artifact(
                            job_id.clone(),
                            export_kind(format),
                            self.output_dir.clone(),
                        );
                    }
                }
                Effect::UploadToSheet(request) => {
                    self.handle.upload_sheet(SheetUploadPayload {
                        job_id: request.job_id,
                        spreadsheet_id: request.spreadsheet_id,
                        spreadsheet_title: None,
                        include_prices: Some(true),
                    });
                }
            }
        }
    }

    pub fn try_recv(&self) -> Option<PanelEvent> {
        self.handle.try_recv()
    }
}

/// Backend worker events that feed the update loop. Health and feature
/// events are consumed before the loop starts and map to nothing here.
pub fn map_event(event: PanelEvent) -> Option<Msg> {
    match event {
        PanelEvent::Submitted(Ok(job)) => Some(Msg::SubmitSucceeded { job_id: job.id }),
        PanelEvent::Submitted(Err(err)) => Some(Msg::SubmitFailed {
            reason: err.to_string(),
        }),
        PanelEvent::Snapshot { snapshot, .. } => {
            Some(Msg::SnapshotArrived(core_snapshot(snapshot)))
        }
        PanelEvent::WatchFailed { error, .. } => Some(Msg::PollFailed {
            reason: error.to_string(),
        }),
        PanelEvent::WatchTimedOut { .. } => Some(Msg::PollTimedOut),
        PanelEvent::ArtifactFetched { kind, result } => Some(match result {
            Ok(saved) => Msg::ArtifactSaved {
                format: export_format(kind),
                filename: saved.filename,
                size_label: saved.size_label,
            },
            Err(reason) => Msg::ArtifactFailed {
                format: export_format(kind),
                reason,
            },
        }),
        PanelEvent::SheetUploaded(Ok(outcome)) => Some(Msg::SheetUploadFinished {
            success: outcome.success,
            url: outcome.url,
        }),
        PanelEvent::SheetUploaded(Err(err)) => {
            panel_warn!("sheet upload failed: {err}");
            Some(Msg::SheetUploadFinished {
                success: false,
                url: None,
            })
        }
        PanelEvent::HealthChecked(_) | PanelEvent::Features(_) | PanelEvent::Recommended(_) => {
            None
        }
    }
}

pub fn scrape_payload(request: &JobRequest) -> ScrapePayload {
    ScrapePayload {
        url: request.url.clone(),
        max_pages: request.max_pages,
        max_depth: request.max_depth,
        crawl_delay: request.crawl_delay,
        export_formats: request
            .export_formats
            .iter()
            .map(|format| format.tag().to_string())
            .collect(),
        strictness: request.strictness.tag().to_string(),
        crawler: request.crawler.map(|kind| kind.tag().to_string()),
        scraper: request.scraper.map(|kind| kind.tag().to_string()),
        force_ai: request.force_ai,
        intent: request.intent.clone(),
        optimize: request.optimize,
        google_sheets_upload: request.sheets_upload,
        google_sheets_id: request.sheets_id.clone(),
    }
}

pub fn core_snapshot(snapshot: JobSnapshot) -> StatusSnapshot {
    StatusSnapshot {
        status: JobStatus::from_tag(&snapshot.status_tag),
        message: snapshot.message,
        stage: snapshot
            .stage_tag
            .as_deref()
            .and_then(StageHint::from_tag),
        result: snapshot.result.map(run_summary),
    }
}

fn run_summary(result: JobResult) -> RunSummary {
    RunSummary {
        files: result.files,
        total_products: result.total_products,
        pages_crawled: result.pages_crawled,
        duration: result.duration,
        sheet_url: result.sheet_url,
    }
}

fn export_kind(format: ExportFormat) -> ExportKind {
    match format {
        ExportFormat::Json => ExportKind::Json,
        ExportFormat::Csv => ExportKind::Csv,
        ExportFormat::CsvPrices => ExportKind::CsvPrices,
        ExportFormat::Quotation => ExportKind::Quotation,
    }
}

fn export_format(kind: ExportKind) -> ExportFormat {
    match kind {
        ExportKind::Json => ExportFormat::Json,
        ExportKind::Csv => ExportFormat::Csv,
        ExportKind::CsvPrices => ExportFormat::CsvPrices,
        ExportKind::Quotation => ExportFormat::Quotation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use panel_client::JobHandle;

    #[test]
    fn payload_tags_follow_the_request() {
        let mut request = JobRequest::new("https://shop.example");
        request.export_formats = vec![ExportFormat::Json, ExportFormat::CsvPrices];
        request.crawler = Some(panel_core::CrawlerKind::Dynamic);

        let payload = scrape_payload(&request);
        assert_eq!(payload.export_formats, vec!["json", "csv_prices"]);
        assert_eq!(payload.strictness, "balanced");
        assert_eq!(payload.crawler.as_deref(), Some("dynamic"));
        assert_eq!(payload.scraper, None);
    }

    #[test]
    fn snapshots_map_status_and_stage_tags() {
        let snapshot = core_snapshot(JobSnapshot {
            status_tag: "running".to_string(),
            message: "Scraping product 3".to_string(),
            stage_tag: Some("scraping".to_string()),
            result: None,
        });
        assert_eq!(snapshot.status, JobStatus::Running);
        assert_eq!(snapshot.stage, Some(StageHint::Scraping));
    }

    #[test]
    fn unknown_stage_tags_are_dropped() {
        let snapshot = core_snapshot(JobSnapshot {
            status_tag: "paused_by_admin".to_string(),
            message: String::new(),
            stage_tag: Some("defrosting".to_string()),
            result: None,
        });
        assert_eq!(
            snapshot.status,
            JobStatus::Other("paused_by_admin".to_string())
        );
        assert_eq!(snapshot.stage, None);
    }

    #[test]
    fn submitted_events_become_submit_messages() {
        let msg = map_event(PanelEvent::Submitted(Ok(JobHandle {
            id: "job-1".to_string(),
        })));
        assert_eq!(
            msg,
            Some(Msg::SubmitSucceeded {
                job_id: "job-1".to_string()
            })
        );
    }
}
