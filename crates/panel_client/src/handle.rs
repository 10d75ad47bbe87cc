use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;

use panel_logging::{panel_debug, panel_info, panel_warn, set_poll_tick};

use crate::artifact::{save_artifact, SavedArtifact};
use crate::backend::{CatalogBackend, HttpBackend};
use crate::features::FeatureProbe;
use crate::types::{
    ClientError, ClientSettings, ExportKind, FeatureFlags, JobHandle, JobSnapshot, PollSettings,
    Recommendation, ScrapePayload, SheetUploadOutcome, SheetUploadPayload,
};

enum PanelCommand {
    CheckHealth,
    QueryFeatures,
    Submit(ScrapePayload),
    Watch { job_id: String },
    StopWatch,
    FetchArtifact {
        job_id: String,
        kind: ExportKind,
        output_dir: PathBuf,
    },
    UploadSheet(SheetUploadPayload),
    Recommend { url: String, intent: String },
}

/// Everything the backend worker reports back to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelEvent {
    HealthChecked(Result<(), ClientError>),
    Features(FeatureFlags),
    Submitted(Result<JobHandle, ClientError>),
    /// One successful status poll for the watched job.
    Snapshot {
        job_id: String,
        snapshot: JobSnapshot,
    },
    /// The watch spent its retry budget on consecutive failures.
    WatchFailed {
        job_id: String,
        error: ClientError,
    },
    /// The watch hit the poll ceiling while the job was still in flight.
    WatchTimedOut { job_id: String },
    ArtifactFetched {
        kind: ExportKind,
        result: Result<SavedArtifact, String>,
    },
    SheetUploaded(Result<SheetUploadOutcome, ClientError>),
    Recommended(Result<Recommendation, ClientError>),
}

/// Owns the tokio runtime on a background thread and turns commands into
/// backend calls, reporting results over an event channel. The polling
/// cadence is therefore decoupled from whatever render loop drives the
/// front-end; cancelling a watch is just flipping its stop flag.
pub struct BackendHandle {
    cmd_tx: mpsc::Sender<PanelCommand>,
    event_rx: mpsc::Receiver<PanelEvent>,
}

impl BackendHandle {
    pub fn new(settings: ClientSettings, poll: PollSettings) -> Result<Self, ClientError> {
        let backend = Arc::new(HttpBackend::new(settings)?);
        Ok(Self::with_backend(backend, poll))
    }

    /// Test seam: any [`CatalogBackend`] implementation works.
    pub fn with_backend(backend: Arc<dyn CatalogBackend>, poll: PollSettings) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
            let probe = Arc::new(FeatureProbe::default());
            let mut watch_stop: Option<Arc<AtomicBool>> = None;

            while let Ok(command) = cmd_rx.recv() {
                match command {
                    PanelCommand::Watch { job_id } => {
                        // A new watch supersedes any previous one.
                        if let Some(flag) = watch_stop.take() {
                            flag.store(true, Ordering::Relaxed);
                        }
                        let flag = Arc::new(AtomicBool::new(false));
                        watch_stop = Some(flag.clone());
                        let backend = backend.clone();
                        let event_tx = event_tx.clone();
                        let poll = poll.clone();
                        runtime.spawn(async move {
                            watch_job(backend.as_ref(), &job_id, &poll, &flag, &event_tx).await;
                        });
                    }
                    PanelCommand::StopWatch => {
                        if let Some(flag) = watch_stop.take() {
                            flag.store(true, Ordering::Relaxed);
                        }
                    }
                    other => {
                        let backend = backend.clone();
                        let event_tx = event_tx.clone();
                        let probe = probe.clone();
                        runtime.spawn(async move {
                            handle_command(backend.as_ref(), other, &probe, event_tx).await;
                        });
                    }
                }
            }
        });

        Self { cmd_tx, event_rx }
    }

    pub fn check_health(&self) {
        let _ = self.cmd_tx.send(PanelCommand::CheckHealth);
    }

    pub fn query_features(&self) {
        let _ = self.cmd_tx.send(PanelCommand::QueryFeatures);
    }

    pub fn submit(&self, payload: ScrapePayload) {
        let _ = self.cmd_tx.send(PanelCommand::Submit(payload));
    }

    pub fn watch(&self, job_id: impl Into<String>) {
        let _ = self.cmd_tx.send(PanelCommand::Watch {
            job_id: job_id.into(),
        });
    }

    pub fn stop_watch(&self) {
        let _ = self.cmd_tx.send(PanelCommand::StopWatch);
    }

    pub fn fetch_artifact(
        &self,
        job_id: impl Into<String>,
        kind: ExportKind,
        output_dir: PathBuf,
    ) {
        let _ = self.cmd_tx.send(PanelCommand::FetchArtifact {
            job_id: job_id.into(),
            kind,
            output_dir,
        });
    }

    pub fn upload_sheet(&self, payload: SheetUploadPayload) {
        let _ = self.cmd_tx.send(PanelCommand::UploadSheet(payload));
    }

    pub fn recommend(&self, url: impl Into<String>, intent: impl Into<String>) {
        let _ = self.cmd_tx.send(PanelCommand::Recommend {
            url: url.into(),
            intent: intent.into(),
        });
    }

    pub fn try_recv(&self) -> Option<PanelEvent> {
        self.event_rx.try_recv().ok()
    }
}

async fn handle_command(
    backend: &dyn CatalogBackend,
    command: PanelCommand,
    probe: &FeatureProbe,
    event_tx: mpsc::Sender<PanelEvent>,
) {
    match command {
        PanelCommand::CheckHealth => {
            let _ = event_tx.send(PanelEvent::HealthChecked(backend.health().await));
        }
        PanelCommand::QueryFeatures => {
            let _ = event_tx.send(PanelEvent::Features(probe.get(backend).await));
        }
        PanelCommand::Submit(payload) => {
            let result = backend.submit(&payload).await;
            if let Ok(handle) = &result {
                panel_info!("job accepted: {}", handle.id);
            }
            let _ = event_tx.send(PanelEvent::Submitted(result));
        }
        PanelCommand::FetchArtifact {
            job_id,
            kind,
            output_dir,
        } => {
            let result = match backend.download(&job_id, kind).await {
                Ok(bytes) => save_artifact(&output_dir, &job_id, kind, &bytes)
                    .map_err(|err| err.to_string()),
                Err(err) => Err(err.to_string()),
            };
            let _ = event_tx.send(PanelEvent::ArtifactFetched { kind, result });
        }
        PanelCommand::UploadSheet(payload) => {
            let _ = event_tx.send(PanelEvent::SheetUploaded(
                backend.upload_to_sheet(&payload).await,
            ));
        }
        PanelCommand::Recommend { url, intent } => {
            let _ = event_tx.send(PanelEvent::Recommended(
                backend.recommend(&url, &intent).await,
            ));
        }
        // Watch and StopWatch are routed on the command thread.
        PanelCommand::Watch { .. } | PanelCommand::StopWatch => {}
    }
}

/// Fetch-then-sleep status loop. Strictly one poll in flight at a time.
/// Fetch failures get bounded retries with a doubled sleep before the watch
/// turns fatal; the ceiling bounds total polls regardless.
async fn watch_job(
    backend: &dyn CatalogBackend,
    job_id: &str,
    poll: &PollSettings,
    stop: &AtomicBool,
    event_tx: &mpsc::Sender<PanelEvent>,
) {
    let mut polls: u32 = 0;
    let mut failures: u32 = 0;

    loop {
        if stop.load(Ordering::Relaxed) {
            return;
        }
        set_poll_tick(u64::from(polls) + 1);
        panel_debug!("poll {} for job {job_id}", u64::from(polls) + 1);
        match backend.status(job_id).await {
            Ok(snapshot) => {
                failures = 0;
                polls += 1;
                let terminal = snapshot.is_terminal();
                if event_tx
                    .send(PanelEvent::Snapshot {
                        job_id: job_id.to_string(),
                        snapshot,
                    })
                    .is_err()
                {
                    return;
                }
                if terminal {
                    return;
                }
                if polls >= poll.ceiling {
                    let _ = event_tx.send(PanelEvent::WatchTimedOut {
                        job_id: job_id.to_string(),
                    });
                    return;
                }
                tokio::time::sleep(poll.interval).await;
            }
            Err(err) => {
                failures += 1;
                if failures > poll.max_retries {
                    let _ = event_tx.send(PanelEvent::WatchFailed {
                        job_id: job_id.to_string(),
                        error: err,
                    });
                    return;
                }
                panel_warn!(
                    "status fetch for job {job_id} failed ({failures}/{}), retrying: {err}",
                    poll.max_retries
                );
                tokio::time::sleep(poll.interval * 2).await;
            }
        }
    }
}
