use std::thread;
use std::time::{Duration, Instant};

use panel_client::{BackendHandle, ClientSettings, PanelEvent, PollSettings};
use panel_core::{update, Msg, PanelState, SessionState};
use panel_logging::{panel_info, panel_warn};

use crate::args::{RecommendArgs, RunArgs};
use crate::effects::{map_event, EffectRunner};
use crate::{history, render};

const EVENT_POLL: Duration = Duration::from_millis(50);
const GATE_TIMEOUT: Duration = Duration::from_secs(15);

pub fn run_job(base_url: &str, args: RunArgs) -> i32 {
    let handle = match BackendHandle::new(ClientSettings::new(base_url), PollSettings::default()) {
        Ok(handle) => handle,
        Err(err) => {
            eprintln!("Could not set up the backend client: {err}");
            return 2;
        }
    };

    // Health gate before anything is submitted.
    handle.check_health();
    match wait_for(&handle, |event| match event {
        PanelEvent::HealthChecked(result) => Some(result.clone()),
        _ => None,
    }) {
        Some(Ok(())) => panel_info!("backend at {base_url} is healthy"),
        Some(Err(err)) => {
            eprintln!("Backend at {base_url} is not reachable: {err}");
            return 2;
        }
        None => {
            eprintln!("Backend at {base_url} did not answer the health check in time");
            return 2;
        }
    }

    let mut request = args.to_request();
    if request.sheets_upload {
        handle.query_features();
        let flags = wait_for(&handle, |event| match event {
            PanelEvent::Features(flags) => Some(*flags),
            _ => None,
        });
        match flags {
            Some(flags) if flags.google_sheets => {}
            _ => {
                panel_warn!("google sheets is disabled on this backend, skipping the upload");
                eprintln!("Note: Google Sheets upload is not available on this backend.");
                request.sheets_upload = false;
                request.sheets_id = None;
            }
        }
    }

    let target_url = request.url.clone();
    let output_dir = args.output_dir.clone();
    let mut driver = Driver::new(EffectRunner::new(handle, args.output_dir));
    driver.dispatch(Msg::SubmitRequested(request));

    loop {
        if let Some(event) = driver.runner.try_recv() {
            if let Some(msg) = map_event(event) {
                driver.dispatch(msg);
            }
        } else if driver.settled() {
            break;
        } else {
            thread::sleep(EVENT_POLL);
        }
    }

    let view = driver.state.view();
    match view.session {
        SessionState::Completed => {
            history::record_run(&output_dir, &target_url, &view);
            0
        }
        SessionState::Failed | SessionState::TimedOut => 1,
        // Only reachable when validation rejected the request up front.
        SessionState::Idle | SessionState::Polling => {
            if let Some(error) = &view.error {
                eprintln!("Request rejected: {error}");
            }
            2
        }
    }
}

pub fn check_health(base_url: &str) -> i32 {
    let handle = match BackendHandle::new(ClientSettings::new(base_url), PollSettings::default()) {
        Ok(handle) => handle,
        Err(err) => {
            eprintln!("Could not set up the backend client: {err}");
            return 2;
        }
    };
    handle.check_health();
    match wait_for(&handle, |event| match event {
        PanelEvent::HealthChecked(result) => Some(result.clone()),
        _ => None,
    }) {
        Some(Ok(())) => {
            println!("Backend at {base_url} is healthy.");
            0
        }
        Some(Err(err)) => {
            eprintln!("Backend at {base_url} is not reachable: {err}");
            1
        }
        None => {
            eprintln!("Backend at {base_url} did not answer in time.");
            1
        }
    }
}

pub fn recommend(base_url: &str, args: RecommendArgs) -> i32 {
    let handle = match BackendHandle::new(ClientSettings::new(base_url), PollSettings::default()) {
        Ok(handle) => handle,
        Err(err) => {
            eprintln!("Could not set up the backend client: {err}");
            return 2;
        }
    };
    handle.recommend(args.url, args.intent);
    match wait_for(&handle, |event| match event {
        PanelEvent::Recommended(result) => Some(result.clone()),
        _ => None,
    }) {
        Some(Ok(rec)) => {
            println!("Crawler:    {}", rec.crawler.as_deref().unwrap_or("auto"));
            println!("Scraper:    {}", rec.scraper.as_deref().unwrap_or("auto"));
            println!(
                "Strictness: {}",
                rec.strictness.as_deref().unwrap_or("balanced")
            );
            if let Some(reasoning) = &rec.reasoning {
                println!("Why: {reasoning}");
            }
            0
        }
        Some(Err(err)) => {
            eprintln!("No recommendation: {err}");
            1
        }
        None => {
            eprintln!("Backend at {base_url} did not answer in time.");
            1
        }
    }
}

/// Blocks until an event matches the extractor or the gate timeout passes.
fn wait_for<T>(handle: &BackendHandle, extract: impl Fn(&PanelEvent) -> Option<T>) -> Option<T> {
    let deadline = Instant::now() + GATE_TIMEOUT;
    loop {
        if let Some(event) = handle.try_recv() {
            if let Some(value) = extract(&event) {
                return Some(value);
            }
        } else if Instant::now() >= deadline {
            return None;
        } else {
            thread::sleep(EVENT_POLL);
        }
    }
}

/// Owns the update loop: messages go through the pure core, resulting
/// effects go to the runner, and dirty views are rendered.
struct Driver {
    state: PanelState,
    runner: EffectRunner,
    submit_pending: bool,
    pending_artifacts: usize,
    sheet_pending: bool,
}

impl Driver {
    fn new(runner: EffectRunner) -> Self {
        Self {
            state: PanelState::new(),
            runner,
            submit_pending: false,
            pending_artifacts: 0,
            sheet_pending: false,
        }
    }

    fn dispatch(&mut self, msg: Msg) {
        match &msg {
            Msg::SubmitSucceeded { .. } | Msg::SubmitFailed { .. } => {
                self.submit_pending = false;
            }
            Msg::ArtifactSaved { .. } | Msg::ArtifactFailed { .. } => {
                self.pending_artifacts = self.pending_artifacts.saturating_sub(1);
            }
            Msg::SheetUploadFinished { .. } => self.sheet_pending = false,
            _ => {}
        }

        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        if state.consume_dirty() {
            render::draw(&state.view());
        }
        self.state = state;

        for effect in &effects {
            match effect {
                panel_core::Effect::Submit(_) => self.submit_pending = true,
                panel_core::Effect::FetchArtifacts { formats, .. } => {
                    self.pending_artifacts += formats.len();
                }
                panel_core::Effect::UploadToSheet(_) => self.sheet_pending = true,
                _ => {}
            }
        }
        self.runner.enqueue(effects);
    }

    /// True once nothing more can arrive for this session.
    fn settled(&self) -> bool {
        if self.submit_pending || self.pending_artifacts > 0 || self.sheet_pending {
            return false;
        }
        !matches!(self.state.session(), SessionState::Polling)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use panel_core::JobRequest;

    #[test]
    fn a_rejected_request_settles_immediately() {
        panel_logging::initialize_for_tests();
        let handle = BackendHandle::new(
            ClientSettings::new("http://127.0.0.1:9"),
            PollSettings::default(),
        )
        .expect("client build");
        let mut driver = Driver::new(EffectRunner::new(handle, std::path::PathBuf::from(".")));

        driver.dispatch(Msg::SubmitRequested(JobRequest::new("not a url")));
        assert!(driver.settled());
        assert_eq!(driver.state.session(), SessionState::Idle);
        assert!(driver.state.view().error.is_some());
    }
}
