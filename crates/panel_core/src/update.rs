use crate::{
    ArtifactOutcome, ArtifactRow, Effect, Msg, PanelState, SessionState, SheetUploadRequest,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: PanelState, msg: Msg) -> (PanelState, Vec<Effect>) {
    let effects = match msg {
        Msg::SubmitRequested(request) => {
            // A session in flight keeps its job; terminal sessions are
            // implicitly reset by a new submission.
            if state.session() == SessionState::Polling {
                return (state, Vec::new());
            }
            if state.session() != SessionState::Idle {
                state.reset();
            }
            if let Err(err) = request.validate() {
                state.set_error(err.to_string());
                return (state, Vec::new());
            }
            state.record_submission(
                request.url.clone(),
                request.sheets_upload,
                request.sheets_id.clone(),
            );
            vec![Effect::Submit(request)]
        }
        Msg::SubmitSucceeded { job_id } => {
            state.on_submit(job_id.clone());
            vec![Effect::StartPolling { job_id }]
        }
        Msg::SubmitFailed { reason } => {
            state.fail(reason);
            Vec::new()
        }
        Msg::SnapshotArrived(snapshot) => {
            if state.session() != SessionState::Polling {
                // Terminal states do not resume polling; late snapshots
                // from an already-stopped poller are dropped.
                return (state, Vec::new());
            }
            match state.apply_snapshot(&snapshot) {
                SessionState::Completed => {
                    let mut effects = vec![Effect::StopPolling];
                    let formats = state.recognized_formats();
                    if let Some(job_id) = state.job_id() {
                        let job_id = job_id.to_string();
                        if !formats.is_empty() {
                            effects.push(Effect::FetchArtifacts {
                                job_id: job_id.clone(),
                                formats,
                            });
                        }
                        if state.wants_sheet_upload() {
                            effects.push(Effect::UploadToSheet(SheetUploadRequest {
                                job_id,
                                spreadsheet_id: state.sheets_id(),
                            }));
                        }
                    }
                    effects
                }
                SessionState::Failed | SessionState::TimedOut => vec![Effect::StopPolling],
                _ => Vec::new(),
            }
        }
        Msg::PollFailed { reason } => {
            if state.session() != SessionState::Polling {
                return (state, Vec::new());
            }
            state.fail(reason);
            vec![Effect::StopPolling]
        }
        Msg::PollTimedOut => {
            if state.session() != SessionState::Polling {
                return (state, Vec::new());
            }
            state.time_out();
            // The poller stops itself on its own ceiling; no effect needed.
            Vec::new()
        }
        Msg::ArtifactSaved {
            format,
            filename,
            size_label,
        } => {
            state.record_artifact(ArtifactRow {
                format,
                outcome: ArtifactOutcome::Saved {
                    filename,
                    size_label,
                },
            });
            Vec::new()
        }
        Msg::ArtifactFailed { format, reason } => {
            state.record_artifact(ArtifactRow {
                format,
                outcome: ArtifactOutcome::Failed { reason },
            });
            Vec::new()
        }
        Msg::SheetUploadFinished { success, url } => {
            if success {
                state.record_sheet_url(url);
            } else {
                state.set_error("spreadsheet upload failed".to_string());
            }
            Vec::new()
        }
        Msg::ResetRequested => {
            let was_polling = state.session() == SessionState::Polling;
            state.reset();
            if was_polling {
                vec![Effect::StopPolling]
            } else {
                Vec::new()
            }
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}
