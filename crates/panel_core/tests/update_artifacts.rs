use std::collections::BTreeMap;

use panel_core::{
    update, ExportFormat, JobStatus, JobRequest, Msg, PanelState, RunSummary, StatusSnapshot,
};

fn completed_session() -> PanelState {
    let (state, _) = update(
        PanelState::new(),
        Msg::SubmitRequested(JobRequest::new("https://shop.example/products")),
    );
    let (state, _) = update(
        state,
        Msg::SubmitSucceeded {
            job_id: "job-1234".to_string(),
        },
    );
    let mut files = BTreeMap::new();
    files.insert("json".to_string(), "/data/out.json".to_string());
    files.insert("csv".to_string(), "/data/out.csv".to_string());
    let mut snapshot = StatusSnapshot::new(JobStatus::Completed, "done");
    snapshot.result = Some(RunSummary {
        files,
        total_products: 42,
        pages_crawled: 10,
        duration: Some("31s".to_string()),
        sheet_url: None,
    });
    let (state, _) = update(state, Msg::SnapshotArrived(snapshot));
    state
}

#[test]
fn saved_artifacts_appear_in_the_view() {
    let state = completed_session();
    let (state, effects) = update(
        state,
        Msg::ArtifactSaved {
            format: ExportFormat::Json,
            filename: "products_job-1234.json".to_string(),
            size_label: "1.2 KB".to_string(),
        },
    );

    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(view.artifacts.len(), 1);
    let row = &view.artifacts[0];
    assert_eq!(row.format, ExportFormat::Json);
    assert_eq!(row.filename.as_deref(), Some("products_job-1234.json"));
    assert_eq!(row.size_label.as_deref(), Some("1.2 KB"));
    assert!(row.failure.is_none());
}

#[test]
fn one_failed_artifact_does_not_abort_the_rest() {
    let state = completed_session();
    let (state, _) = update(
        state,
        Msg::ArtifactFailed {
            format: ExportFormat::Csv,
            reason: "download failed: 500".to_string(),
        },
    );
    let (state, _) = update(
        state,
        Msg::ArtifactSaved {
            format: ExportFormat::Json,
            filename: "products_job-1234.json".to_string(),
            size_label: "3.0 MB".to_string(),
        },
    );

    let view = state.view();
    assert_eq!(view.artifacts.len(), 2);
    assert!(view.artifacts[0].failure.is_some());
    assert!(view.artifacts[1].failure.is_none());
}

#[test]
fn sheet_upload_result_lands_in_the_view() {
    let state = completed_session();
    let (state, _) = update(
        state,
        Msg::SheetUploadFinished {
            success: true,
            url: Some("https://docs.example/sheet-1".to_string()),
        },
    );
    assert_eq!(
        state.view().sheet_url.as_deref(),
        Some("https://docs.example/sheet-1")
    );
}

#[test]
fn failed_sheet_upload_surfaces_an_error() {
    let state = completed_session();
    let (state, _) = update(
        state,
        Msg::SheetUploadFinished {
            success: false,
            url: None,
        },
    );
    assert!(state.view().error.is_some());
    assert!(state.view().sheet_url.is_none());
}
