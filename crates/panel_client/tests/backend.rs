use std::time::Duration;

use panel_client::{
    CatalogBackend, ClientError, ClientSettings, ExportKind, HttpBackend, ScrapePayload,
    SheetUploadPayload,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn backend_for(server: &MockServer) -> HttpBackend {
    HttpBackend::new(ClientSettings::new(server.uri())).expect("client build")
}

fn sample_payload() -> ScrapePayload {
    ScrapePayload {
        url: "https://shop.example/products".to_string(),
        max_pages: 25,
        max_depth: 3,
        crawl_delay: 0.5,
        export_formats: vec!["json".to_string()],
        strictness: "balanced".to_string(),
        crawler: None,
        scraper: None,
        force_ai: None,
        intent: None,
        optimize: None,
        google_sheets_upload: false,
        google_sheets_id: None,
    }
}

#[tokio::test]
async fn health_succeeds_on_2xx() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "ok" })))
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    assert!(backend.health().await.is_ok());
}

#[tokio::test]
async fn health_maps_non_2xx_to_backend_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    let err = backend.health().await.unwrap_err();
    assert!(matches!(err, ClientError::BackendUnavailable(_)));
}

#[tokio::test]
async fn health_times_out_on_slow_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(250)))
        .mount(&server)
        .await;

    let mut settings = ClientSettings::new(server.uri());
    settings.health_timeout = Duration::from_millis(50);
    let backend = HttpBackend::new(settings).expect("client build");

    let err = backend.health().await.unwrap_err();
    assert!(matches!(err, ClientError::BackendUnavailable(_)));
}

#[tokio::test]
async fn submit_returns_job_handle_and_forwards_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/scrape"))
        .and(body_partial_json(json!({
            "url": "https://shop.example/products",
            "max_pages": 25,
            "strictness": "balanced",
            "export_formats": ["json"],
            "google_sheets_upload": false,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "job_id": "job-abc" })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    let handle = backend.submit(&sample_payload()).await.expect("submit ok");
    assert_eq!(handle.id, "job-abc");
}

#[tokio::test]
async fn submit_without_job_id_is_a_submit_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/scrape"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "accepted": true })))
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    let err = backend.submit(&sample_payload()).await.unwrap_err();
    assert_eq!(
        err,
        ClientError::SubmitFailed("no job id returned".to_string())
    );
}

#[tokio::test]
async fn submit_with_empty_job_id_is_a_submit_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/scrape"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "job_id": "" })))
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    let err = backend.submit(&sample_payload()).await.unwrap_err();
    assert!(matches!(err, ClientError::SubmitFailed(_)));
}

#[tokio::test]
async fn submit_maps_non_2xx_to_submit_failed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/scrape"))
        .respond_with(ResponseTemplate::new(422).set_body_string("bad strictness"))
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    let err = backend.submit(&sample_payload()).await.unwrap_err();
    match err {
        ClientError::SubmitFailed(reason) => assert!(reason.contains("bad strictness")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn status_parses_a_full_running_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs/job-abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "running",
            "message": "Crawling [3/10] pages",
            "progress": { "stage": "crawling" },
        })))
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    let snapshot = backend.status("job-abc").await.expect("status ok");
    assert_eq!(snapshot.status_tag, "running");
    assert_eq!(snapshot.message, "Crawling [3/10] pages");
    assert_eq!(snapshot.stage_tag.as_deref(), Some("crawling"));
    assert!(snapshot.result.is_none());
    assert!(!snapshot.is_terminal());
}

#[tokio::test]
async fn status_parses_a_completed_body_with_results() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs/job-abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "completed",
            "message": "done",
            "result": {
                "files": { "json": "/data/out.json", "csv": "/data/out.csv" },
                "total_products": 42,
                "pages_crawled": 25,
                "duration": 73,
                "google_sheets": { "url": "https://docs.example/sheet-1" },
            },
        })))
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    let snapshot = backend.status("job-abc").await.expect("status ok");
    assert!(snapshot.is_terminal());
    let result = snapshot.result.expect("result summary");
    assert_eq!(result.files.len(), 2);
    assert_eq!(result.files["json"], "/data/out.json");
    assert_eq!(result.total_products, 42);
    assert_eq!(result.pages_crawled, 25);
    assert_eq!(result.duration.as_deref(), Some("73"));
    assert_eq!(
        result.sheet_url.as_deref(),
        Some("https://docs.example/sheet-1")
    );
}

#[tokio::test]
async fn status_passes_unknown_status_tags_through() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs/job-abc"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "status": "paused_by_admin" })),
        )
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    let snapshot = backend.status("job-abc").await.expect("status ok");
    assert_eq!(snapshot.status_tag, "paused_by_admin");
    assert!(!snapshot.is_terminal());
}

#[tokio::test]
async fn status_maps_non_2xx_to_status_fetch_failed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs/job-abc"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    let err = backend.status("job-abc").await.unwrap_err();
    assert!(matches!(err, ClientError::StatusFetchFailed(_)));
}

#[tokio::test]
async fn download_returns_raw_bytes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/download/job-abc/json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(r#"[{"sku":1}]"#, "application/json"),
        )
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    let bytes = backend
        .download("job-abc", ExportKind::Json)
        .await
        .expect("download ok");
    assert_eq!(bytes, br#"[{"sku":1}]"#);
}

#[tokio::test]
async fn download_rejects_oversized_artifacts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/download/job-abc/csv"))
        .respond_with(ResponseTemplate::new(200).set_body_string("a,b,c\n1,2,3\n"))
        .mount(&server)
        .await;

    let mut settings = ClientSettings::new(server.uri());
    settings.max_download_bytes = 4;
    let backend = HttpBackend::new(settings).expect("client build");

    let err = backend
        .download("job-abc", ExportKind::Csv)
        .await
        .unwrap_err();
    match err {
        ClientError::DownloadFailed { format, .. } => assert_eq!(format, "csv"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn sheet_upload_round_trips() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/google-sheets/upload"))
        .and(body_partial_json(json!({
            "job_id": "job-abc",
            "spreadsheet_id": "sheet-1",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "url": "https://docs.example/sheet-1",
        })))
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    let outcome = backend
        .upload_to_sheet(&SheetUploadPayload {
            job_id: "job-abc".to_string(),
            spreadsheet_id: Some("sheet-1".to_string()),
            spreadsheet_title: None,
            include_prices: Some(true),
        })
        .await
        .expect("upload ok");
    assert!(outcome.success);
    assert_eq!(outcome.url.as_deref(), Some("https://docs.example/sheet-1"));
}

#[tokio::test]
async fn recommend_unwraps_the_recommendation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/recommend"))
        .and(body_partial_json(json!({
            "url": "https://shop.example",
            "intent": "price list",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "recommendation": {
                "crawler": "static",
                "scraper": "heuristic",
                "strictness": "balanced",
                "reasoning": "small static site",
            },
        })))
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    let rec = backend
        .recommend("https://shop.example", "price list")
        .await
        .expect("recommend ok");
    assert_eq!(rec.crawler.as_deref(), Some("static"));
    assert_eq!(rec.scraper.as_deref(), Some("heuristic"));
}

#[tokio::test]
async fn recommend_failure_flag_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/recommend"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": false })))
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    let err = backend
        .recommend("https://shop.example", "price list")
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::RecommendFailed(_)));
}
