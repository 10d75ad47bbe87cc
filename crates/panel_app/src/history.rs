use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use panel_client::{ensure_output_dir, ArtifactWriter};
use panel_core::PanelViewModel;
use panel_logging::{panel_error, panel_info, panel_warn};
use serde::{Deserialize, Serialize};

const HISTORY_FILENAME: &str = ".panel_history.ron";

/// One finished run, as kept in the on-disk history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryEntry {
    pub completed_at: String,
    pub url: String,
    pub job_id: String,
    pub total_products: u64,
    pub pages_crawled: u64,
    pub artifacts: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct HistoryFile {
    runs: Vec<HistoryEntry>,
}

pub fn load_history(output_dir: &Path) -> Vec<HistoryEntry> {
    let path = output_dir.join(HISTORY_FILENAME);
    let content = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Vec::new();
        }
        Err(err) => {
            panel_warn!("Failed to read run history from {:?}: {}", path, err);
            return Vec::new();
        }
    };

    match ron::from_str::<HistoryFile>(&content) {
        Ok(file) => file.runs,
        Err(err) => {
            panel_warn!("Failed to parse run history from {:?}: {}", path, err);
            Vec::new()
        }
    }
}

/// Appends a completed run to the history file. Best effort; a history
/// write failure never fails the run itself.
pub fn record_run(output_dir: &Path, target_url: &str, view: &PanelViewModel) {
    let Some(job_id) = view.job_id.as_deref() else {
        return;
    };

    if let Err(err) = ensure_output_dir(output_dir) {
        panel_error!("Failed to ensure output dir {:?}: {}", output_dir, err);
        return;
    }

    let entry = HistoryEntry {
        completed_at: Utc::now().to_rfc3339(),
        url: target_url.to_string(),
        job_id: job_id.to_string(),
        total_products: view.metrics.as_ref().map_or(0, |m| m.total_products),
        pages_crawled: view.metrics.as_ref().map_or(0, |m| m.pages_crawled),
        artifacts: view
            .artifacts
            .iter()
            .filter_map(|row| row.filename.clone())
            .collect(),
    };

    let mut runs = load_history(output_dir);
    runs.push(entry);

    let pretty = ron::ser::PrettyConfig::new();
    let content = match ron::ser::to_string_pretty(&HistoryFile { runs }, pretty) {
        Ok(text) => text,
        Err(err) => {
            panel_error!("Failed to serialize run history: {}", err);
            return;
        }
    };

    let writer = ArtifactWriter::new(PathBuf::from(output_dir));
    if let Err(err) = writer.write(HISTORY_FILENAME, content.as_bytes()) {
        panel_error!("Failed to write run history to {:?}: {}", output_dir, err);
        return;
    }
    panel_info!("Recorded run in {:?}", output_dir.join(HISTORY_FILENAME));
}

#[cfg(test)]
mod tests {
    use super::*;
    use panel_core::{ArtifactRowView, ExportFormat, RunMetricsView, SessionState};

    fn completed_view() -> PanelViewModel {
        PanelViewModel {
            session: SessionState::Completed,
            percent: 100,
            polls: 12,
            job_id: Some("job-1".to_string()),
            status_label: "Completed".to_string(),
            activity: "done".to_string(),
            metrics: Some(RunMetricsView {
                total_products: 42,
                pages_crawled: 25,
                duration: "73".to_string(),
                file_count: 1,
            }),
            artifacts: vec![ArtifactRowView {
                format: ExportFormat::Json,
                label: ExportFormat::Json.label(),
                filename: Some("products_job-1.json".to_string()),
                size_label: Some("0.1 KB".to_string()),
                failure: None,
            }],
            sheet_url: None,
            error: None,
            dirty: false,
        }
    }

    #[test]
    fn history_round_trips_through_the_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        record_run(dir.path(), "https://shop.example", &completed_view());

        let runs = load_history(dir.path());
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].url, "https://shop.example");
        assert_eq!(runs[0].job_id, "job-1");
        assert_eq!(runs[0].total_products, 42);
        assert_eq!(runs[0].artifacts, vec!["products_job-1.json".to_string()]);
    }

    #[test]
    fn runs_accumulate_across_records() {
        let dir = tempfile::tempdir().expect("tempdir");
        record_run(dir.path(), "https://a.example", &completed_view());
        record_run(dir.path(), "https://b.example", &completed_view());

        let runs = load_history(dir.path());
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[1].url, "https://b.example");
    }

    #[test]
    fn missing_history_reads_as_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(load_history(dir.path()).is_empty());
    }

    #[test]
    fn corrupt_history_reads_as_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join(HISTORY_FILENAME), "not ron at all").expect("write");
        assert!(load_history(dir.path()).is_empty());
    }
}
