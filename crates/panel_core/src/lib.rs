//! Panel core: pure session state machine, progress estimation and view-model helpers.
mod effect;
mod estimator;
mod msg;
mod request;
mod state;
mod status;
mod update;
mod view_model;

pub use effect::{Effect, SheetUploadRequest};
pub use estimator::{estimate, PENDING_PERCENT};
pub use msg::Msg;
pub use request::{
    CrawlerKind, ExportFormat, JobRequest, ScraperKind, Strictness, ValidationError,
};
pub use state::{
    ArtifactOutcome, ArtifactRow, PanelState, ProgressState, SessionState, POLL_CEILING,
};
pub use status::{JobStatus, RunSummary, StageHint, StatusSnapshot};
pub use update::update;
pub use view_model::{ArtifactRowView, PanelViewModel, RunMetricsView};
