//! Panel client: HTTP access to the remote scraping backend and the
//! background status watch.
mod artifact;
mod backend;
mod features;
mod handle;
mod persist;
mod types;

pub use artifact::{artifact_filename, human_size, save_artifact, SavedArtifact};
pub use backend::{CatalogBackend, HttpBackend};
pub use features::{FeatureProbe, FEATURES_TTL};
pub use handle::{BackendHandle, PanelEvent};
pub use persist::{ensure_output_dir, ArtifactWriter, PersistError};
pub use types::{
    ClientError, ClientSettings, ExportKind, FeatureFlags, JobHandle, JobResult, JobSnapshot,
    PollSettings, Recommendation, ScrapePayload, SheetUploadOutcome, SheetUploadPayload,
};
