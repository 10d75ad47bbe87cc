use std::path::{Path, PathBuf};

use crate::persist::{ArtifactWriter, PersistError};
use crate::types::ExportKind;

/// One downloaded export file, saved to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedArtifact {
    pub kind: ExportKind,
    pub filename: String,
    pub path: PathBuf,
    pub byte_len: u64,
    pub size_label: String,
}

/// `products_{job id prefix}{format extension}`, e.g. `products_ab12cd34.json`.
pub fn artifact_filename(job_id: &str, kind: ExportKind) -> String {
    let prefix: String = job_id.chars().take(8).collect();
    format!("products_{prefix}{}", kind.extension())
}

/// Human-readable byte size: KB below one MB, MB above, one decimal.
pub fn human_size(byte_len: u64) -> String {
    let kb = byte_len as f64 / 1024.0;
    if kb < 1024.0 {
        format!("{kb:.1} KB")
    } else {
        format!("{:.1} MB", kb / 1024.0)
    }
}

/// Writes artifact bytes into `dir` under the derived filename.
pub fn save_artifact(
    dir: &Path,
    job_id: &str,
    kind: ExportKind,
    bytes: &[u8],
) -> Result<SavedArtifact, PersistError> {
    let filename = artifact_filename(job_id, kind);
    let writer = ArtifactWriter::new(dir.to_path_buf());
    let path = writer.write(&filename, bytes)?;
    Ok(SavedArtifact {
        kind,
        filename,
        path,
        byte_len: bytes.len() as u64,
        size_label: human_size(bytes.len() as u64),
    })
}
