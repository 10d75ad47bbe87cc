use panel_client::{artifact_filename, human_size, save_artifact, ExportKind};
use pretty_assertions::assert_eq;

#[test]
fn filenames_use_the_job_id_prefix_and_format_extension() {
    assert_eq!(
        artifact_filename("abcdef1234567890", ExportKind::Json),
        "products_abcdef12.json"
    );
    assert_eq!(
        artifact_filename("abcdef1234567890", ExportKind::Csv),
        "products_abcdef12.csv"
    );
    assert_eq!(
        artifact_filename("abcdef1234567890", ExportKind::CsvPrices),
        "products_abcdef12_with_prices.csv"
    );
    assert_eq!(
        artifact_filename("abcdef1234567890", ExportKind::Quotation),
        "products_abcdef12_quotation.json"
    );
}

#[test]
fn short_job_ids_are_used_whole() {
    assert_eq!(artifact_filename("ab12", ExportKind::Json), "products_ab12.json");
}

#[test]
fn sizes_render_as_kb_below_one_mb() {
    assert_eq!(human_size(0), "0.0 KB");
    assert_eq!(human_size(512), "0.5 KB");
    assert_eq!(human_size(150 * 1024), "150.0 KB");
}

#[test]
fn sizes_render_as_mb_from_one_mb_up() {
    assert_eq!(human_size(1024 * 1024), "1.0 MB");
    assert_eq!(human_size(5 * 1024 * 1024 + 512 * 1024), "5.5 MB");
}

#[test]
fn save_writes_the_bytes_under_the_derived_name() {
    let dir = tempfile::tempdir().expect("tempdir");
    let saved = save_artifact(dir.path(), "abcdef1234567890", ExportKind::Json, b"[1,2,3]")
        .expect("save ok");

    assert_eq!(saved.filename, "products_abcdef12.json");
    assert_eq!(saved.byte_len, 7);
    assert_eq!(saved.size_label, "0.0 KB");
    assert_eq!(std::fs::read(&saved.path).expect("read back"), b"[1,2,3]");
}

#[test]
fn save_overwrites_a_previous_artifact_for_the_same_job() {
    let dir = tempfile::tempdir().expect("tempdir");
    save_artifact(dir.path(), "abcdef1234567890", ExportKind::Csv, b"old").expect("first save");
    let saved =
        save_artifact(dir.path(), "abcdef1234567890", ExportKind::Csv, b"new").expect("second");

    assert_eq!(std::fs::read(&saved.path).expect("read back"), b"new");
}
