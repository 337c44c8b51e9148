//! Shared fixtures for doc-archive tests.

use std::fs;
use std::path::Path;

use doc_archive_config::Config;
use doc_archive_core::{DocumentRecord, FileType, Repository};

/// Returns a baseline configuration for tests.
pub fn test_config() -> Config {
    Config::default()
}

/// `count` documents with ids `doc-01`, `doc-02`, ... cycling through the
/// four file types.
pub fn numbered_repository(count: usize) -> Repository {
    let records = (1..=count).map(|n| {
        let file_type = FileType::ALL[(n - 1) % FileType::ALL.len()];
        DocumentRecord::new(
            format!("doc-{n:02}"),
            format!("Document {n}"),
            format!("Record number {n}"),
            "DOCUMENT",
            file_type,
        )
    });
    Repository::from_records(records).expect("numbered ids are unique")
}

/// Small mixed archive used across integration tests.
pub fn sample_repository() -> Repository {
    Repository::from_json_value(sample_table()).expect("sample table is valid")
}

/// The JSON table behind [`sample_repository`].
pub fn sample_table() -> serde_json::Value {
    serde_json::json!({
        "black-book": {
            "id": "black-book",
            "title": "Black Book",
            "description": "Address book with contact entries",
            "filename": "black-book.pdf",
            "fileUrl": "./src/docs/black-book.pdf",
            "markdownUrl": "./src/docs/black-book.md",
            "date": "2024-02-10",
            "size": "12 MB",
            "type": "pdf",
            "category": "LEAKED",
            "fileType": "doc"
        },
        "flight-logs": {
            "id": "flight-logs",
            "title": "Flight Logs",
            "description": "Passenger manifests & pilot notes",
            "date": "2024-03-05",
            "size": "800 KB",
            "type": "pdf",
            "category": "EVIDENCE",
            "fileType": "doc"
        },
        "island-photos": {
            "id": "island-photos",
            "title": "Island Photos",
            "description": "Aerial photographs of the property",
            "date": "2024-01-20",
            "size": "1.2 GB",
            "type": "jpg",
            "category": "EVIDENCE",
            "fileType": "img"
        },
        "deposition-2016": {
            "id": "deposition-2016",
            "title": "Deposition 2016",
            "description": "Recorded testimony from the civil lawsuit",
            "date": "2016-04-22",
            "size": "640 MB",
            "type": "mp4",
            "category": "COURT DOCUMENT",
            "fileType": "video"
        },
        "voicemail": {
            "id": "voicemail",
            "title": "Voicemail",
            "description": "Audio message left on an answering machine",
            "type": "mp3",
            "category": "FEDERAL",
            "fileType": "audio"
        }
    })
}

/// Write `contents` to `dir/relative`, creating parent directories.
pub fn write_file(dir: &Path, relative: &str, contents: &[u8]) {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent directory");
    }
    fs::write(&path, contents).expect("write fixture file");
}

/// Write the sample table to `dir/relative` as pretty JSON.
pub fn write_sample_table(dir: &Path, relative: &str) {
    let json = serde_json::to_string_pretty(&sample_table()).expect("serialize sample table");
    write_file(dir, relative, json.as_bytes());
}
