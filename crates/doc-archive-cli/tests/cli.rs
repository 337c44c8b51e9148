use std::fs;

use assert_cmd::Command;
use doc_archive_test_support::{write_file, write_sample_table};
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

fn archive() -> TempDir {
    let temp = TempDir::new().expect("tempdir");
    write_sample_table(temp.path(), "data/documents.json");
    temp
}

fn doc_archive(temp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("doc-archive").expect("binary");
    cmd.current_dir(temp.path()).env_remove("DOC_ARCHIVE_LOG");
    cmd
}

fn stdout_json(cmd: &mut Command) -> Value {
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).expect("stdout json")
}

#[test]
fn list_prints_single_page_without_controls() {
    let temp = archive();

    let output = doc_archive(&temp)
        .arg("list")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let stdout = String::from_utf8(output).expect("stdout utf8");
    assert!(stdout.starts_with("Showing 5 of 5 documents (page 1 of 1)"));
    assert!(stdout.contains("black-book"));
    assert!(stdout.contains("voicemail"));
    assert!(!stdout.contains('['));
}

#[test]
fn list_json_highlights_search_term() {
    let temp = archive();

    let payload = stdout_json(doc_archive(&temp).args([
        "list",
        "--search",
        "evidence",
        "--format",
        "json",
    ]));

    assert_eq!(payload["total"], 2);
    assert_eq!(payload["pagination"], Value::Null);
    let items = payload["items"].as_array().expect("items");
    assert_eq!(items[0]["id"], "flight-logs");
    assert_eq!(items[1]["id"], "island-photos");
    assert_eq!(
        items[0]["descriptionHtml"],
        "Passenger manifests &amp; pilot notes"
    );

    let payload = stdout_json(doc_archive(&temp).args([
        "list", "--search", "PILOT", "--format", "json",
    ]));
    assert_eq!(
        payload["items"][0]["descriptionHtml"],
        "Passenger manifests &amp; <span class=\"highlight\">pilot</span> notes"
    );
}

#[test]
fn list_filters_by_type() {
    let temp = archive();

    let payload = stdout_json(doc_archive(&temp).args([
        "list", "--type", "video", "--type", "AUDIO", "--format", "json",
    ]));

    let ids: Vec<&str> = payload["items"]
        .as_array()
        .expect("items")
        .iter()
        .map(|item| item["id"].as_str().expect("id"))
        .collect();
    assert_eq!(ids, vec!["deposition-2016", "voicemail"]);
    assert_eq!(payload["query"]["enabledTypes"], serde_json::json!(["video", "audio"]));
}

#[test]
fn list_pages_through_results() {
    let temp = archive();

    doc_archive(&temp)
        .args(["list", "--page-size", "2", "--page", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Showing 1 of 5 documents (page 3 of 3)"))
        .stdout(predicate::str::contains("voicemail"))
        .stdout(predicate::str::contains("< 1 2 [3]"));

    let payload = stdout_json(doc_archive(&temp).args([
        "list",
        "--page-size",
        "2",
        "--page",
        "9",
        "--format",
        "json",
    ]));
    assert_eq!(payload["page"], 1);
    assert_eq!(payload["pagination"]["next"], 2);
    assert_eq!(payload["pagination"]["previous"], Value::Null);
}

#[test]
fn list_reads_page_size_from_config() {
    let temp = archive();
    write_file(
        temp.path(),
        ".doc-archive.toml",
        b"[browse]\npage_size = 2\nenabled_types = [\"doc\", \"img\"]\n",
    );

    doc_archive(&temp)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Showing 2 of 3 documents (page 1 of 2)"));
}

#[test]
fn list_rejects_unknown_types_and_zero_page_size() {
    let temp = archive();

    doc_archive(&temp)
        .args(["list", "--type", "hologram"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown file type"));

    doc_archive(&temp)
        .args(["list", "--page-size", "0"])
        .assert()
        .failure();
}

#[test]
fn render_reads_stdin() {
    let temp = archive();

    doc_archive(&temp)
        .args(["render", "-"])
        .write_stdin("# Title\n- a\n- b")
        .assert()
        .success()
        .stdout("<h1>Title</h1><ul><li>a</li><li>b</li></ul>\n");
}

#[test]
fn render_reads_file() {
    let temp = archive();
    write_file(temp.path(), "notes.md", b"**bold**");

    doc_archive(&temp)
        .args(["render", "notes.md"])
        .assert()
        .success()
        .stdout("<p><strong>bold</strong></p>\n");
}

#[test]
fn show_renders_markdown_summary() {
    let temp = archive();
    write_file(
        temp.path(),
        "src/docs/black-book.md",
        b"# Black Book\n\n## Summary\nContacts *list*",
    );

    doc_archive(&temp)
        .args(["show", "black-book"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Black Book\nCategory: LEAKED\nType: Document\n"))
        .stdout(predicate::str::contains(
            "<h1>Black Book</h1><h2>Summary</h2><p>Contacts <em>list</em></p>",
        ));
}

#[test]
fn show_falls_back_when_summary_is_missing() {
    let temp = archive();

    doc_archive(&temp)
        .args(["show", "flight-logs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Failed to load content."));
}

#[test]
fn show_unknown_id_exits_with_two() {
    let temp = archive();

    doc_archive(&temp)
        .args(["show", "nope"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("document 'nope' not found"));
}

#[test]
fn stats_summarises_archive() {
    let temp = archive();

    doc_archive(&temp)
        .args(["stats", "--today", "2024-03-06"])
        .assert()
        .success()
        .stdout("Total files: 5\nCategories: 4\nTotal size: 1.8 GB\nLast update: Yesterday\n");
}

#[test]
fn stats_json_includes_raw_figures() {
    let temp = archive();

    let payload = stdout_json(doc_archive(&temp).args([
        "stats",
        "--today",
        "2024-05-01",
        "--format",
        "json",
    ]));
    assert_eq!(payload["stats"]["totalFiles"], 5);
    assert_eq!(payload["stats"]["lastUpdate"], "2024-03-05");
    assert_eq!(payload["lastUpdateText"], "Mar 5, 2024");
}

#[test]
fn scan_writes_document_table() {
    let temp = TempDir::new().expect("tempdir");
    write_file(
        temp.path(),
        "src/docs/epstein-indictment.md",
        b"# Indictment\n\nPublished: 2019-07-08\n",
    );
    write_file(temp.path(), "src/docs/epstein-indictment.pdf", b"%PDF");
    write_file(temp.path(), "src/docs/readme.txt", b"ignored");

    doc_archive(&temp)
        .args(["scan", "--output", "data/documents.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 1 documents"));

    let table = fs::read_to_string(temp.path().join("data/documents.json")).expect("table");
    let value: Value = serde_json::from_str(&table).expect("json");
    let record = &value["epstein-indictment"];
    assert_eq!(record["title"], "Indictment");
    assert_eq!(record["category"], "FEDERAL");
    assert_eq!(record["date"], "2019-07-08");
    assert_eq!(record["fileUrl"], "./src/docs/epstein-indictment.pdf");
    assert_eq!(record["size"], "4 B");

    doc_archive(&temp)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("epstein-indictment"));
}

#[test]
fn missing_table_is_an_error() {
    let temp = TempDir::new().expect("tempdir");

    doc_archive(&temp)
        .arg("list")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("doc-archive error"))
        .stderr(predicate::str::contains("documents.json"));
}

#[test]
fn explicit_data_path_overrides_config() {
    let temp = archive();
    fs::rename(
        temp.path().join("data/documents.json"),
        temp.path().join("table.json"),
    )
    .expect("move table");

    doc_archive(&temp)
        .args(["--data", "table.json", "stats", "--today", "2024-03-05"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Last update: Today"));
}
