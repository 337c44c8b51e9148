use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use doc_archive_config::{Config, ConfigError, ConfigSourceKind, FileType, LoadOptions, Pattern};
use tempfile::TempDir;

fn write_file(path: impl AsRef<Path>, contents: &str) {
    let mut file = fs::File::create(path).expect("create config");
    file.write_all(contents.as_bytes()).expect("write config");
}

fn canonical(path: impl AsRef<Path>) -> PathBuf {
    fs::canonicalize(path).expect("canonicalize path")
}

fn pattern_strings<'a, I>(patterns: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a Pattern>,
{
    patterns
        .into_iter()
        .map(|p| p.original().to_string())
        .collect()
}

#[test]
fn loads_defaults_when_no_files_present() {
    let temp = TempDir::new().expect("tempdir");
    let working_dir = canonical(temp.path());

    let config = Config::load(LoadOptions::default().with_working_dir(working_dir.clone()))
        .expect("load defaults");

    assert_eq!(config.browse.page_size, 10);
    assert_eq!(config.browse.page_size_options, vec![10, 25, 50, 100]);
    assert_eq!(config.browse.enabled_types, FileType::ALL.to_vec());
    assert_eq!(
        config.repository.path,
        working_dir.join("data/documents.json")
    );
    assert_eq!(config.scan.docs_dir, working_dir.join("src/docs"));
    assert!(config.scan.exclude.is_empty());
    assert_eq!(config.scan.description_limit, 300);

    assert_eq!(config.sources.layers.len(), 1);
    assert_eq!(config.sources.layers[0].kind, ConfigSourceKind::Default);
}

#[test]
fn applies_precedence_and_merges_fields() {
    let temp = TempDir::new().expect("tempdir");
    let git_root = canonical(temp.path());
    fs::create_dir(git_root.join(".git")).expect("create .git");

    write_file(
        git_root.join(".doc-archive.toml"),
        r#"
        [browse]
        page_size = 25
        enabled_types = ["doc", "img"]

        [repository]
        path = "catalog/documents.json"

        [scan]
        exclude = ["**/drafts/**"]
        "#,
    );

    let nested = git_root.join("site");
    fs::create_dir(&nested).expect("create nested");
    write_file(
        nested.join(".doc-archive.toml"),
        r#"
        [browse]
        enabled_types = ["video"]

        [scan]
        docs_dir = "docs"
        "#,
    );

    let override_path = nested.join("override.toml");
    write_file(
        &override_path,
        r#"
        [scan]
        description_limit = 120
        "#,
    );

    let config = Config::load(
        LoadOptions::default()
            .with_working_dir(nested.clone())
            .with_override_path(override_path.clone()),
    )
    .expect("load layered");

    assert_eq!(config.browse.page_size, 25);
    assert_eq!(config.browse.enabled_types, vec![FileType::Video]);
    assert_eq!(
        config.repository.path,
        git_root.join("catalog/documents.json")
    );
    assert_eq!(config.scan.docs_dir, nested.join("docs"));
    assert_eq!(
        pattern_strings(config.scan.exclude.iter()),
        vec!["**/drafts/**".to_string()]
    );
    assert!(config
        .scan
        .exclude
        .matches(Path::new("src/docs/drafts/memo.md")));
    assert_eq!(config.scan.description_limit, 120);

    let kinds: Vec<_> = config.sources.layers.iter().map(|l| l.kind).collect();
    assert_eq!(
        kinds,
        vec![
            ConfigSourceKind::Default,
            ConfigSourceKind::GitRoot,
            ConfigSourceKind::Local,
            ConfigSourceKind::Override,
        ]
    );
}

#[test]
fn missing_override_is_reported() {
    let temp = TempDir::new().expect("tempdir");
    let working_dir = canonical(temp.path());

    let err = Config::load(
        LoadOptions::default()
            .with_working_dir(working_dir.clone())
            .with_override_path("absent.toml"),
    )
    .expect_err("missing override");

    match err {
        ConfigError::OverrideNotFound { path } => {
            assert_eq!(path, working_dir.join("absent.toml"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn collects_every_validation_failure() {
    let temp = TempDir::new().expect("tempdir");
    let working_dir = canonical(temp.path());

    write_file(
        working_dir.join(".doc-archive.toml"),
        r#"
        [browse]
        page_size = 0
        page_size_options = []
        enabled_types = ["doc", "spreadsheet"]

        [scan]
        exclude = ["[broken"]
        description_limit = 0
        "#,
    );

    let err = Config::load(LoadOptions::default().with_working_dir(working_dir))
        .expect_err("validation failure");

    let ConfigError::Validation(errors) = err else {
        panic!("expected validation error");
    };
    let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
    assert_eq!(messages.len(), 5, "{messages:#?}");
    assert!(messages[0].contains("browse.page_size must be at least 1"));
    assert!(messages[1].contains("browse.page_size_options cannot be empty"));
    assert!(messages[2].starts_with("browse.enabled_types: unknown file type 'spreadsheet'"));
    assert!(messages[3].starts_with("scan.exclude: invalid glob pattern '[broken'"));
    assert!(messages[4].contains("scan.description_limit must be at least 1"));
    assert!(messages.iter().all(|m| m.contains("local config at")));
}

#[test]
fn reports_parse_errors_with_path() {
    let temp = TempDir::new().expect("tempdir");
    let working_dir = canonical(temp.path());
    let config_path = working_dir.join(".doc-archive.toml");
    write_file(&config_path, "[browse\npage_size = 3");

    let err = Config::load(LoadOptions::default().with_working_dir(working_dir))
        .expect_err("parse failure");

    match err {
        ConfigError::Parse { path, .. } => assert_eq!(path, config_path),
        other => panic!("unexpected error: {other}"),
    }
}
