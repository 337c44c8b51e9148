//! Build a document table from a directory of Markdown summaries and the
//! files they describe.
//!
//! Files are grouped by stem. Every group with a `.md` member becomes one
//! record whose metadata is read from the Markdown; the group's other files
//! supply the main download.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use chrono::{Local, NaiveDate};
use doc_archive_config::{FileType, ScanSettings};
use doc_archive_markdown::find_title;
use regex::Regex;
use walkdir::WalkDir;

use crate::error::{ArchiveError, ArchiveResult};
use crate::record::DocumentRecord;
use crate::repository::Repository;

const MAIN_FILE_PRIORITY: &[&str] = &[
    "pdf", "mp4", "webm", "jpg", "jpeg", "png", "gif", "mp3", "wav", "docx", "txt", "zip",
];
const FALLBACK_EXTENSION: &str = "pdf";
const NO_DESCRIPTION: &str = "No description available";
const UNKNOWN_SIZE: &str = "Unknown";

const CATEGORY_KEYWORDS: &[(&str, &[&str])] = &[
    ("LEAKED", &["LEAKED", "UNREDACTED"]),
    ("FEDERAL", &["FEDERAL", "FBI", "INDICTMENT"]),
    ("COURT DOCUMENT", &["COURT", "LAWSUIT", "DEPOSITION"]),
    ("EVIDENCE", &["EVIDENCE", "PHOTO", "VIDEO"]),
];
const DEFAULT_CATEGORY: &str = "DOCUMENT";

/// Scan `dir` with today's local date as the fallback document date.
pub fn scan_directory(dir: &Path, settings: &ScanSettings) -> ArchiveResult<Repository> {
    DirectoryScanner::new(settings).scan(dir)
}

/// Configurable directory scan.
pub struct DirectoryScanner<'a> {
    settings: &'a ScanSettings,
    today: NaiveDate,
    url_base: Option<String>,
}

impl<'a> DirectoryScanner<'a> {
    pub fn new(settings: &'a ScanSettings) -> Self {
        DirectoryScanner {
            settings,
            today: Local::now().date_naive(),
            url_base: None,
        }
    }

    /// Date recorded for documents that do not state one.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Prefix for `fileUrl` and `markdownUrl`. Defaults to the scanned
    /// directory as given.
    pub fn with_url_base(mut self, base: impl Into<String>) -> Self {
        self.url_base = Some(base.into());
        self
    }

    pub fn scan(&self, dir: &Path) -> ArchiveResult<Repository> {
        let groups = self.group_files(dir)?;
        let url_base = self
            .url_base
            .clone()
            .unwrap_or_else(|| default_url_base(dir));

        let mut records = Vec::new();
        for (id, group) in groups {
            let Some(markdown_path) = group.get("md") else {
                tracing::debug!(id = %id, "skipping group without markdown");
                continue;
            };
            let markdown = fs::read_to_string(markdown_path).map_err(|source| {
                ArchiveError::Io {
                    path: markdown_path.clone(),
                    source,
                }
            })?;
            records.push(self.build_record(&id, &group, &markdown, &url_base)?);
        }

        tracing::info!(
            dir = %dir.display(),
            documents = records.len(),
            "scanned document directory"
        );
        Repository::from_records(records)
    }

    fn group_files(&self, dir: &Path) -> ArchiveResult<BTreeMap<String, FileGroup>> {
        let mut groups: BTreeMap<String, FileGroup> = BTreeMap::new();

        let walker = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name();
        for entry in walker {
            let entry = entry.map_err(|err| {
                let path = err
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| dir.to_path_buf());
                ArchiveError::Io {
                    path,
                    source: err.into(),
                }
            })?;
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let relative = path.strip_prefix(dir).unwrap_or(path);
            if self.settings.exclude.matches(relative) {
                tracing::debug!(path = %relative.display(), "excluded by pattern");
                continue;
            }

            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let extension = path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or_default()
                .to_ascii_lowercase();

            groups
                .entry(stem.to_string())
                .or_default()
                .files
                .entry(extension)
                .or_insert_with(|| path.to_path_buf());
        }

        Ok(groups)
    }

    fn build_record(
        &self,
        id: &str,
        group: &FileGroup,
        markdown: &str,
        url_base: &str,
    ) -> ArchiveResult<DocumentRecord> {
        let markdown = markdown.replace("\r\n", "\n");
        let title = find_title(&markdown).unwrap_or_else(|| title_from_id(id));
        let description = extract_description(&markdown, self.settings.description_limit);
        let date = extract_date(&markdown)
            .unwrap_or_else(|| self.today.format("%Y-%m-%d").to_string());
        let category = categorize(&markdown);

        let main = MAIN_FILE_PRIORITY
            .iter()
            .find_map(|ext| group.get(ext).map(|path| (*ext, path)));

        let (extension, filename, size) = match main {
            Some((ext, path)) => {
                let size = fs::metadata(path)
                    .map(|meta| human_size(meta.len()))
                    .map_err(|source| ArchiveError::Io {
                        path: path.clone(),
                        source,
                    })?;
                (ext.to_string(), file_name(path), size)
            }
            None => (
                FALLBACK_EXTENSION.to_string(),
                format!("{id}.{FALLBACK_EXTENSION}"),
                UNKNOWN_SIZE.to_string(),
            ),
        };
        let markdown_name = group.get("md").map(|path| file_name(path)).unwrap_or_default();

        let mut record = DocumentRecord::new(
            id,
            title,
            description,
            category,
            FileType::from_extension(&extension),
        )
        .with_date(date)
        .with_size(size)
        .with_markdown_url(format!("{url_base}/{markdown_name}"));
        record.file_url = Some(format!("{url_base}/{filename}"));
        record.filename = Some(filename);
        record.extension = Some(extension);
        Ok(record)
    }
}

#[derive(Debug, Default)]
struct FileGroup {
    files: BTreeMap<String, PathBuf>,
}

impl FileGroup {
    fn get(&self, extension: &str) -> Option<&PathBuf> {
        self.files.get(extension)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn default_url_base(dir: &Path) -> String {
    let text = dir.to_string_lossy().replace('\\', "/");
    let text = text.trim_end_matches('/');
    if dir.is_absolute() || text.starts_with('.') {
        text.to_string()
    } else {
        format!("./{text}")
    }
}

/// `black-book` becomes `Black Book`.
pub fn title_from_id(id: &str) -> String {
    let spaced = id.replace('-', " ");
    let mut title = String::with_capacity(spaced.len());
    let mut previous_is_word = false;
    for ch in spaced.chars() {
        let is_word = ch.is_alphanumeric() || ch == '_';
        if is_word && !previous_is_word {
            title.extend(ch.to_uppercase());
        } else {
            title.push(ch);
        }
        previous_is_word = is_word;
    }
    title
}

fn summary_heading() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)## Summary\s*\n").expect("summary pattern must compile"))
}

fn standalone_paragraph() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\n\n([^#\n][^\n]{50,500})\n\n").expect("paragraph pattern must compile")
    })
}

fn date_line() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)(?:Document Date|Date|Published):\s*(\d{4}-\d{2}-\d{2})")
            .expect("date pattern must compile")
    })
}

/// Body of the `## Summary` section flattened to one line and cut to
/// `limit` characters; otherwise the first standalone paragraph.
pub fn extract_description(markdown: &str, limit: usize) -> String {
    if let Some(heading) = summary_heading().find(markdown) {
        let rest = &markdown[heading.end()..];
        let body = rest.find("##").map_or(rest, |end| &rest[..end]);
        let flattened = body.replace('\n', " ");
        return flattened.trim().chars().take(limit).collect();
    }

    standalone_paragraph()
        .captures(markdown)
        .and_then(|captures| captures.get(1))
        .map(|paragraph| paragraph.as_str().trim().to_string())
        .unwrap_or_else(|| NO_DESCRIPTION.to_string())
}

pub fn extract_date(markdown: &str) -> Option<String> {
    date_line()
        .captures(markdown)
        .and_then(|captures| captures.get(1))
        .map(|date| date.as_str().to_string())
}

/// First keyword group found anywhere in the text, case-insensitively.
pub fn categorize(markdown: &str) -> String {
    let upper = markdown.to_uppercase();
    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|keyword| upper.contains(keyword)))
        .map_or(DEFAULT_CATEGORY, |(category, _)| *category)
        .to_string()
}

fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 3] = ["KB", "MB", "GB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}
