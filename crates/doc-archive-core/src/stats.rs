use std::collections::HashSet;
use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;

use crate::repository::Repository;

const BYTES_PER_KB: f64 = 1024.0;
const BYTES_PER_MB: f64 = BYTES_PER_KB * 1024.0;
const BYTES_PER_GB: f64 = BYTES_PER_MB * 1024.0;

/// Summary figures for the archive header.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveStats {
    pub total_files: usize,
    pub categories: usize,
    pub total_bytes: f64,
    pub last_update: Option<NaiveDate>,
}

impl ArchiveStats {
    pub fn collect(repository: &Repository) -> Self {
        let categories: HashSet<&str> = repository
            .iter()
            .map(|record| record.category.as_str())
            .collect();

        let total_bytes = repository
            .iter()
            .filter_map(|record| record.size.as_deref())
            .map(size_in_bytes)
            .sum();

        let last_update = repository
            .iter()
            .filter_map(|record| {
                let raw = record.date.as_deref().unwrap_or("2024-01-01");
                match NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
                    Ok(date) => Some(date),
                    Err(_) => {
                        tracing::debug!(id = %record.id, date = raw, "ignoring unparseable date");
                        None
                    }
                }
            })
            .max();

        ArchiveStats {
            total_files: repository.len(),
            categories: categories.len(),
            total_bytes,
            last_update,
        }
    }

    /// Total size in gigabytes with one decimal, e.g. `1.5`.
    pub fn total_gb_text(&self) -> String {
        format!("{:.1}", self.total_bytes / BYTES_PER_GB)
    }

    /// Relative description of the newest document date as seen on `today`.
    pub fn last_update_text(&self, today: NaiveDate) -> String {
        let Some(last) = self.last_update else {
            return "Never".to_string();
        };

        let days = (today - last).num_days().max(0);
        match days {
            0 => "Today".to_string(),
            1 => "Yesterday".to_string(),
            2..=6 => format!("{days} days ago"),
            7..=29 => format!("{} weeks ago", days / 7),
            _ => last.format("%b %-d, %Y").to_string(),
        }
    }
}

/// Parse strings such as `2.4 MB` or `512kb`. Anything without a recognised
/// unit or leading number counts as zero.
pub fn size_in_bytes(size: &str) -> f64 {
    let lower = size.to_lowercase();
    let unit = if lower.contains("gb") {
        BYTES_PER_GB
    } else if lower.contains("mb") {
        BYTES_PER_MB
    } else if lower.contains("kb") {
        BYTES_PER_KB
    } else {
        return 0.0;
    };

    leading_number(&lower).map_or(0.0, |value| value * unit)
}

fn leading_number(text: &str) -> Option<f64> {
    static NUMBER: OnceLock<Regex> = OnceLock::new();
    let number = NUMBER.get_or_init(|| {
        Regex::new(r"^\s*[+-]?(?:\d+(?:\.\d*)?|\.\d+)").expect("number pattern must compile")
    });
    number
        .find(text)
        .and_then(|found| found.as_str().trim().parse::<f64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::DocumentRecord;
    use doc_archive_config::FileType;

    fn date(value: &str) -> NaiveDate {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
    }

    fn record(id: &str, category: &str) -> DocumentRecord {
        DocumentRecord::new(id, id, "", category, FileType::Doc)
    }

    #[test]
    fn parses_sizes() {
        assert_eq!(size_in_bytes("1 KB"), 1024.0);
        assert_eq!(size_in_bytes("1.5mb"), 1.5 * 1024.0 * 1024.0);
        assert_eq!(size_in_bytes(" 2 GB"), 2.0 * 1024.0 * 1024.0 * 1024.0);
        assert_eq!(size_in_bytes("Unknown"), 0.0);
        assert_eq!(size_in_bytes("many MB"), 0.0);
        assert_eq!(size_in_bytes("300 bytes"), 0.0);
    }

    #[test]
    fn collects_totals() {
        let repository = Repository::from_records([
            record("a", "LEAKED").with_size("512 MB").with_date("2024-03-01"),
            record("b", "LEAKED").with_size("1 GB").with_date("2024-05-20"),
            record("c", "FEDERAL").with_size("Unknown"),
        ])
        .unwrap();

        let stats = ArchiveStats::collect(&repository);
        assert_eq!(stats.total_files, 3);
        assert_eq!(stats.categories, 2);
        assert_eq!(stats.total_gb_text(), "1.5");
        assert_eq!(stats.last_update, Some(date("2024-05-20")));
    }

    #[test]
    fn missing_dates_count_as_start_of_2024() {
        let repository = Repository::from_records([record("a", "X")]).unwrap();
        let stats = ArchiveStats::collect(&repository);
        assert_eq!(stats.last_update, Some(date("2024-01-01")));
    }

    #[test]
    fn relative_update_text() {
        let stats = ArchiveStats {
            total_files: 1,
            categories: 1,
            total_bytes: 0.0,
            last_update: Some(date("2024-05-20")),
        };

        assert_eq!(stats.last_update_text(date("2024-05-20")), "Today");
        assert_eq!(stats.last_update_text(date("2024-05-19")), "Today");
        assert_eq!(stats.last_update_text(date("2024-05-21")), "Yesterday");
        assert_eq!(stats.last_update_text(date("2024-05-26")), "6 days ago");
        assert_eq!(stats.last_update_text(date("2024-05-27")), "1 weeks ago");
        assert_eq!(stats.last_update_text(date("2024-06-18")), "4 weeks ago");
        assert_eq!(stats.last_update_text(date("2024-06-19")), "May 20, 2024");
    }

    #[test]
    fn empty_repository() {
        let stats = ArchiveStats::collect(&Repository::default());
        assert_eq!(stats.total_files, 0);
        assert_eq!(stats.categories, 0);
        assert_eq!(stats.total_gb_text(), "0.0");
        assert_eq!(stats.last_update_text(date("2024-05-20")), "Never");
    }
}
