use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde_json::{Map, Value};

use crate::error::{ArchiveError, ArchiveResult};
use crate::record::DocumentRecord;

/// Ordered, read-only table of documents keyed by id.
///
/// Iteration follows load order. For the object form of the table that is
/// the key order of the source JSON.
#[derive(Clone, Debug, Default)]
pub struct Repository {
    records: Vec<DocumentRecord>,
    index: HashMap<String, usize>,
}

impl Repository {
    /// Build a repository, rejecting duplicate ids.
    pub fn from_records<I>(records: I) -> ArchiveResult<Self>
    where
        I: IntoIterator<Item = DocumentRecord>,
    {
        let mut repository = Repository::default();
        for record in records {
            if repository.index.contains_key(&record.id) {
                return Err(ArchiveError::DuplicateId { id: record.id });
            }
            repository
                .index
                .insert(record.id.clone(), repository.records.len());
            repository.records.push(record);
        }
        Ok(repository)
    }

    /// Read a JSON document table from disk.
    pub fn load(path: &Path) -> ArchiveResult<Self> {
        let contents = fs::read_to_string(path).map_err(|source| ArchiveError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let value: Value =
            serde_json::from_str(&contents).map_err(|source| ArchiveError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        let repository = Self::from_json_value(value)?;
        tracing::info!(
            path = %path.display(),
            documents = repository.len(),
            "loaded document table"
        );
        Ok(repository)
    }

    pub fn from_json_str(contents: &str) -> ArchiveResult<Self> {
        let value: Value = serde_json::from_str(contents)?;
        Self::from_json_value(value)
    }

    /// Accepts either `{ "<id>": record, ... }` or `[record, ...]`.
    ///
    /// In the object form a record without an `id` takes its key; a record
    /// whose `id` disagrees with its key is rejected.
    pub fn from_json_value(value: Value) -> ArchiveResult<Self> {
        match value {
            Value::Object(entries) => {
                let mut records = Vec::with_capacity(entries.len());
                for (key, entry) in entries {
                    let mut record = parse_record(&key, entry)?;
                    if record.id.is_empty() {
                        record.id = key;
                    } else if record.id != key {
                        return Err(ArchiveError::MismatchedId { key, id: record.id });
                    }
                    records.push(record);
                }
                Self::from_records(records)
            }
            Value::Array(entries) => {
                let mut records = Vec::with_capacity(entries.len());
                for (position, entry) in entries.into_iter().enumerate() {
                    let record = parse_record(&format!("#{position}"), entry)?;
                    records.push(record);
                }
                Self::from_records(records)
            }
            _ => Err(ArchiveError::InvalidShape),
        }
    }

    /// Serialize back to the object-keyed table shape.
    pub fn to_json_value(&self) -> ArchiveResult<Value> {
        let mut entries = Map::new();
        for record in &self.records {
            entries.insert(record.id.clone(), serde_json::to_value(record)?);
        }
        Ok(Value::Object(entries))
    }

    pub fn get(&self, id: &str) -> Option<&DocumentRecord> {
        self.index.get(id).map(|&position| &self.records[position])
    }

    pub fn iter(&self) -> impl Iterator<Item = &DocumentRecord> {
        self.records.iter()
    }

    pub fn records(&self) -> &[DocumentRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn parse_record(key: &str, entry: Value) -> ArchiveResult<DocumentRecord> {
    serde_json::from_value(entry).map_err(|source| ArchiveError::InvalidRecord {
        key: key.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use doc_archive_config::FileType;

    #[test]
    fn object_form_keeps_key_order_and_fills_ids() {
        let repository = Repository::from_json_str(
            r#"{
                "zeta": {"title": "Zeta", "fileType": "video"},
                "alpha": {"id": "alpha", "title": "Alpha"}
            }"#,
        )
        .unwrap();

        let ids: Vec<_> = repository.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["zeta", "alpha"]);
        assert_eq!(repository.get("zeta").unwrap().file_type, FileType::Video);
        assert!(repository.get("missing").is_none());
    }

    #[test]
    fn array_form_is_accepted() {
        let repository =
            Repository::from_json_str(r#"[{"id": "a"}, {"id": "b", "fileType": "audio"}]"#)
                .unwrap();
        assert_eq!(repository.len(), 2);
        assert_eq!(repository.get("b").unwrap().file_type, FileType::Audio);
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = Repository::from_json_str(r#"[{"id": "a"}, {"id": "a"}]"#).unwrap_err();
        assert!(matches!(err, ArchiveError::DuplicateId { id } if id == "a"));
    }

    #[test]
    fn rejects_mismatched_keys_and_bad_shapes() {
        let err = Repository::from_json_str(r#"{"a": {"id": "b"}}"#).unwrap_err();
        assert!(matches!(err, ArchiveError::MismatchedId { .. }));

        let err = Repository::from_json_str("42").unwrap_err();
        assert!(matches!(err, ArchiveError::InvalidShape));

        let err = Repository::from_json_str(r#"{"a": {"title": 3}}"#).unwrap_err();
        assert!(matches!(err, ArchiveError::InvalidRecord { key, .. } if key == "a"));
    }

    #[test]
    fn empty_table_is_valid() {
        let repository = Repository::from_json_str("{}").unwrap();
        assert!(repository.is_empty());
    }
}
