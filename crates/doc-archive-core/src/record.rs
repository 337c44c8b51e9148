use doc_archive_config::FileType;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// One entry of the archive's metadata table.
///
/// Only `id`, `title`, `description`, `category` and `file_type` take part in
/// filtering. The remaining fields are carried through untouched; unknown keys
/// land in `extra` so a load/save cycle keeps them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default = "default_file_type", deserialize_with = "lenient_file_type")]
    pub file_type: FileType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markdown_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    /// File extension of the main file, serialized as `type`.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DocumentRecord {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
        file_type: FileType,
    ) -> Self {
        DocumentRecord {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            category: category.into(),
            file_type,
            filename: None,
            file_url: None,
            markdown_url: None,
            date: None,
            size: None,
            extension: None,
            extra: Map::new(),
        }
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    pub fn with_markdown_url(mut self, url: impl Into<String>) -> Self {
        self.markdown_url = Some(url.into());
        self
    }

    /// Case-insensitive substring match against title, description and
    /// category. `needle` must already be lower-cased.
    pub(crate) fn matches_lowercase(&self, needle: &str) -> bool {
        [&self.title, &self.description, &self.category]
            .into_iter()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

fn default_file_type() -> FileType {
    FileType::Doc
}

fn lenient_file_type<'de, D>(deserializer: D) -> Result<FileType, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    let parsed = match &raw {
        Some(Value::String(name)) => FileType::recognise(name),
        _ => None,
    };

    Ok(parsed.unwrap_or_else(|| {
        if let Some(value) = &raw {
            tracing::warn!(file_type = %value, "unrecognised file type, treating as doc");
        }
        FileType::Doc
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_camel_case_shape() {
        let record: DocumentRecord = serde_json::from_value(json!({
            "id": "flight-logs",
            "title": "Flight Logs",
            "description": "Passenger manifests",
            "filename": "flight-logs.pdf",
            "fileUrl": "./src/docs/flight-logs.pdf",
            "markdownUrl": "./src/docs/flight-logs.md",
            "date": "2019-07-08",
            "size": "2.4 MB",
            "type": "pdf",
            "category": "EVIDENCE",
            "fileType": "doc"
        }))
        .unwrap();

        assert_eq!(record.file_type, FileType::Doc);
        assert_eq!(record.extension.as_deref(), Some("pdf"));
        assert_eq!(
            record.markdown_url.as_deref(),
            Some("./src/docs/flight-logs.md")
        );
        assert!(record.extra.is_empty());
    }

    #[test]
    fn unknown_or_missing_file_type_becomes_doc() {
        let unknown: DocumentRecord =
            serde_json::from_value(json!({"id": "a", "fileType": "hologram"})).unwrap();
        let numeric: DocumentRecord =
            serde_json::from_value(json!({"id": "b", "fileType": 7})).unwrap();
        let missing: DocumentRecord = serde_json::from_value(json!({"id": "c"})).unwrap();

        assert_eq!(unknown.file_type, FileType::Doc);
        assert_eq!(numeric.file_type, FileType::Doc);
        assert_eq!(missing.file_type, FileType::Doc);
    }

    #[test]
    fn keeps_unknown_keys_when_serialized() {
        let record: DocumentRecord =
            serde_json::from_value(json!({"id": "a", "fileType": "img", "pages": 12})).unwrap();
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["pages"], json!(12));
        assert_eq!(value["fileType"], json!("img"));
        assert!(value.get("size").is_none());
    }

    #[test]
    fn matches_any_searchable_field() {
        let record = DocumentRecord::new("x", "Court Filing", "Sealed", "LEAKED", FileType::Doc);
        assert!(record.matches_lowercase("filing"));
        assert!(record.matches_lowercase("seal"));
        assert!(record.matches_lowercase("leak"));
        assert!(!record.matches_lowercase("x"));
    }
}
