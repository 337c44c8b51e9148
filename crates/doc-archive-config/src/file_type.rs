use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Broad media class of an archived document.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Doc,
    Img,
    Video,
    Audio,
}

const DOC_EXTENSIONS: &[&str] = &[
    "pdf", "doc", "docx", "txt", "rtf", "odt", "xls", "xlsx", "ppt", "pptx", "csv",
];
const IMG_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "bmp", "webp", "svg", "tiff", "ico", "raw",
];
const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "avi", "mkv", "mov", "wmv", "flv", "webm", "m4v", "3gp",
];
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "flac", "aac", "ogg", "wma", "m4a"];

impl FileType {
    pub const ALL: [FileType; 4] = [
        FileType::Doc,
        FileType::Img,
        FileType::Video,
        FileType::Audio,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FileType::Doc => "doc",
            FileType::Img => "img",
            FileType::Video => "video",
            FileType::Audio => "audio",
        }
    }

    /// Human-readable label used by presentation layers.
    pub fn label(self) -> &'static str {
        match self {
            FileType::Doc => "Document",
            FileType::Img => "Image",
            FileType::Video => "Video",
            FileType::Audio => "Audio",
        }
    }

    /// File extensions (lowercase, without the dot) that belong to this type.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            FileType::Doc => DOC_EXTENSIONS,
            FileType::Img => IMG_EXTENSIONS,
            FileType::Video => VIDEO_EXTENSIONS,
            FileType::Audio => AUDIO_EXTENSIONS,
        }
    }

    /// Classify a file extension, defaulting to `Doc` for anything unknown.
    pub fn from_extension(extension: &str) -> FileType {
        let normalized = extension.trim_start_matches('.').to_ascii_lowercase();
        FileType::ALL
            .into_iter()
            .find(|file_type| file_type.extensions().contains(&normalized.as_str()))
            .unwrap_or(FileType::Doc)
    }

    /// Parse a type name, returning `None` when it is not one of the four
    /// recognised variants.
    pub fn recognise(value: &str) -> Option<FileType> {
        value.parse().ok()
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string names no known file type.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("unknown file type '{0}' (expected doc, img, video or audio)")]
pub struct UnknownFileType(pub String);

impl FromStr for FileType {
    type Err = UnknownFileType;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "doc" => Ok(FileType::Doc),
            "img" => Ok(FileType::Img),
            "video" => Ok(FileType::Video),
            "audio" => Ok(FileType::Audio),
            _ => Err(UnknownFileType(value.to_string())),
        }
    }
}
