//! Core domain types for Lectern.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Identifier for catalog records.
///
/// Ids are dense positive integers: the first record gets 1, and a catalog
/// holding N records hands out N + 1 next. Ids are never reused, which only
/// holds because records are never deleted.
pub type RecordId = u32;

/// Summary stored when indexing did not produce usable text. Records carrying
/// this value are kept in the catalog so `reindex` can retry them later.
pub const SUMMARY_FAILED: &str = "Error: Summary not generated.";

/// Prefix marking a per-record answer that is an error token rather than
/// real content. Synthesis filters these out.
pub const ERROR_MARKER: &str = "Error:";

/// Kind of lecture material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaKind {
    Video,
    Audio,
    Image,
    Text,
    #[serde(rename = "PDF")]
    Pdf,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Video => "Video",
            MediaKind::Audio => "Audio",
            MediaKind::Image => "Image",
            MediaKind::Text => "Text",
            MediaKind::Pdf => "PDF",
        }
    }

    /// Detect media kind from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            // Video formats
            "mp4" | "mov" | "mkv" | "webm" | "avi" | "m4v" => Some(MediaKind::Video),
            // Audio formats
            "mp3" | "wav" | "m4a" | "flac" | "ogg" | "opus" | "aac" => Some(MediaKind::Audio),
            // Image formats
            "png" | "jpg" | "jpeg" | "gif" | "webp" | "bmp" => Some(MediaKind::Image),
            "pdf" => Some(MediaKind::Pdf),
            // Plain text, notes, and code
            "txt" | "md" | "markdown" | "org" | "rs" | "py" | "js" | "ts" | "go" | "c" | "cpp"
            | "h" | "java" | "rb" | "sh" | "json" | "yaml" | "yml" | "toml" | "html" | "css"
            | "sql" => Some(MediaKind::Text),
            _ => None,
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One indexed unit of lecture content.
///
/// Field names on the wire are the capitalized legacy names so existing
/// catalog files keep loading; `added_at` defaults when absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    /// Display name shown in listings. Not unique.
    #[serde(rename = "Filename")]
    pub filename: String,
    #[serde(rename = "Type")]
    pub kind: MediaKind,
    /// Analysis-ready files derived from the upload, in the order they are
    /// sent for indexing.
    #[serde(rename = "Path")]
    pub artifacts: Vec<PathBuf>,
    /// Archived original, present only when normalization was lossy.
    #[serde(rename = "Archive", with = "archive_path", default)]
    pub archive: Option<PathBuf>,
    #[serde(rename = "index_summary", default)]
    pub summary: String,
    #[serde(default = "Utc::now")]
    pub added_at: DateTime<Utc>,
}

impl Record {
    pub fn new(kind: MediaKind, filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            kind,
            artifacts: Vec::new(),
            archive: None,
            summary: String::new(),
            added_at: Utc::now(),
        }
    }

    pub fn with_artifacts(mut self, artifacts: Vec<PathBuf>) -> Self {
        self.artifacts = artifacts;
        self
    }

    pub fn with_archive(mut self, path: impl Into<PathBuf>) -> Self {
        self.archive = Some(path.into());
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    /// Whether indexing produced a usable summary for this record.
    pub fn is_indexed(&self) -> bool {
        !self.summary.is_empty() && !self.summary.starts_with(ERROR_MARKER)
    }
}

/// `Archive` is a plain string on the wire, empty when there is no archived
/// original.
mod archive_path {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::path::PathBuf;

    pub fn serialize<S>(value: &Option<PathBuf>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(path) => serializer.serialize_str(&path.to_string_lossy()),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<PathBuf>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        if raw.is_empty() {
            Ok(None)
        } else {
            Ok(Some(PathBuf::from(raw)))
        }
    }
}
