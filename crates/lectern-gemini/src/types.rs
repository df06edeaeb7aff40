//! Request and response types for the Generative Language API.

use serde::{Deserialize, Serialize};

/// Handle to a file registered with the service.
///
/// Returned by upload and referenced from generate requests. Handles are
/// short-lived on the server side, so they are requested fresh per command
/// rather than persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileHandle {
    pub uri: String,
    pub mime_type: String,
}

/// One part of a request: literal text or a reference to an uploaded file.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
    },
    File {
        #[serde(rename = "fileData")]
        file_data: FileData,
    },
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text { text: text.into() }
    }

    pub fn file(handle: &FileHandle) -> Self {
        Part::File {
            file_data: FileData {
                mime_type: handle.mime_type.clone(),
                file_uri: handle.uri.clone(),
            },
        }
    }

    /// Whether this part references an uploaded file.
    pub fn is_file(&self) -> bool {
        matches!(self, Part::File { .. })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FileData {
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    #[serde(rename = "fileUri")]
    pub file_uri: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
pub(crate) struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

/// Constrains a response to JSON matching a schema.
#[derive(Debug, Serialize)]
pub(crate) struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    pub response_mime_type: String,
    #[serde(rename = "responseSchema")]
    pub response_schema: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Candidate {
    pub content: CandidateContent,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CandidatePart {
    #[serde(default)]
    pub text: String,
}

/// Text of the first candidate, with all of its parts joined.
pub(crate) fn response_text(response: GenerateContentResponse) -> String {
    response
        .candidates
        .into_iter()
        .next()
        .map(|candidate| {
            candidate
                .content
                .parts
                .into_iter()
                .map(|part| part.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default()
}

// Resumable upload handshake.

#[derive(Debug, Serialize)]
pub(crate) struct UploadStartRequest {
    pub file: UploadFileMeta,
}

#[derive(Debug, Serialize)]
pub(crate) struct UploadFileMeta {
    #[serde(rename = "displayName")]
    pub display_name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UploadResponse {
    pub file: UploadedFile,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UploadedFile {
    pub uri: String,
    #[serde(rename = "mimeType", default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}
