//! Error types for Generative Language API operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when talking to the API.
#[derive(Error, Debug)]
pub enum GeminiError {
    /// No API key in the config file or the environment.
    #[error("API key not found. Set GEMINI_API_KEY or add api_key to the [gemini] config section.")]
    MissingApiKey,

    /// Request timeout.
    #[error("Request timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    /// API returned an error response.
    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    /// A local file could not be read for upload.
    #[error("Failed to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The resumable upload handshake went off-script.
    #[error("Upload protocol error: {0}")]
    UploadProtocol(String),

    /// The API answered but produced no usable text.
    #[error("Received an empty response from the API")]
    EmptyResponse,

    /// Every attempt of a retried call failed; carries the last error.
    #[error("API call failed after {attempts} attempts: {message}")]
    RetriesExhausted { attempts: u32, message: String },

    /// HTTP request error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for API operations.
pub type GeminiResult<T> = Result<T, GeminiError>;
