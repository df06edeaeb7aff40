//! Error types for the ingestion and query pipeline.

use lectern_core::RecordId;
use thiserror::Error;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Errors that can occur during ingestion and querying.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Media error: {0}")]
    Media(#[from] lectern_media::MediaError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] lectern_catalog::CatalogError),

    #[error("API error: {0}")]
    Gemini(#[from] lectern_gemini::GeminiError),

    /// None of a record's artifact files exist on disk.
    #[error("None of the artifact files exist on disk")]
    NoArtifacts,

    /// The relevance response did not match the requested shape.
    #[error("Relevance selection returned unparsable output: {0}")]
    MalformedSelection(String),

    /// Every per-record answer was empty or an error token.
    #[error("No valid answers were retrieved from the relevant records")]
    NoValidAnswers,

    /// The final synthesis call failed; the per-record context survives so
    /// the caller can still show it.
    #[error("Failed to synthesize a final answer: {reason}")]
    SynthesisFailed { reason: String, context: String },

    #[error("No record with id {0} in the catalog")]
    UnknownRecord(RecordId),
}
