//! Lectern Pipeline - Ingestion and query orchestration.
//!
//! This crate ties the other pieces together:
//! - Ingestion: normalize an upload, summarize it, persist the record
//! - Querying: select relevant records, answer per record, synthesize
//!
//! Both sides talk to the generative service through the
//! [`GenerativeModel`](lectern_gemini::GenerativeModel) seam, so the
//! orchestration is testable without a network.

mod error;
mod indexer;
mod ingest;
mod query;
mod selector;
mod synthesizer;

#[cfg(test)]
mod testing;

pub use error::{PipelineError, PipelineResult};
pub use indexer::ContentIndexer;
pub use ingest::Ingestor;
pub use query::{QueryOutcome, QueryPipeline};
pub use selector::RelevanceSelector;
pub use synthesizer::AnswerSynthesizer;

/// Model names used by the pipeline stages.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Model for requests that carry uploaded media.
    pub media_model: String,
    /// Model for text-only requests: relevance selection and synthesis.
    pub text_model: String,
}

impl PipelineConfig {
    pub fn from_config(config: &lectern_config::Config) -> Self {
        Self {
            media_model: config.gemini.model.clone(),
            text_model: config.gemini.text_model.clone(),
        }
    }
}
