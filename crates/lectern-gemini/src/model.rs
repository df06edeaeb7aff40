//! The narrow seam the pipeline holds against the generative service.

use crate::client::GeminiClient;
use crate::error::GeminiResult;
use crate::types::{FileHandle, Part};
use async_trait::async_trait;
use std::path::Path;

/// What the pipeline needs from the generative service: register files,
/// generate free text, generate schema-bound JSON.
///
/// [`GeminiClient`] is the production implementation; tests script a double
/// so orchestration can be exercised without the network.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Register a local file with the service ahead of referencing it.
    async fn upload(&self, path: &Path) -> GeminiResult<FileHandle>;

    /// One free-text round trip. Retries are the implementation's business.
    async fn generate(&self, model: &str, parts: &[Part]) -> GeminiResult<String>;

    /// One JSON round trip constrained to `schema`.
    async fn generate_structured(
        &self,
        model: &str,
        parts: &[Part],
        schema: &serde_json::Value,
    ) -> GeminiResult<String>;
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    async fn upload(&self, path: &Path) -> GeminiResult<FileHandle> {
        self.upload_file(path).await
    }

    async fn generate(&self, model: &str, parts: &[Part]) -> GeminiResult<String> {
        GeminiClient::generate(self, model, parts).await
    }

    async fn generate_structured(
        &self,
        model: &str,
        parts: &[Part],
        schema: &serde_json::Value,
    ) -> GeminiResult<String> {
        GeminiClient::generate_structured(self, model, parts, schema).await
    }
}
