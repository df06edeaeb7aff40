//! Summary generation over a record's artifacts.

use crate::error::{PipelineError, PipelineResult};
use lectern_gemini::{GenerativeModel, Part};
use std::path::PathBuf;
use tracing::{info, warn};

/// Instruction sent alongside the artifact files when building a summary.
const INDEX_PROMPT: &str = "Analyze this lecture and provide a concise summary including the \
main topics discussed, key concepts, definitions, and any specific examples mentioned. \
Format the output clearly.";

/// Builds the searchable summary for a record's artifacts.
pub struct ContentIndexer<'a, M: GenerativeModel> {
    model: &'a M,
    model_name: &'a str,
}

impl<'a, M: GenerativeModel> ContentIndexer<'a, M> {
    pub fn new(model: &'a M, model_name: &'a str) -> Self {
        Self { model, model_name }
    }

    /// Upload the artifacts and summarize them in one generate call.
    ///
    /// Artifacts missing from disk are skipped with a warning; the call
    /// fails only when none remain or the service produces nothing.
    pub async fn index(&self, artifacts: &[PathBuf]) -> PipelineResult<String> {
        let available = existing_files(artifacts);
        if available.is_empty() {
            return Err(PipelineError::NoArtifacts);
        }

        let mut parts = vec![Part::text(INDEX_PROMPT)];
        for file in &available {
            parts.push(Part::file(&self.model.upload(file).await?));
        }

        info!("Artifacts uploaded, generating index summary");
        let summary = self.model.generate(self.model_name, &parts).await?;
        Ok(summary)
    }
}

/// Paths that exist on disk. The rest are logged and dropped, so one
/// manually deleted artifact does not sink the whole record.
pub(crate) fn existing_files(paths: &[PathBuf]) -> Vec<PathBuf> {
    paths
        .iter()
        .filter(|path| {
            let present = path.exists();
            if !present {
                warn!("Artifact {} does not exist, skipping", path.display());
            }
            present
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Call, ScriptedModel};

    #[tokio::test]
    async fn test_index_summarizes_existing_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = dir.path().join("1.notes.txt");
        std::fs::write(&artifact, "big-O notation").unwrap();

        let model = ScriptedModel::new();
        model.push_text("Covers asymptotic complexity.");

        let indexer = ContentIndexer::new(&model, "models/test");
        let summary = indexer.index(&[artifact]).await.unwrap();

        assert_eq!(summary, "Covers asymptotic complexity.");
        assert_eq!(
            model.calls(),
            vec![Call::Upload("1.notes.txt".to_string()), Call::Generate]
        );
    }

    #[tokio::test]
    async fn test_index_skips_missing_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("1.a.txt");
        std::fs::write(&present, "content").unwrap();
        let missing = dir.path().join("1.gone.txt");

        let model = ScriptedModel::new();
        model.push_text("Summary.");

        let indexer = ContentIndexer::new(&model, "models/test");
        let summary = indexer.index(&[missing, present]).await.unwrap();

        assert_eq!(summary, "Summary.");
        // Only the surviving artifact was uploaded.
        assert_eq!(
            model.calls(),
            vec![Call::Upload("1.a.txt".to_string()), Call::Generate]
        );
    }

    #[tokio::test]
    async fn test_index_fails_without_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let model = ScriptedModel::new();

        let indexer = ContentIndexer::new(&model, "models/test");
        let result = indexer.index(&[dir.path().join("void.txt")]).await;

        assert!(matches!(result, Err(PipelineError::NoArtifacts)));
        assert!(model.calls().is_empty());
    }

    #[tokio::test]
    async fn test_index_propagates_generation_failure() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = dir.path().join("1.a.txt");
        std::fs::write(&artifact, "content").unwrap();

        let model = ScriptedModel::new();
        model.push_failure("model overloaded");

        let indexer = ContentIndexer::new(&model, "models/test");
        let result = indexer.index(&[artifact]).await;

        assert!(matches!(result, Err(PipelineError::Gemini(_))));
    }
}
