//! Ingestion: normalize a source file, index it, persist the record.

use crate::error::{PipelineError, PipelineResult};
use crate::indexer::ContentIndexer;
use crate::PipelineConfig;
use lectern_catalog::Catalog;
use lectern_core::{MediaKind, Record, RecordId, SUMMARY_FAILED};
use lectern_gemini::GenerativeModel;
use lectern_media::MediaNormalizer;
use std::path::Path;
use tracing::{info, warn};

/// Orchestrates adding files to the archive.
pub struct Ingestor<'a, M: GenerativeModel> {
    normalizer: &'a MediaNormalizer,
    model: &'a M,
    config: &'a PipelineConfig,
}

impl<'a, M: GenerativeModel> Ingestor<'a, M> {
    pub fn new(normalizer: &'a MediaNormalizer, model: &'a M, config: &'a PipelineConfig) -> Self {
        Self {
            normalizer,
            model,
            config,
        }
    }

    /// Normalize, index, and persist one source file, returning the new id.
    ///
    /// Normalization failure creates nothing. Indexing failure still creates
    /// the record, with the failure sentinel as its summary, so the
    /// artifacts survive for a later `reindex`.
    pub async fn ingest_file(
        &self,
        catalog: &mut Catalog,
        catalog_path: &Path,
        source: &Path,
        kind: MediaKind,
    ) -> PipelineResult<RecordId> {
        let id = catalog.next_id();
        info!("Ingesting {} as {} record {}", source.display(), kind, id);

        let normalized = self.normalizer.normalize(source, kind, id)?;

        let indexer = ContentIndexer::new(self.model, &self.config.media_model);
        let summary = match indexer.index(&normalized.artifacts).await {
            Ok(summary) => summary,
            Err(e) => {
                warn!("Indexing failed for {}: {}", source.display(), e);
                SUMMARY_FAILED.to_string()
            }
        };

        let mut record = Record::new(kind, source_name(source))
            .with_artifacts(normalized.artifacts)
            .with_summary(summary);
        if let Some(archive) = normalized.archive {
            record = record.with_archive(archive);
        }

        catalog.insert(id, record);
        catalog.save(catalog_path)?;
        info!("Added record {}", id);
        Ok(id)
    }

    /// Re-run indexing over an existing record's artifacts.
    ///
    /// Only the summary changes; a failure leaves the stored summary as it
    /// was.
    pub async fn reindex(
        &self,
        catalog: &mut Catalog,
        catalog_path: &Path,
        id: RecordId,
    ) -> PipelineResult<String> {
        let artifacts = catalog
            .get(id)
            .ok_or(PipelineError::UnknownRecord(id))?
            .artifacts
            .clone();

        let indexer = ContentIndexer::new(self.model, &self.config.media_model);
        let summary = indexer.index(&artifacts).await?;

        if let Some(record) = catalog.get_mut(id) {
            record.summary = summary.clone();
        }
        catalog.save(catalog_path)?;
        info!("Re-indexed record {}", id);
        Ok(summary)
    }
}

fn source_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload")
        .to_string()
}
