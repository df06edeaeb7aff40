//! Reindex command - regenerate one record's index summary.

use super::{load_config, runtime};
use anyhow::{Context, Result};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use lectern_catalog::Catalog;
use lectern_core::RecordId;
use lectern_gemini::GeminiClient;
use lectern_media::MediaNormalizer;
use lectern_pipeline::{Ingestor, PipelineConfig};

pub fn run(id: RecordId) -> Result<()> {
    let config = load_config()?;
    let client = GeminiClient::from_config(&config.gemini)
        .context("Failed to create API client")?;

    let catalog_path = config.storage.catalog_path();
    let mut catalog = Catalog::load(&catalog_path);

    // Reindexing only re-reads stored artifacts, so the encoder is not
    // checked here.
    let normalizer = MediaNormalizer::new(&config.media.ffmpeg_path, config.storage.library_path());
    let pipeline_config = PipelineConfig::from_config(&config);
    let ingestor = Ingestor::new(&normalizer, &client, &pipeline_config);

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(format!("Reindexing record {}...", id));
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    let rt = runtime()?;
    let result = rt.block_on(ingestor.reindex(&mut catalog, &catalog_path, id));
    pb.finish_and_clear();

    let summary = result?;

    println!("{} record {}", "Reindexed:".green().bold(), id);
    println!();
    println!("{}", summary);

    Ok(())
}
