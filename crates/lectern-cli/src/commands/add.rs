//! Add command - normalize, index, and catalog lecture files.

use super::{load_config, runtime};
use anyhow::{Context, Result};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use lectern_catalog::Catalog;
use lectern_core::MediaKind;
use lectern_gemini::GeminiClient;
use lectern_media::MediaNormalizer;
use lectern_pipeline::{Ingestor, PipelineConfig};
use std::path::PathBuf;

pub fn run(
    documents: Vec<PathBuf>,
    videos: Vec<PathBuf>,
    audio: Vec<PathBuf>,
    images: Vec<PathBuf>,
    text: Vec<PathBuf>,
) -> Result<()> {
    let (documents, skipped) = classify_documents(documents);

    for (path, detected) in &skipped {
        match detected {
            Some(kind) => println!(
                "{} '{}' looks like {} material. Pass it with {}.",
                "Warning:".yellow().bold(),
                path.display(),
                kind.as_str().to_lowercase(),
                flag_for(*kind).cyan()
            ),
            None => println!(
                "{} Unrecognized extension for positional file '{}'. Use {}, {}, {}, or {} if it belongs in the library.",
                "Warning:".yellow().bold(),
                path.display(),
                "--videos".cyan(),
                "--audio".cyan(),
                "--images".cyan(),
                "--text".cyan()
            ),
        }
    }

    let batches = [
        (MediaKind::Pdf, documents),
        (MediaKind::Video, videos),
        (MediaKind::Audio, audio),
        (MediaKind::Image, images),
        (MediaKind::Text, text),
    ];
    let total: usize = batches.iter().map(|(_, files)| files.len()).sum();
    tracing::debug!("{} file(s) queued across {} kinds", total, batches.len());

    if total == 0 {
        println!("{}", "No files specified to add.".yellow());
        println!(
            "{}",
            "Pass document paths directly, or use --videos, --audio, --images, --text.".dimmed()
        );
        return Ok(());
    }

    let config = load_config()?;

    // The encoder check runs before anything is touched so a missing
    // ffmpeg cannot fail a batch halfway through.
    let normalizer = MediaNormalizer::new(&config.media.ffmpeg_path, config.storage.library_path());
    normalizer.ensure_encoder()?;

    let client = GeminiClient::from_config(&config.gemini)
        .context("Failed to create API client")?;
    let pipeline_config = PipelineConfig::from_config(&config);
    let ingestor = Ingestor::new(&normalizer, &client, &pipeline_config);

    let catalog_path = config.storage.catalog_path();
    let mut catalog = Catalog::load(&catalog_path);

    let rt = runtime()?;

    let mut added = 0usize;
    let mut failed = 0usize;

    for (kind, files) in batches {
        for path in files {
            let pb = ProgressBar::new_spinner();
            pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
            pb.set_message(format!("Adding {} ({})", path.display(), kind));
            pb.enable_steady_tick(std::time::Duration::from_millis(100));

            let result = rt.block_on(ingestor.ingest_file(&mut catalog, &catalog_path, &path, kind));
            pb.finish_and_clear();

            match result {
                Ok(id) => {
                    added += 1;
                    let record = catalog.get(id);
                    println!(
                        "{} {} {}",
                        "Added:".green().bold(),
                        record.map(|r| r.filename.as_str()).unwrap_or_default(),
                        format!("[{}]", id).dimmed()
                    );
                    match record {
                        Some(r) if r.is_indexed() => {
                            let preview = truncate(&r.summary, 80);
                            println!("  {}", preview.dimmed());
                        }
                        _ => println!(
                            "  {} Summary not generated. Retry with '{}'.",
                            "Note:".yellow(),
                            format!("lectern reindex {}", id).cyan()
                        ),
                    }
                }
                Err(e) => {
                    failed += 1;
                    println!("{} {}: {}", "Failed:".red().bold(), path.display(), e);
                }
            }
        }
    }

    println!();
    if failed == 0 {
        println!("{} {} file(s) added.", "Done:".green().bold(), added);
    } else {
        println!(
            "{} {} file(s) added, {} failed.",
            "Done:".yellow().bold(),
            added,
            failed
        );
    }

    Ok(())
}

fn flag_for(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Video => "--videos",
        MediaKind::Audio => "--audio",
        MediaKind::Image => "--images",
        MediaKind::Text => "--text",
        MediaKind::Pdf => "--text",
    }
}

/// Split positional files into documents and everything else, detecting
/// the kind of each skipped file where the extension allows it.
fn classify_documents(paths: Vec<PathBuf>) -> (Vec<PathBuf>, Vec<(PathBuf, Option<MediaKind>)>) {
    let mut documents = Vec::new();
    let mut skipped = Vec::new();

    for path in paths {
        let detected = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(MediaKind::from_extension);

        match detected {
            Some(MediaKind::Pdf) => documents.push(path),
            other => skipped.push((path, other)),
        }
    }

    (documents, skipped)
}

/// Truncate a string to a maximum display length.
fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_detects_documents() {
        let (documents, skipped) = classify_documents(vec![
            PathBuf::from("notes.pdf"),
            PathBuf::from("slides.PDF"),
        ]);

        assert_eq!(documents.len(), 2);
        assert!(skipped.is_empty());
    }

    #[test]
    fn test_classify_flags_other_kinds() {
        let (documents, skipped) = classify_documents(vec![
            PathBuf::from("lecture.mp4"),
            PathBuf::from("mystery.xyz"),
        ]);

        assert!(documents.is_empty());
        assert_eq!(skipped.len(), 2);
        assert_eq!(skipped[0].1, Some(MediaKind::Video));
        assert_eq!(skipped[1].1, None);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Short summary.", 80), "Short summary.");

        let long = "x".repeat(100);
        let cut = truncate(&long, 80);
        assert_eq!(cut.len(), 80);
        assert!(cut.ends_with("..."));
    }

    #[test]
    fn test_truncate_multibyte_summary() {
        // 'é' spans bytes 76..78; the cut must land on a char boundary.
        let summary = format!("{}é plus trailing context", "a".repeat(76));
        let cut = truncate(&summary, 80);

        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), 80);
        assert_eq!(cut.chars().nth(76), Some('é'));
    }
}
