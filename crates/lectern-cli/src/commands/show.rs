//! Show command - display one record in full.

use super::load_config;
use anyhow::Result;
use colored::Colorize;
use lectern_catalog::Catalog;
use lectern_core::RecordId;

pub fn run(id: RecordId) -> Result<()> {
    let config = load_config()?;
    let catalog = Catalog::load(&config.storage.catalog_path());

    let record = match catalog.get(id) {
        Some(record) => record,
        None => anyhow::bail!("No record with id {}. See 'lectern list'.", id),
    };

    println!("{}", record.filename.white().bold());
    println!("{}", "─".repeat(70));

    println!("  {}: {}", "ID".cyan(), id);
    println!("  {}: {}", "Type".cyan(), record.kind);
    println!(
        "  {}: {}",
        "Added".cyan(),
        record.added_at.format("%Y-%m-%d %H:%M:%S")
    );

    println!("  {}:", "Artifacts".cyan());
    for artifact in &record.artifacts {
        let marker = if artifact.exists() {
            "✓".green()
        } else {
            "missing".red()
        };
        println!("    {} {}", artifact.display(), marker);
    }

    if let Some(ref archive) = record.archive {
        println!("  {}: {}", "Archive".cyan(), archive.display());
    }

    println!();
    if record.is_indexed() {
        println!("{}", "Index Summary".white().bold());
        println!("{}", "─".repeat(70));
        println!("{}", record.summary);
    } else if record.summary.is_empty() {
        println!("{}", "Not indexed yet.".yellow());
    } else {
        println!(
            "{} {}",
            "Indexing failed.".red(),
            format!("Retry with 'lectern reindex {}'.", id).dimmed()
        );
    }

    Ok(())
}
