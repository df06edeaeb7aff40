//! List command - one line per catalog record.

use super::load_config;
use anyhow::Result;
use colored::Colorize;
use lectern_catalog::Catalog;
use lectern_core::{MediaKind, Record};

pub fn run() -> Result<()> {
    let config = load_config()?;
    let catalog = Catalog::load(&config.storage.catalog_path());

    if catalog.is_empty() {
        println!(
            "{}",
            "No lectures yet. Use 'lectern add' to index some material.".dimmed()
        );
        return Ok(());
    }

    println!("{}", "Lecture Library".cyan().bold());
    println!("{}", "─".repeat(70));

    for (id, record) in catalog.iter() {
        println!(
            "{}  {} {} {} {}",
            format!("{:>4}", id).bold(),
            kind_icon(record.kind),
            record.filename.white().bold(),
            index_state(record),
            record.added_at.format("%Y-%m-%d").to_string().dimmed()
        );
    }

    println!();
    println!("{} record(s)", catalog.len());

    Ok(())
}

fn kind_icon(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Video => "🎬",
        MediaKind::Audio => "🎵",
        MediaKind::Image => "🖼️",
        MediaKind::Text => "📝",
        MediaKind::Pdf => "📄",
    }
}

fn index_state(record: &Record) -> colored::ColoredString {
    if record.is_indexed() {
        "indexed".green()
    } else if record.summary.is_empty() {
        "pending".yellow()
    } else {
        "failed".red()
    }
}
