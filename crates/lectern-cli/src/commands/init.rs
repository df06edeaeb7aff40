//! Initialize Lectern.

use super::get_paths;
use anyhow::{Context, Result};
use colored::Colorize;
use lectern_config::Config;

pub fn run() -> Result<()> {
    let paths = get_paths()?;

    // Check if already initialized
    if paths.is_initialized() {
        println!(
            "{} Lectern is already initialized.",
            "Note:".yellow().bold()
        );
        println!("  Config: {}", paths.config_file.display());
        return Ok(());
    }

    println!("{}", "Initializing Lectern...".cyan().bold());

    paths
        .ensure_dirs()
        .context("Failed to create directories")?;
    println!("  {} Created directories", "✓".green());

    Config::create_default_file(&paths.config_file)
        .context("Failed to create config file")?;
    println!(
        "  {} Created config: {}",
        "✓".green(),
        paths.config_file.display()
    );

    println!();
    println!("{}", "Lectern initialized successfully!".green().bold());
    println!();
    println!("Next steps:");
    println!(
        "  1. Set your API key: {}",
        "export GEMINI_API_KEY=...".cyan()
    );
    println!(
        "  2. Add a lecture: {}",
        "lectern add --videos lecture1.mp4".cyan()
    );
    println!(
        "  3. Ask a question: {}",
        "lectern query what was covered in week one".cyan()
    );

    Ok(())
}
