//! Config command - show the resolved configuration.

use super::{get_paths, load_config};
use anyhow::Result;
use colored::Colorize;

pub fn run() -> Result<()> {
    let paths = get_paths()?;
    let config = load_config()?;

    println!("{}", "Configuration".cyan().bold());
    println!("{}", "─".repeat(70));

    let config_source = if paths.config_file.exists() {
        paths.config_file.display().to_string()
    } else {
        format!("{} (not created, using defaults)", paths.config_file.display())
    };
    println!("  {}: {}", "Config file".cyan(), config_source);
    println!(
        "  {}: {}",
        "Library".cyan(),
        config.storage.library_path().display()
    );
    println!(
        "  {}: {}",
        "Catalog".cyan(),
        config.storage.catalog_path().display()
    );

    println!();
    println!("  {}: {}", "Media model".cyan(), config.gemini.model);
    println!("  {}: {}", "Text model".cyan(), config.gemini.text_model);
    println!("  {}: {}", "Base URL".cyan(), config.gemini.base_url);

    // Never print the key itself.
    let key_state = match (&config.gemini.api_key, std::env::var("GEMINI_API_KEY").is_ok()) {
        (Some(key), _) if !key.is_empty() => "configured in config file".green(),
        (_, true) => "from GEMINI_API_KEY".green(),
        _ => "not set".red(),
    };
    println!("  {}: {}", "API key".cyan(), key_state);
    println!(
        "  {}: {} attempts, {}s delay, {}s timeout",
        "Retries".cyan(),
        config.gemini.retry_attempts,
        config.gemini.retry_delay_seconds,
        config.gemini.timeout_seconds
    );

    println!();
    let encoder_state = match which::which(&config.media.ffmpeg_path) {
        Ok(path) => path.display().to_string().green(),
        Err(_) => "not found".red(),
    };
    println!(
        "  {}: {} ({})",
        "FFmpeg".cyan(),
        config.media.ffmpeg_path,
        encoder_state
    );

    Ok(())
}
