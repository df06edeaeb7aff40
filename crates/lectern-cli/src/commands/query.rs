//! Query command - natural language questions over the library.

use super::{load_config, runtime};
use anyhow::{Context, Result};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use lectern_catalog::Catalog;
use lectern_gemini::GeminiClient;
use lectern_pipeline::{PipelineConfig, QueryOutcome, QueryPipeline};

pub fn run(query: &str) -> Result<()> {
    let config = load_config()?;
    let client = GeminiClient::from_config(&config.gemini)
        .context("Failed to create API client")?;

    let catalog = Catalog::load(&config.storage.catalog_path());
    let pipeline_config = PipelineConfig::from_config(&config);
    let pipeline = QueryPipeline::new(&catalog, &client, &pipeline_config);

    println!("{} {}", "Question:".cyan().bold(), query);
    println!();

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message("Searching the lecture library...");
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    let rt = runtime()?;
    let outcome = rt.block_on(pipeline.run(query));
    pb.finish_and_clear();

    match outcome {
        QueryOutcome::NoContent => {
            println!("{}", "No lectures have been added yet.".yellow());
            println!(
                "{}",
                "Use 'lectern add' to index some material first.".dimmed()
            );
        }
        QueryOutcome::SelectionFailed { reason } => {
            println!("{} {}", "Relevance check failed:".red().bold(), reason);
        }
        QueryOutcome::NoneRelevant => {
            println!(
                "{}",
                "Based on the summaries, no lectures seem relevant to your query.".yellow()
            );
        }
        QueryOutcome::NoValidAnswers { answers } => {
            println!(
                "{}",
                "No valid answers were retrieved from the relevant lectures.".red()
            );
            for (id, answer) in answers {
                println!("  {} {}", format!("[{}]", id).dimmed(), answer.dimmed());
            }
        }
        QueryOutcome::SynthesisFailed { context, reason } => {
            println!("{} {}", "Failed to synthesize a final answer:".red().bold(), reason);
            println!();
            println!("{}", "Individual answers used:".white().bold());
            println!("{}", "─".repeat(70));
            println!("{}", context);
        }
        QueryOutcome::Done { answer, record_ids } => {
            println!("{}", "─".repeat(70));
            println!("{}", "Answer".green().bold());
            println!("{}", "─".repeat(70));
            println!("{}", answer);
            println!();
            let sources: Vec<String> = record_ids.iter().map(|id| id.to_string()).collect();
            println!(
                "{}",
                format!("Sources: record(s) {}", sources.join(", ")).dimmed()
            );
        }
    }

    Ok(())
}
