//! Lectern CLI - Index and query your lecture library

mod commands;

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Lectern - Index and query your lecture library
#[derive(Parser)]
#[command(name = "lectern")]
#[command(author = "Lalo Morales <lalomorales22@github.com>")]
#[command(version)]
#[command(about = "Index lecture recordings and ask questions across them", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize Lectern (create the config file)
    Init,

    /// Show the resolved configuration
    Config,

    /// Add lecture files to the library. Documents (PDFs) are auto-detected.
    Add {
        /// Document files (e.g. notes.pdf); the kind is detected from the extension
        #[arg(value_name = "DOC_FILE")]
        documents: Vec<PathBuf>,

        /// Video files (e.g. lecture1.mp4, lecture2.mov)
        #[arg(long, num_args = 1.., value_name = "VIDEO_FILE")]
        videos: Vec<PathBuf>,

        /// Audio files (e.g. seminar.mp3, talk.wav)
        #[arg(long, num_args = 1.., value_name = "AUDIO_FILE")]
        audio: Vec<PathBuf>,

        /// Image files (e.g. whiteboard.png, slide.jpeg)
        #[arg(long, num_args = 1.., value_name = "IMAGE_FILE")]
        images: Vec<PathBuf>,

        /// Text or code files (e.g. notes.txt, example.java)
        #[arg(long, num_args = 1.., value_name = "TEXT_FILE")]
        text: Vec<PathBuf>,
    },

    /// Query the lecture library using natural language
    Query {
        /// Natural language question about the lectures
        #[arg(value_name = "QUERY_TEXT", num_args = 1.., required = true)]
        query_text: Vec<String>,
    },

    /// Regenerate the index summary for a record
    Reindex {
        /// Record id
        id: u32,
    },

    /// List all records in the library
    List,

    /// Show details of a record
    Show {
        /// Record id
        id: u32,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("lectern=debug,info"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("lectern=info,warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Init => commands::init::run(),
        Commands::Config => commands::config::run(),
        Commands::Add {
            documents,
            videos,
            audio,
            images,
            text,
        } => commands::add::run(documents, videos, audio, images, text),
        Commands::Query { query_text } => commands::query::run(&query_text.join(" ")),
        Commands::Reindex { id } => commands::reindex::run(id),
        Commands::List => commands::list::run(),
        Commands::Show { id } => commands::show::run(id),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}
