//! Sift CLI - Filter image collections with a locally-hosted vision model.
//!
//! Sift asks a local vision endpoint (Ollama or anything OpenAI-compatible)
//! whether each image matches a prompt, and keeps the ones the model affirms.
//!
//! # Usage
//!
//! ```bash
//! # Which flavor of API is this endpoint?
//! sift detect --base-url http://localhost:11434
//!
//! # Filter a set of images
//! sift filter photos/*.jpg --prompt "a red bicycle"
//!
//! # List the models the endpoint serves
//! sift models
//!
//! # View configuration
//! sift config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Sift - Filter image collections with a locally-hosted vision model.
#[derive(Parser, Debug)]
#[command(name = "sift")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Judge images against a prompt and print the matches
    Filter(cli::filter::FilterArgs),

    /// Probe an endpoint and print its API flavor
    Detect(cli::detect::DetectArgs),

    /// List the models an endpoint serves
    Models(cli::models::ModelsArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging from config, with CLI verbose override.
    // Note: logging isn't initialized yet, so use eprintln for config warnings.
    let config = match sift_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `sift config path`."
            );
            sift_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Sift v{}", sift_core::VERSION);

    // Dispatch to the appropriate command handler
    match cli.command {
        Commands::Filter(args) => cli::filter::execute(args, &config).await,
        Commands::Detect(args) => cli::detect::execute(args, &config).await,
        Commands::Models(args) => cli::models::execute(args, &config).await,
        Commands::Config(args) => cli::config::execute(args).await,
    }
}
