//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod analyze;
mod llm;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::load_settings;

#[derive(Parser)]
#[command(name = "chatlens")]
#[command(about = "Chat screenshot analysis and reply suggestion service")]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Start the analysis web server
    Serve {
        /// Address to bind to: PORT, HOST, or HOST:PORT (default: 127.0.0.1:4005)
        #[arg(default_value = "127.0.0.1:4005", env = "CHATLENS_BIND")]
        bind: String,
    },

    /// Analyze a screenshot from a local file and print the suggestion
    Analyze {
        /// Image file to analyze
        image: PathBuf,

        /// Instruction describing the desired reply (tone, situation)
        #[arg(short, long)]
        instruction: String,

        /// Force extraction through the OCR service
        #[arg(long)]
        ocr: bool,

        /// Output the full response as JSON
        #[arg(long)]
        json: bool,
    },

    /// List models advertised by the completion provider
    Models,

    /// Check reachability of the completion provider and OCR service
    Check,
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = load_settings();
    settings.validate()?;

    match cli.command {
        Commands::Serve { bind } => serve::cmd_serve(&settings, &bind).await,
        Commands::Analyze {
            image,
            instruction,
            ocr,
            json,
        } => analyze::cmd_analyze(&settings, &image, &instruction, ocr, json).await,
        Commands::Models => llm::cmd_models(&settings).await,
        Commands::Check => llm::cmd_check(&settings).await,
    }
}
