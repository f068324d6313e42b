//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::commands;

/// Librarian - Generate, tidy, and release client libraries
#[derive(Parser, Debug)]
#[command(name = "librarian")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Path to the manifest
    #[arg(
        long,
        global = true,
        value_name = "FILE",
        env = "LIBRARIAN_MANIFEST",
        default_value = librarian::manifest::DEFAULT_MANIFEST_FILENAME
    )]
    manifest: PathBuf,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "info")]
    log_level: String,

    /// Language container image reported in pull request bodies
    #[arg(
        long,
        global = true,
        value_name = "IMAGE",
        env = "LIBRARIAN_IMAGE",
        default_value = ""
    )]
    image: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Rewrite the manifest without fields that match derived defaults
    Tidy(commands::tidy::TidyArgs),

    /// Add a library for an API to the manifest
    Add(commands::add::AddArgs),

    /// Generate libraries and print the generation pull request body
    Generate(commands::generate::GenerateArgs),

    /// Prepare releases and print the release notes
    Release(commands::release::ReleaseArgs),

    /// Print the pull request body onboarding a new library
    Onboard(commands::onboard::OnboardArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

/// Settings shared by every command.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub manifest: PathBuf,
    pub image: String,
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level);

        let global = GlobalArgs {
            manifest: self.manifest,
            image: self.image,
        };

        match self.command {
            Commands::Tidy(args) => commands::tidy::execute(args, &global),
            Commands::Add(args) => commands::add::execute(args, &global),
            Commands::Generate(args) => commands::generate::execute(args, &global),
            Commands::Release(args) => commands::release::execute(args, &global),
            Commands::Onboard(args) => commands::onboard::execute(args, &global),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }
}

/// Log to stderr at `level` unless `RUST_LOG` says otherwise.
fn init_logging(level: &str) {
    let mut builder = env_logger::Builder::new();
    builder.parse_filters(level);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder.format_timestamp(None).target(env_logger::Target::Stderr);
    let _ = builder.try_init();
}
