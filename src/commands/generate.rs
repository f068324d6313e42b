//! # Generate Command Implementation
//!
//! This module implements the `generate` subcommand, which runs the language
//! generator for each library and prints the body of the generation pull
//! request.
//!
//! ## Flow
//!
//! 1. Resolve every selected library against the manifest defaults.
//! 2. Run the generator for all of them in parallel (skipped when no
//!    `--generator` is configured).
//! 3. Build the pull request body from the upstream commits since each
//!    successfully generated library's last generation.
//! 4. Record the upstream `HEAD` as the last generated commit of every
//!    library that generated successfully, and write the manifest back.

use anyhow::{Context, Result};
use clap::Args;
use indexmap::IndexMap;
use indicatif::{ProgressBar, ProgressStyle};
use log::warn;
use std::path::PathBuf;

use librarian::defaults;
use librarian::generate::{generate_all, CommandGenerator, GenerationOutcome};
use librarian::notes::{build_generation_pr_body, GenerationInput, RenderContext};
use librarian::repository::{GitRepository, RepositoryReader};

use crate::cli::GlobalArgs;

/// Generate libraries and print the generation pull request body
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Checkout of the specification repository
    #[arg(long, value_name = "DIR")]
    pub source: PathBuf,

    /// Checkout of the language repository
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub repo: PathBuf,

    /// Only generate this library
    #[arg(long, value_name = "ID")]
    pub library: Option<String>,

    /// Generator command run once per library
    #[arg(long, value_name = "COMMAND", env = "LIBRARIAN_GENERATOR")]
    pub generator: Option<String>,

    /// Write the pull request body to this file instead of stdout
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Execute the `generate` command.
pub fn execute(args: GenerateArgs, global: &GlobalArgs) -> Result<()> {
    let mut manifest = super::load_manifest(&global.manifest)?;

    let mut resolved = Vec::new();
    for library in super::select_libraries(&manifest, args.library.as_deref())? {
        let name = library.name.clone();
        resolved.push(
            defaults::resolve_library(&manifest.language, library, &manifest.default)
                .with_context(|| format!("Library {} is invalid", name))?,
        );
    }

    let source = GitRepository::new(&args.source);
    let language_repo = GitRepository::new(&args.repo);
    let source_head = source
        .head_hash()
        .context("Failed to read HEAD of the specification repository")?;

    let generated = args.generator.is_some();
    let outcome = match &args.generator {
        Some(command) => {
            let generator = CommandGenerator::from_command_line(command, &args.repo)?;
            let progress = ProgressBar::new(resolved.len() as u64);
            progress.set_style(
                ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {msg}")
                    .context("Invalid progress template")?
                    .progress_chars("=> "),
            );
            let outcome = generate_all(&generator, resolved, &args.source, |name| {
                progress.set_message(name.to_string());
                progress.inc(1);
            });
            progress.finish_and_clear();
            outcome
        }
        None => GenerationOutcome {
            libraries: resolved,
            failed: Vec::new(),
        },
    };
    for id in &outcome.failed {
        warn!("Library {} failed to generate", id);
    }

    // Only libraries that generated describe upstream changes.
    let id_to_since: IndexMap<String, String> = outcome
        .libraries
        .iter()
        .filter(|lib| !lib.skip_generate && !outcome.failed.contains(&lib.name))
        .map(|lib| (lib.name.clone(), lib.state.last_generated_commit.clone()))
        .collect();

    let input = GenerationInput {
        libraries: &outcome.libraries,
        id_to_since: &id_to_since,
        failed_libraries: &outcome.failed,
        sources: &manifest.sources,
    };
    let body = build_generation_pr_body(
        &source,
        &language_repo,
        &input,
        &RenderContext::new(global.image.clone()),
    )?;

    if generated {
        for library in &outcome.libraries {
            if outcome.failed.contains(&library.name) || library.skip_generate {
                continue;
            }
            if let Some(entry) = manifest.library_mut(&library.name) {
                entry.state.last_generated_commit = source_head.clone();
                entry.source_roots = library.source_roots.clone();
                entry.release_exclude_paths = library.release_exclude_paths.clone();
            }
        }
        manifest
            .to_file(&global.manifest)
            .with_context(|| format!("Failed to write manifest {}", global.manifest.display()))?;
    }

    super::emit(&body, args.output.as_deref())
}
