//! # Release Command Implementation
//!
//! This module implements the `release` subcommand. It collects the changes of
//! every selected library since its last release tag, decides which libraries
//! need a release, bumps their versions in the manifest, and prints the
//! release notes for the release pull request.
//!
//! A library whose changes cannot be collected is reported and left out; its
//! siblings are still released. The command exits with an error afterwards so
//! the failure is not missed.

use anyhow::{anyhow, bail, Context, Result};
use chrono::Utc;
use clap::Args;
use log::warn;
use std::path::PathBuf;

use librarian::defaults;
use librarian::notes::{build_release_notes, ReleaseInput, RenderContext};
use librarian::release::{prepare_release, ReleaseOptions};
use librarian::repository::GitRepository;

use crate::cli::GlobalArgs;

/// Prepare releases and print the release notes
#[derive(Args, Debug)]
pub struct ReleaseArgs {
    /// Checkout of the language repository
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub repo: PathBuf,

    /// Only consider this library
    #[arg(long, value_name = "ID")]
    pub library: Option<String>,

    /// Release at this version instead of the computed one
    #[arg(long, value_name = "VERSION", requires = "library")]
    pub version: Option<String>,

    /// Write the release notes to this file instead of stdout
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Execute the `release` command.
pub fn execute(args: ReleaseArgs, global: &GlobalArgs) -> Result<()> {
    let mut manifest = super::load_manifest(&global.manifest)?;
    let github = manifest.repo.clone().ok_or_else(|| {
        anyhow!(
            "{} has no `repo` section; add the owner and name of the language repository",
            global.manifest.display()
        )
    })?;

    let repo = GitRepository::new(&args.repo);
    let options = ReleaseOptions {
        explicit_version: args.version.clone(),
        now: Utc::now(),
    };

    let mut prepared = Vec::new();
    let mut failed = Vec::new();
    for library in super::select_libraries(&manifest, args.library.as_deref())? {
        let name = library.name.clone();
        let result = defaults::resolve_library(&manifest.language, library, &manifest.default)
            .and_then(|resolved| {
                prepare_release(&manifest.language, resolved, &manifest.default, &repo, &options)
            });
        match result {
            Ok(library) => prepared.push(library),
            Err(e) => {
                warn!("Cannot prepare release for {}: {}", name, e);
                failed.push(name);
            }
        }
    }

    let input = ReleaseInput {
        libraries: &prepared,
        defaults: &manifest.default,
        rules: manifest.rules(),
        repo: &github,
        date: options.now.date_naive(),
    };
    let notes = build_release_notes(&input, &RenderContext::new(global.image.clone()))?;

    for library in &prepared {
        if let Some(entry) = manifest.library_mut(&library.name) {
            entry.state = library.state.clone();
        }
    }
    manifest
        .to_file(&global.manifest)
        .with_context(|| format!("Failed to write manifest {}", global.manifest.display()))?;

    super::emit(&notes, args.output.as_deref())?;

    if !failed.is_empty() {
        bail!("Release preparation failed for: {}", failed.join(", "));
    }
    Ok(())
}
