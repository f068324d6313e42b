//! # Tidy Command Implementation
//!
//! This module implements the `tidy` subcommand, which rewrites the manifest
//! with every field that defaults resolution would derive identically removed.
//!
//! With `--check`, nothing is written and the command fails when the manifest
//! is not already tidy, which makes it usable as a CI gate.

use anyhow::{bail, Context, Result};
use clap::Args;
use log::debug;

use librarian::defaults;

use crate::cli::GlobalArgs;

/// Remove derivable fields from the manifest
#[derive(Args, Debug)]
pub struct TidyArgs {
    /// Report whether the manifest is tidy without rewriting it
    #[arg(long)]
    pub check: bool,
}

/// Execute the `tidy` command.
pub fn execute(args: TidyArgs, global: &GlobalArgs) -> Result<()> {
    let path = &global.manifest;
    let mut manifest = super::load_manifest(path)?;
    let original = manifest.clone();

    for library in &manifest.libraries {
        // Surface unresolvable records, e.g. veneers without output.
        defaults::resolve_library(&manifest.language, library.clone(), &manifest.default)
            .with_context(|| format!("Library {} is invalid", library.name))?;
    }

    let language = manifest.language.clone();
    manifest.libraries = std::mem::take(&mut manifest.libraries)
        .into_iter()
        .map(|library| defaults::tidy_library(&language, library, &manifest.default))
        .collect();

    let changed: Vec<&str> = manifest
        .libraries
        .iter()
        .zip(&original.libraries)
        .filter(|(tidied, before)| tidied != before)
        .map(|(tidied, _)| tidied.name.as_str())
        .collect();
    for name in &changed {
        debug!("Tidied {}", name);
    }

    if args.check {
        if changed.is_empty() {
            println!("✅ {} is tidy", path.display());
            return Ok(());
        }
        bail!(
            "{} is not tidy; run `librarian tidy` to fix: {}",
            path.display(),
            changed.join(", ")
        );
    }

    manifest
        .to_file(path)
        .with_context(|| format!("Failed to write manifest {}", path.display()))?;
    println!(
        "✅ Tidied {} of {} libraries in {}",
        changed.len(),
        manifest.libraries.len(),
        path.display()
    );
    Ok(())
}
