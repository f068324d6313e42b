//! # Add Command Implementation
//!
//! This module implements the `add` subcommand, which appends a new library
//! generated from a single API to the manifest.
//!
//! ## Functionality
//!
//! - **Name Derivation**: The library name is derived from the API path with
//!   the language's naming rule unless `--name` is given.
//! - **Tidy Records**: The new record only carries fields that differ from
//!   what defaults resolution derives, so `tidy` leaves it unchanged.

use anyhow::{Context, Result};
use clap::Args;

use librarian::defaults;
use librarian::error::Error;

use crate::cli::GlobalArgs;

/// Add a library to the manifest
#[derive(Args, Debug)]
pub struct AddArgs {
    /// API path in the specification repository (e.g. google/cloud/secretmanager/v1)
    #[arg(value_name = "API_PATH")]
    pub api_path: String,

    /// Library name; derived from the API path when omitted
    #[arg(long, value_name = "NAME")]
    pub name: Option<String>,

    /// Output directory; derived from the API path when omitted
    #[arg(long, value_name = "DIR")]
    pub output: Option<String>,
}

/// Execute the `add` command.
pub fn execute(args: AddArgs, global: &GlobalArgs) -> Result<()> {
    let path = &global.manifest;
    let mut manifest = super::load_manifest(path)?;

    let mut library = defaults::new_library(
        &manifest.language,
        &args.api_path,
        args.name.as_deref(),
        &manifest.default,
    )
    .with_context(|| format!("Cannot add a library for {}", args.api_path))?;

    if manifest.library(&library.name).is_some() {
        return Err(Error::LibraryExists { id: library.name }.into());
    }

    if let Some(output) = args.output {
        library.output = output;
        library = defaults::tidy_library(&manifest.language, library, &manifest.default);
    }

    let name = library.name.clone();
    manifest.libraries.push(library);
    manifest
        .to_file(path)
        .with_context(|| format!("Failed to write manifest {}", path.display()))?;

    println!("✅ Added {} ({}) to {}", name, args.api_path, path.display());
    Ok(())
}
