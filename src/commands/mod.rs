//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the `librarian`
//! command-line tool. Each subcommand is defined in its own file.
//!
//! ## Structure
//!
//! Each command module typically contains:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the parsed `Args` and the global flags
//!   and performs the command's logic by calling into the `librarian` library.

pub mod add;
pub mod completions;
pub mod generate;
pub mod onboard;
pub mod release;
pub mod tidy;

use anyhow::{Context, Result};
use std::path::Path;

use librarian::manifest::{Library, Manifest};

/// Load the manifest named by the global `--manifest` flag.
pub(crate) fn load_manifest(path: &Path) -> Result<Manifest> {
    Manifest::from_file(path)
        .with_context(|| format!("Failed to load manifest {}", path.display()))
}

/// Libraries selected by an optional `--library` filter, in manifest order.
pub(crate) fn select_libraries(manifest: &Manifest, id: Option<&str>) -> Result<Vec<Library>> {
    match id {
        Some(id) => {
            let library = manifest.library(id).ok_or_else(|| {
                librarian::error::Error::LibraryNotFound { id: id.to_string() }
            })?;
            Ok(vec![library.clone()])
        }
        None => Ok(manifest.libraries.clone()),
    }
}

/// Write a rendered body to `output`, or stdout when none is given.
pub(crate) fn emit(body: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, body)
            .with_context(|| format!("Failed to write {}", path.display())),
        None => {
            println!("{}", body);
            Ok(())
        }
    }
}
