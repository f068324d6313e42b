//! # Librarian
//!
//! Release engineering for monorepos of generated client libraries. This
//! library backs the `librarian` command-line tool: it keeps the declarative
//! `librarian.yaml` manifest tidy, drives per-library code generation, and
//! writes the bodies of generation, onboarding, and release pull requests.
//!
//! ## Quick Example
//!
//! ```
//! use librarian::defaults;
//! use librarian::manifest::Manifest;
//!
//! let manifest = Manifest::parse(r#"
//! language: rust
//! default:
//!   output: src/generated
//!   release_level: stable
//! libraries:
//!   - name: google-cloud-secretmanager-v1
//! "#).unwrap();
//!
//! let library = defaults::resolve_library(
//!     &manifest.language,
//!     manifest.libraries[0].clone(),
//!     &manifest.default,
//! ).unwrap();
//!
//! assert_eq!(library.apis[0].path, "google/cloud/secretmanager/v1");
//! assert_eq!(library.output, "src/generated/cloud/secretmanager/v1");
//! assert_eq!(library.release_level, "stable");
//! ```
//!
//! ## Core Concepts
//!
//! - **Manifest (`manifest`)**: The schema of `librarian.yaml`: libraries, the
//!   default bundle, and the repositories links point at.
//! - **Language rules (`language`)**: A registry of pure functions deriving
//!   output directories, API paths, library names, and tag formats per
//!   language.
//! - **Defaults (`defaults`)**: Layered defaults resolution and its inverse,
//!   used by `tidy`.
//! - **Conventional commits (`conventional`)**: Parsing commit messages,
//!   including override blocks holding several nested commits.
//! - **Notes (`notes`)**: Grouping commits across libraries and rendering PR
//!   bodies.
//! - **Release (`release`, `version`)**: Deciding which libraries to release
//!   and at which version.
//! - **Generation (`generate`)**: Running the per-language generator for
//!   every library in parallel.
//! - **Repositories (`repository`, `git`)**: The read-only view of git the
//!   engines depend on.

pub mod conventional;
pub mod defaults;
pub mod error;
pub mod generate;
pub mod git;
pub mod language;
pub mod manifest;
pub mod notes;
pub mod path;
pub mod release;
pub mod repository;
pub mod version;

#[cfg(test)]
mod engine_proptest;
