//! # Onboard Command Implementation
//!
//! This module implements the `onboard` subcommand, which prints the body of
//! the pull request adding a library to the language repository. The body
//! carries the `PiperOrigin-RevId` of the upstream change that last touched
//! the API's service config.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use librarian::notes::{build_onboarding_pr_body, RenderContext};
use librarian::repository::GitRepository;

use crate::cli::GlobalArgs;

/// Print the pull request body onboarding a new library
#[derive(Args, Debug)]
pub struct OnboardArgs {
    /// Library being onboarded
    #[arg(value_name = "LIBRARY_ID")]
    pub library_id: String,

    /// API of the library whose service config identifies the change
    #[arg(value_name = "API_PATH")]
    pub api_path: String,

    /// Checkout of the specification repository
    #[arg(long, value_name = "DIR")]
    pub source: PathBuf,

    /// Write the pull request body to this file instead of stdout
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Execute the `onboard` command.
pub fn execute(args: OnboardArgs, global: &GlobalArgs) -> Result<()> {
    let manifest = super::load_manifest(&global.manifest)?;
    let source = GitRepository::new(&args.source);

    let body = build_onboarding_pr_body(
        &source,
        &manifest.libraries,
        &args.api_path,
        &args.library_id,
        &RenderContext::new(global.image.clone()),
    )?;
    super::emit(&body, args.output.as_deref())
}
