//! Onboarding pull request bodies.

use super::RenderContext;
use crate::conventional::{self, PIPER_ORIGIN_REV_ID};
use crate::error::{Error, Result};
use crate::manifest::Library;
use crate::repository::RepositoryReader;
use log::debug;

/// Build the body of a PR that adds `library_id` to the manifest.
///
/// The `PiperOrigin-RevId` comes from the latest upstream commit touching the
/// service config of `api_path`.
pub fn build_onboarding_pr_body(
    source: &dyn RepositoryReader,
    libraries: &[Library],
    api_path: &str,
    library_id: &str,
    ctx: &RenderContext,
) -> Result<String> {
    let library = libraries
        .iter()
        .find(|lib| lib.name == library_id)
        .ok_or_else(|| Error::LibraryNotFound {
            id: library_id.to_string(),
        })?;
    let api = library
        .apis
        .iter()
        .find(|api| api.path == api_path)
        .ok_or_else(|| Error::ApiNotFound {
            library: library_id.to_string(),
            path: api_path.to_string(),
        })?;
    let service_config = api
        .service_config_path()
        .ok_or_else(|| Error::ServiceConfigNotFound {
            library: library_id.to_string(),
            path: api_path.to_string(),
        })?;

    let commit = source.latest_commit_touching(&service_config)?;
    debug!("Service config {} last touched by {}", service_config, commit.hash);

    let piper = match conventional::parse(&commit, library_id) {
        Ok(Some(parsed)) => parsed.piper_id().map(str::to_string),
        Ok(None) | Err(_) => None,
    }
    .ok_or_else(|| Error::PiperIdNotFound {
        hash: commit.hash.clone(),
    })?;

    Ok(format!(
        "feat: onboard a new library\n\n{}: {}\nLibrary-ID: {}\nLibrarian Version: {}\nLanguage Image: {}",
        PIPER_ORIGIN_REV_ID, piper, library_id, ctx.librarian_version, ctx.image
    ))
}
