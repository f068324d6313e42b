//! # Release Preparation
//!
//! Decides whether a library needs a release and, if so, at which version.
//!
//! Changes are the conventional commits in the language repository that
//! touched the library's owned paths since the tag of its current version.
//! Commits whose files are all excluded by `release_exclude_paths` do not
//! count. A release is triggered by any user-visible change type (see
//! [`TRIGGER_TYPES`]) or any breaking change. Libraries marked
//! `skip_publish` are never triggered.

use crate::conventional::{self, ConventionalCommit};
use crate::error::{Error, Result};
use crate::language::{self, format_tag};
use crate::manifest::{Defaults, Library};
use crate::path;
use crate::repository::{Commit, RepositoryReader};
use crate::version::calculate_next_version;
use chrono::{DateTime, Utc};
use log::{debug, info};

/// Commit types that trigger a release on their own.
pub const TRIGGER_TYPES: &[&str] = &["feat", "fix", "perf", "revert", "docs"];

/// Caller-supplied knobs for [`prepare_release`].
#[derive(Debug, Clone)]
pub struct ReleaseOptions {
    /// Version to release at instead of the computed one.
    pub explicit_version: Option<String>,
    /// Timestamp recorded on triggered libraries.
    pub now: DateTime<Utc>,
}

impl Default for ReleaseOptions {
    fn default() -> Self {
        Self {
            explicit_version: None,
            now: Utc::now(),
        }
    }
}

/// Collect changes for `library` and mark it for release when warranted.
///
/// Returns the updated record. When triggered, `state.version` holds the new
/// version and `state.previous_version` the one it replaces.
pub fn prepare_release(
    language: &str,
    mut library: Library,
    defaults: &Defaults,
    repo: &dyn RepositoryReader,
    options: &ReleaseOptions,
) -> Result<Library> {
    library.state.changes.clear();
    library.state.release_triggered = false;

    if library.skip_publish {
        debug!("Skipping {}: skip_publish is set", library.name);
        return Ok(library);
    }

    let roots = library.owned_paths();
    if roots.is_empty() {
        debug!("Skipping {}: no owned paths", library.name);
        return Ok(library);
    }

    let since = if library.state.version.is_empty() {
        String::new()
    } else {
        let format = library.effective_tag_format(defaults, language::rules_for(language));
        format_tag(format, &library.name, &library.state.version)
    };

    let fetch_err = |e: Error| Error::FetchCommits {
        library: library.name.clone(),
        message: e.to_string(),
    };

    let commits = repo
        .commits_for_paths_since(&roots, &since)
        .map_err(fetch_err)?;

    let mut kept: Vec<&Commit> = Vec::new();
    for commit in &commits {
        if touches_released_files(repo, commit, &roots, &library.release_exclude_paths)
            .map_err(fetch_err)?
        {
            kept.push(commit);
        } else {
            debug!("{}: ignoring {} (excluded paths only)", library.name, commit.hash);
        }
    }

    let mut changes: Vec<ConventionalCommit> = Vec::new();
    for commit in &kept {
        changes.extend(conventional::parse_commits(commit, &library.name).map_err(fetch_err)?);
    }
    changes.sort_by(|a, b| b.when.cmp(&a.when));

    let triggered = changes
        .iter()
        .any(|c| c.breaking || TRIGGER_TYPES.contains(&c.commit_type.as_str()));
    let newest = kept.iter().max_by_key(|c| c.when).map(|c| c.hash.clone());
    library.state.changes = changes;

    if !triggered {
        debug!(
            "{}: {} changes, none release-worthy",
            library.name,
            library.state.changes.len()
        );
        return Ok(library);
    }

    let next = calculate_next_version(&library, options.explicit_version.as_deref())?;
    info!(
        "Releasing {} {} -> {}",
        library.name, library.state.version, next
    );
    library.state.previous_version = std::mem::take(&mut library.state.version);
    library.state.version = next;
    library.state.next_version.clear();
    library.state.release_triggered = true;
    library.state.release_timestamp = Some(options.now);
    if let Some(hash) = newest {
        library.state.last_released_commit = hash;
    }
    Ok(library)
}

/// Whether `commit` changed any owned, non-excluded file. Commits reporting
/// no files are kept.
fn touches_released_files(
    repo: &dyn RepositoryReader,
    commit: &Commit,
    roots: &[String],
    excludes: &[String],
) -> Result<bool> {
    let files = repo.changed_files_in_commit(&commit.hash)?;
    if files.is_empty() {
        return Ok(true);
    }
    for file in &files {
        if path::is_owned(file, roots, excludes)? {
            return Ok(true);
        }
    }
    Ok(false)
}
