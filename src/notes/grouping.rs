//! Commit deduplication and ordering.
//!
//! A single upstream change usually lands in several libraries at once, and
//! the commit collector sees it once per library. Commits sharing a
//! `PiperOrigin-RevId` and subject collapse into the first one seen, whose
//! `Library-IDs` footer then lists every contributing library in encounter
//! order. Commits without that footer are never merged.

use crate::conventional::{ConventionalCommit, LIBRARY_IDS};
use crate::error::{Error, Result};
use crate::repository::{Commit, RepositoryReader};
use indexmap::IndexMap;
use log::debug;
use std::collections::HashMap;

/// Collapse commits sharing `(PiperOrigin-RevId, subject)`.
///
/// Output order is the order of first appearance. Every returned commit has
/// its `Library-IDs` footer set.
pub fn group_by_id_and_subject(commits: Vec<ConventionalCommit>) -> Vec<ConventionalCommit> {
    let mut groups: Vec<(ConventionalCommit, Vec<String>)> = Vec::new();
    let mut index: HashMap<(String, String), usize> = HashMap::new();

    for commit in commits {
        let library_id = commit.library_id.clone();
        let key = commit
            .piper_id()
            .map(|piper| (piper.to_string(), commit.subject.clone()));

        match key.and_then(|k| index.get(&k).copied().map(|i| (k, i))) {
            Some((_, i)) => {
                let ids = &mut groups[i].1;
                if !ids.contains(&library_id) {
                    ids.push(library_id);
                }
            }
            None => {
                if let Some(piper) = commit.piper_id() {
                    index.insert((piper.to_string(), commit.subject.clone()), groups.len());
                }
                groups.push((commit, vec![library_id]));
            }
        }
    }

    groups
        .into_iter()
        .map(|(mut commit, ids)| {
            commit.footers.insert(LIBRARY_IDS.to_string(), ids.join(","));
            commit
        })
        .collect()
}

/// Sort newest first; ties keep their relative order.
pub fn sort_newest_first(commits: &mut [ConventionalCommit]) {
    commits.sort_by(|a, b| b.when.cmp(&a.when));
}

/// Find the reference commit with the latest timestamp among the values of
/// `id_to_since`, visiting libraries in `order`.
///
/// Libraries with an empty reference are ignored. Ties keep the first commit
/// seen. Fails when no library has a usable reference commit.
pub fn find_latest_generation_commit(
    repo: &dyn RepositoryReader,
    order: &[&str],
    id_to_since: &IndexMap<String, String>,
) -> Result<Commit> {
    let mut latest: Option<Commit> = None;

    for id in order {
        let Some(hash) = id_to_since.get(*id).filter(|h| !h.is_empty()) else {
            continue;
        };
        let commit = repo.get_commit(hash).map_err(|e| Error::StartCommitNotFound {
            message: format!("library {}: {}", id, e),
        })?;
        debug!("Reference commit for {}: {} at {}", id, commit.hash, commit.when);
        match &latest {
            Some(current) if commit.when <= current.when => {}
            _ => latest = Some(commit),
        }
    }

    latest.ok_or_else(|| Error::StartCommitNotFound {
        message: "no library has a recorded reference commit".to_string(),
    })
}
