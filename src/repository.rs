//! # Repository Readers
//!
//! The note and release engines never talk to git directly. They consume the
//! [`RepositoryReader`] trait, which exposes exactly the queries they need:
//! looking up commits, listing commits that touched a set of paths since a
//! reference, and inspecting the working tree.
//!
//! [`GitRepository`] is the default implementation, shelling out to the
//! system `git` through [`crate::git`]. Tests substitute in-memory mocks.

use crate::error::Result;
use chrono::{DateTime, Utc};
use std::path::PathBuf;

/// A raw commit as read from a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub hash: String,
    pub message: String,
    pub when: DateTime<Utc>,
}

/// Read-only queries against a git repository.
pub trait RepositoryReader: Send + Sync {
    /// Look up a single commit by hash.
    fn get_commit(&self, hash: &str) -> Result<Commit>;

    /// Commits touching any of `paths` after `since` (exclusive), newest
    /// first. An empty `since` means the whole history.
    fn commits_for_paths_since(&self, paths: &[String], since: &str) -> Result<Vec<Commit>>;

    /// Files changed by a single commit.
    fn changed_files_in_commit(&self, hash: &str) -> Result<Vec<String>>;

    /// The most recent commit that touched `path`.
    fn latest_commit_touching(&self, path: &str) -> Result<Commit>;

    /// Whether the working tree has no local modifications.
    fn is_clean(&self) -> Result<bool>;

    /// Hash of the `HEAD` commit.
    fn head_hash(&self) -> Result<String>;

    /// Locally modified, added, or untracked files.
    fn changed_files(&self) -> Result<Vec<String>>;
}

/// Files changed by this run: the `HEAD` commit's files when the tree is
/// clean, otherwise the local modifications.
pub fn files_changed_by_run(repo: &dyn RepositoryReader) -> Result<Vec<String>> {
    if repo.is_clean()? {
        let head = repo.head_hash()?;
        repo.changed_files_in_commit(&head)
    } else {
        repo.changed_files()
    }
}

/// A repository on local disk, read through the `git` command.
#[derive(Debug, Clone)]
pub struct GitRepository {
    dir: PathBuf,
}

impl GitRepository {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl RepositoryReader for GitRepository {
    fn get_commit(&self, hash: &str) -> Result<Commit> {
        crate::git::show_commit(&self.dir, hash)
    }

    fn commits_for_paths_since(&self, paths: &[String], since: &str) -> Result<Vec<Commit>> {
        crate::git::log_paths_since(&self.dir, paths, since)
    }

    fn changed_files_in_commit(&self, hash: &str) -> Result<Vec<String>> {
        crate::git::files_in_commit(&self.dir, hash)
    }

    fn latest_commit_touching(&self, path: &str) -> Result<Commit> {
        crate::git::latest_commit_for_path(&self.dir, path)
    }

    fn is_clean(&self) -> Result<bool> {
        Ok(crate::git::status_porcelain(&self.dir)?.is_empty())
    }

    fn head_hash(&self) -> Result<String> {
        crate::git::rev_parse(&self.dir, "HEAD")
    }

    fn changed_files(&self) -> Result<Vec<String>> {
        crate::git::status_porcelain(&self.dir)
    }
}
