//! # Release and Generation Notes
//!
//! Builds the text bodies of generation, onboarding, and release pull
//! requests from the manifest and the commits collected for each library.
//!
//! The engine is a pure pipeline over an immutable snapshot of the libraries:
//! every step runs in order and any error aborts the render, so a body is
//! either complete or not produced at all.
//!
//! - [`grouping`]: deduplication of commits shared by several libraries and
//!   the newest-first ordering used by every body.
//! - [`generation`]: the `BEGIN_COMMIT_OVERRIDE` body of a generation PR.
//! - [`onboarding`]: the body of a PR adding a new library.
//! - [`release`]: per-library changelog sections of a release PR.

pub mod generation;
pub mod grouping;
pub mod onboarding;
pub mod release;

pub use generation::{build_generation_pr_body, GenerationInput, NO_COMMITS_FOUND};
pub use grouping::{find_latest_generation_commit, group_by_id_and_subject, sort_newest_first};
pub use onboarding::build_onboarding_pr_body;
pub use release::{build_release_notes, ReleaseInput};

/// Number of hash characters shown in links.
pub const SHORT_HASH_LEN: usize = 8;

/// Identity lines stamped on every body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderContext {
    /// Version of this tool.
    pub librarian_version: String,
    /// Language container image used for generation.
    pub image: String,
}

impl RenderContext {
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            librarian_version: env!("CARGO_PKG_VERSION").to_string(),
            image: image.into(),
        }
    }
}

/// First [`SHORT_HASH_LEN`] characters of a hash.
pub fn short_hash(hash: &str) -> &str {
    match hash.char_indices().nth(SHORT_HASH_LEN) {
        Some((idx, _)) => &hash[..idx],
        None => hash,
    }
}
