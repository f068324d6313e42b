//! Release pull request bodies.
//!
//! Each release-triggered library gets a collapsible section with a compare
//! link and its changes bucketed by commit type. Commit types outside
//! [`COMMIT_TYPE_HEADINGS`] are left out of the notes. Bulk changes, which
//! touch many libraries at once, are listed a single time in a trailing
//! section instead of once per library.

use super::{short_hash, RenderContext};
use crate::conventional::ConventionalCommit;
use crate::error::{Error, Result};
use crate::language::{format_tag, LanguageRules};
use crate::manifest::{Defaults, GitHubRepo, Library};
use chrono::NaiveDate;
use std::collections::HashSet;

/// Rendered commit types and their headings, in display order.
pub const COMMIT_TYPE_HEADINGS: &[(&str, &str)] = &[
    ("feat", "Features"),
    ("fix", "Bug Fixes"),
    ("perf", "Performance Improvements"),
    ("revert", "Reverts"),
    ("docs", "Documentation"),
    ("chore", "Miscellaneous Chores"),
];

/// Everything release notes are built from.
#[derive(Debug, Clone, Copy)]
pub struct ReleaseInput<'a> {
    pub libraries: &'a [Library],
    pub defaults: &'a Defaults,
    pub rules: &'static LanguageRules,
    /// Language repository the tags and commits live in.
    pub repo: &'a GitHubRepo,
    /// Date printed next to each version.
    pub date: NaiveDate,
}

/// Build release notes for every release-triggered library.
///
/// Expects `state.version` to already hold the new version and
/// `state.previous_version` the one being replaced.
pub fn build_release_notes(input: &ReleaseInput<'_>, ctx: &RenderContext) -> Result<String> {
    let mut out = format!(
        "Librarian Version: {}\nLanguage Image: {}\n",
        ctx.librarian_version, ctx.image
    );
    let mut bulk: Vec<&ConventionalCommit> = Vec::new();
    let mut seen_bulk: HashSet<(&str, &str)> = HashSet::new();

    for library in input.libraries.iter().filter(|l| l.state.release_triggered) {
        render_library(&mut out, library, input)?;
        for change in library.state.changes.iter().filter(|c| c.bulk) {
            if seen_bulk.insert((change.commit_hash.as_str(), change.subject.as_str())) {
                bulk.push(change);
            }
        }
    }

    if !bulk.is_empty() {
        bulk.sort_by(|a, b| a.commit_hash.cmp(&b.commit_hash));
        out.push_str("\n<details><summary>Bulk Changes</summary>\n\n");
        for change in bulk {
            out.push_str(&format!(
                "* {}: {} ({})\n  Libraries: {}\n",
                change.commit_type,
                change.subject,
                commit_link(input.repo, &change.commit_hash),
                change.library_ids().join(",")
            ));
        }
        out.push_str("\n</details>\n");
    }
    Ok(out)
}

fn render_library(out: &mut String, library: &Library, input: &ReleaseInput<'_>) -> Result<()> {
    let version = &library.state.version;
    if version.is_empty() {
        return Err(Error::Version {
            version: String::new(),
            message: format!("release-triggered library {} has no version", library.name),
        });
    }

    let format = library.effective_tag_format(input.defaults, input.rules);
    let new_tag = format_tag(format, &library.name, version);
    let link = if library.state.previous_version.is_empty() {
        input.repo.tag_url(&new_tag)
    } else {
        let previous_tag = format_tag(format, &library.name, &library.state.previous_version);
        input.repo.compare_url(&previous_tag, &new_tag)
    };

    out.push_str(&format!(
        "\n<details><summary>{}: {}</summary>\n\n## [{}]({}) ({})\n",
        library.name,
        version,
        version,
        link,
        input.date.format("%Y-%m-%d")
    ));

    for (commit_type, heading) in COMMIT_TYPE_HEADINGS {
        let bucket: Vec<&ConventionalCommit> = library
            .state
            .changes
            .iter()
            .filter(|c| !c.bulk && c.commit_type == *commit_type)
            .collect();
        if bucket.is_empty() {
            continue;
        }
        out.push_str(&format!("\n### {}\n\n", heading));
        for change in bucket {
            out.push_str("* ");
            out.push_str(&change.subject);
            if let Some(piper) = change.piper_id() {
                out.push_str(&format!(" (PiperOrigin-RevId: {})", piper));
            }
            out.push_str(&format!(" ({})\n", commit_link(input.repo, &change.commit_hash)));
        }
    }
    out.push_str("\n</details>\n");
    Ok(())
}

fn commit_link(repo: &GitHubRepo, hash: &str) -> String {
    format!("[{}]({})", short_hash(hash), repo.commit_url(hash))
}
