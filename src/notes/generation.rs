//! Generation pull request bodies.
//!
//! The body starts with a `BEGIN_COMMIT_OVERRIDE` block so that, once the PR
//! is squash-merged, the conventional commit parser recovers one commit per
//! upstream change from the merge commit.

use super::grouping::{find_latest_generation_commit, group_by_id_and_subject, sort_newest_first};
use super::{short_hash, RenderContext};
use crate::conventional::{self, ConventionalCommit, LIBRARY_IDS, PIPER_ORIGIN_REV_ID, SOURCE_LINK};
use crate::error::{Error, Result};
use crate::manifest::{GitHubRepo, Library};
use crate::path;
use crate::repository::{files_changed_by_run, RepositoryReader};
use indexmap::IndexMap;
use log::{debug, info};

/// Body returned when no library has new upstream commits.
pub const NO_COMMITS_FOUND: &str = "No commit is found since last generation";

/// Everything the generation body is built from.
#[derive(Debug, Clone, Copy)]
pub struct GenerationInput<'a> {
    /// Libraries in manifest order.
    pub libraries: &'a [Library],
    /// Library ID to the upstream commit it was last generated from.
    pub id_to_since: &'a IndexMap<String, String>,
    /// Libraries whose generation failed, in the order reported.
    pub failed_libraries: &'a [String],
    /// Upstream specification repository.
    pub sources: &'a GitHubRepo,
}

/// Build the body of a generation pull request.
///
/// `source` reads the upstream specification repository, `language_repo`
/// the repository the generated code was written to.
pub fn build_generation_pr_body(
    source: &dyn RepositoryReader,
    language_repo: &dyn RepositoryReader,
    input: &GenerationInput<'_>,
    ctx: &RenderContext,
) -> Result<String> {
    let changed = files_changed_by_run(language_repo).map_err(|e| Error::FetchChanges {
        message: e.to_string(),
    })?;
    debug!("{} files changed in the language repository", changed.len());

    let mut commits = Vec::new();
    let mut order = Vec::new();
    for library in input.libraries {
        let Some(since) = input.id_to_since.get(&library.name) else {
            continue;
        };
        order.push(library.name.as_str());
        commits.extend(collect_library_commits(source, library, since, &changed)?);
    }

    if commits.is_empty() {
        info!("No upstream commits since last generation");
        return Ok(NO_COMMITS_FOUND.to_string());
    }

    let mut grouped = group_by_id_and_subject(commits);
    sort_newest_first(&mut grouped);

    let start = find_latest_generation_commit(source, &order, input.id_to_since)?;
    let end = grouped[0].commit_hash.clone();
    info!(
        "Describing {} grouped commits between {} and {}",
        grouped.len(),
        short_hash(&start.hash),
        short_hash(&end)
    );

    Ok(render(&grouped, &start.hash, &end, input, ctx))
}

/// Commits for one library, or none when its generated output did not change.
fn collect_library_commits(
    source: &dyn RepositoryReader,
    library: &Library,
    since: &str,
    changed: &[String],
) -> Result<Vec<ConventionalCommit>> {
    let fetch_err = |e: Error| Error::FetchCommits {
        library: library.name.clone(),
        message: e.to_string(),
    };

    let roots = library.owned_paths();
    let mut touched = false;
    for file in changed {
        if path::is_owned(file, &roots, &library.release_exclude_paths).map_err(fetch_err)? {
            touched = true;
            break;
        }
    }
    if !touched {
        debug!("Skipping {}: no generated files changed", library.name);
        return Ok(Vec::new());
    }
    if since.is_empty() {
        debug!("Skipping {}: no reference commit recorded", library.name);
        return Ok(Vec::new());
    }

    let paths = library.api_paths();
    let raw = source
        .commits_for_paths_since(&paths, since)
        .map_err(fetch_err)?;

    let mut parsed = Vec::new();
    for commit in &raw {
        parsed.extend(conventional::parse_commits(commit, &library.name).map_err(fetch_err)?);
    }
    debug!("{}: {} conventional commits", library.name, parsed.len());
    Ok(parsed)
}

fn render(
    commits: &[ConventionalCommit],
    start: &str,
    end: &str,
    input: &GenerationInput<'_>,
    ctx: &RenderContext,
) -> String {
    let sources = input.sources;
    let mut out = String::from("BEGIN_COMMIT_OVERRIDE\n");

    for commit in commits {
        let ids = commit
            .footers
            .get(LIBRARY_IDS)
            .cloned()
            .unwrap_or_else(|| commit.library_id.clone());
        out.push_str(&format!(
            "BEGIN_NESTED_COMMIT\n{}: {}\n{}\n\n{}: {}\n{}: {}\n{}: {}\nEND_NESTED_COMMIT\n",
            commit.commit_type,
            commit.subject,
            commit.body,
            PIPER_ORIGIN_REV_ID,
            commit.piper_id().unwrap_or_default(),
            LIBRARY_IDS,
            ids,
            SOURCE_LINK,
            commit_link(sources, &commit.commit_hash)
        ));
    }
    out.push_str("END_COMMIT_OVERRIDE\n\n");

    out.push_str(&format!(
        "This pull request is generated with proto changes between\n{}\n(exclusive) and\n{}\n(inclusive).\n\n",
        commit_link(sources, start),
        commit_link(sources, end)
    ));
    out.push_str(&format!(
        "Librarian Version: {}\nLanguage Image: {}",
        ctx.librarian_version, ctx.image
    ));

    if !input.failed_libraries.is_empty() {
        out.push_str("\n\n## Generation failed for");
        for id in input.failed_libraries {
            out.push_str("\n- ");
            out.push_str(id);
        }
    }
    out
}

fn commit_link(repo: &GitHubRepo, hash: &str) -> String {
    format!(
        "[{}@{}]({})",
        repo.full_name(),
        short_hash(hash),
        repo.commit_url(hash)
    )
}
