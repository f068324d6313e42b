//! # Conventional Commit Parsing
//!
//! Turns raw commit messages into [`ConventionalCommit`] records tagged with
//! the library they were collected for.
//!
//! A message has a header (`type(scope)!: subject`), an optional body, and an
//! optional trailing block of footers (`Key: value` or `Key #value`). A
//! message may also wrap its content in `BEGIN_COMMIT_OVERRIDE` /
//! `END_COMMIT_OVERRIDE` and hold several `BEGIN_NESTED_COMMIT` /
//! `END_NESTED_COMMIT` blocks, each of which becomes its own record. This is
//! the same shape the generation PR body uses, so merged generation PRs parse
//! back into the commits they describe.

use crate::error::{Error, Result};
use crate::repository::Commit;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Footer holding the upstream change number.
pub const PIPER_ORIGIN_REV_ID: &str = "PiperOrigin-RevId";
/// Footer listing every library a change applies to.
pub const LIBRARY_IDS: &str = "Library-IDs";
/// Footer linking back to the upstream commit.
pub const SOURCE_LINK: &str = "Source-link";
/// Footer marking a breaking change.
pub const BREAKING_CHANGE: &str = "BREAKING CHANGE";
/// A commit naming at least this many libraries is a bulk change.
pub const BULK_CHANGE_THRESHOLD: usize = 10;

const BEGIN_OVERRIDE: &str = "BEGIN_COMMIT_OVERRIDE";
const END_OVERRIDE: &str = "END_COMMIT_OVERRIDE";
const BEGIN_NESTED: &str = "BEGIN_NESTED_COMMIT";
const END_NESTED: &str = "END_NESTED_COMMIT";

/// A single parsed conventional commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConventionalCommit {
    #[serde(rename = "type")]
    pub commit_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub scope: String,
    pub subject: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub body: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub breaking: bool,
    pub library_id: String,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub footers: IndexMap<String, String>,
    pub commit_hash: String,
    pub when: DateTime<Utc>,
    /// Affects many libraries at once.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub bulk: bool,
}

impl ConventionalCommit {
    /// The `PiperOrigin-RevId` footer, if present and non-empty.
    pub fn piper_id(&self) -> Option<&str> {
        self.footers
            .get(PIPER_ORIGIN_REV_ID)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Library IDs named by the `Library-IDs` footer, falling back to the
    /// library this commit was collected for.
    pub fn library_ids(&self) -> Vec<&str> {
        match self.footers.get(LIBRARY_IDS) {
            Some(ids) if !ids.trim().is_empty() => ids
                .split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .collect(),
            _ => vec![self.library_id.as_str()],
        }
    }
}

fn header_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(?P<type>[A-Za-z]+)(?:\((?P<scope>[^()\r\n]*)\))?(?P<breaking>!)?:\s+(?P<subject>\S.*)$",
        )
        .expect("header regex is valid")
    })
}

fn footer_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?P<key>BREAKING[ -]CHANGE|[A-Za-z][A-Za-z0-9-]*)(?::\s|:$|\s#)(?P<value>.*)$")
            .expect("footer regex is valid")
    })
}

/// Parse every conventional commit contained in `commit`.
///
/// Returns an empty list when the message is not a conventional commit and
/// fails with [`Error::EmptyCommitMessage`] when the message is empty.
pub fn parse_commits(commit: &Commit, library_id: &str) -> Result<Vec<ConventionalCommit>> {
    let message = commit.message.trim();
    if message.is_empty() {
        return Err(Error::EmptyCommitMessage {
            hash: commit.hash.clone(),
        });
    }

    let message = strip_override(message);
    let (outer, nested) = split_nested(message);

    let mut commits = Vec::new();
    for segment in std::iter::once(outer.as_str()).chain(nested.iter().map(String::as_str)) {
        if segment.trim().is_empty() {
            continue;
        }
        match parse_segment(segment, commit, library_id) {
            Some(parsed) => commits.push(parsed),
            None => debug!(
                "Skipping non-conventional message segment in {} for {}",
                commit.hash, library_id
            ),
        }
    }
    Ok(commits)
}

/// Parse a message and return its first conventional commit.
pub fn parse(commit: &Commit, library_id: &str) -> Result<Option<ConventionalCommit>> {
    Ok(parse_commits(commit, library_id)?.into_iter().next())
}

/// Keep only the override section when one is present.
fn strip_override(message: &str) -> &str {
    match message.find(BEGIN_OVERRIDE) {
        Some(start) => {
            let inner = &message[start + BEGIN_OVERRIDE.len()..];
            match inner.find(END_OVERRIDE) {
                Some(end) => &inner[..end],
                None => inner,
            }
        }
        None => message,
    }
}

/// Split nested commit blocks from the surrounding text.
fn split_nested(message: &str) -> (String, Vec<String>) {
    let mut outer = String::new();
    let mut nested = Vec::new();
    let mut rest = message;

    while let Some(start) = rest.find(BEGIN_NESTED) {
        outer.push_str(&rest[..start]);
        let after = &rest[start + BEGIN_NESTED.len()..];
        match after.find(END_NESTED) {
            Some(end) => {
                nested.push(after[..end].to_string());
                rest = &after[end + END_NESTED.len()..];
            }
            None => {
                nested.push(after.to_string());
                rest = "";
            }
        }
    }
    outer.push_str(rest);
    (outer, nested)
}

fn parse_segment(segment: &str, commit: &Commit, library_id: &str) -> Option<ConventionalCommit> {
    let mut lines = segment.lines().skip_while(|line| line.trim().is_empty());
    let header = lines.next()?.trim();
    let caps = header_regex().captures(header)?;

    let rest: Vec<&str> = lines.collect();
    let footer_start = find_footer_start(&rest);

    let body = rest[..footer_start].join("\n").trim().to_string();
    let footers = parse_footers(&rest[footer_start..]);

    let breaking = caps.name("breaking").is_some() || footers.contains_key(BREAKING_CHANGE);
    let mut parsed = ConventionalCommit {
        commit_type: caps["type"].to_lowercase(),
        scope: caps
            .name("scope")
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default(),
        subject: caps["subject"].trim().to_string(),
        body,
        breaking,
        library_id: library_id.to_string(),
        footers,
        commit_hash: commit.hash.clone(),
        when: commit.when,
        bulk: false,
    };
    parsed.bulk = parsed.library_ids().len() >= BULK_CHANGE_THRESHOLD;
    Some(parsed)
}

/// Index of the first footer line: a footer-shaped line that opens a
/// paragraph and is followed only by footers, continuations, or blanks.
fn find_footer_start(lines: &[&str]) -> usize {
    let re = footer_regex();
    for (i, line) in lines.iter().enumerate() {
        let opens_paragraph = i == 0 || lines[i - 1].trim().is_empty();
        if opens_paragraph && re.is_match(line.trim_end()) {
            let tail_ok = lines[i + 1..]
                .iter()
                .all(|l| l.trim().is_empty() || re.is_match(l.trim_end()) || l.starts_with([' ', '\t']));
            if tail_ok {
                return i;
            }
        }
    }
    lines.len()
}

fn parse_footers(lines: &[&str]) -> IndexMap<String, String> {
    let re = footer_regex();
    let mut footers: IndexMap<String, String> = IndexMap::new();
    let mut last_key: Option<String> = None;

    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        if let Some(caps) = re.captures(line.trim_end()) {
            let key = caps["key"].replace("BREAKING-CHANGE", BREAKING_CHANGE);
            footers.insert(key.clone(), caps["value"].trim().to_string());
            last_key = Some(key);
        } else if let Some(key) = &last_key {
            if let Some(value) = footers.get_mut(key) {
                value.push('\n');
                value.push_str(line.trim());
            }
        }
    }
    footers
}
