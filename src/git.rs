//! Thin wrappers around the system `git` command.
//!
//! Every function runs `git -C <dir> ...` and turns a non-zero exit into
//! [`Error::GitCommand`] carrying the command, directory, and stderr.

use std::path::Path;
use std::process::Command;

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::repository::Commit;

/// Field and record separators used in `--format` strings.
const FIELD_SEP: char = '\x1f';
const RECORD_SEP: char = '\x1e';
const LOG_FORMAT: &str = "--format=%H%x1f%cI%x1f%B%x1e";

/// Run a git command in `dir` and return its stdout.
pub fn run(dir: &Path, args: &[&str]) -> Result<String> {
    let output = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(args)
        .output()
        .map_err(|e| Error::GitCommand {
            command: args.join(" "),
            dir: dir.display().to_string(),
            stderr: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(Error::GitCommand {
            command: args.join(" "),
            dir: dir.display().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Resolve a revision to a full hash.
pub fn rev_parse(dir: &Path, rev: &str) -> Result<String> {
    Ok(run(dir, &["rev-parse", "--verify", rev])?.trim().to_string())
}

/// Read a single commit.
pub fn show_commit(dir: &Path, hash: &str) -> Result<Commit> {
    let out = run(dir, &["show", "-s", LOG_FORMAT, hash])?;
    parse_log(&out)?
        .into_iter()
        .next()
        .ok_or_else(|| Error::GitCommand {
            command: format!("show {}", hash),
            dir: dir.display().to_string(),
            stderr: "commit not found".to_string(),
        })
}

/// Commits after `since` touching any of `paths`, newest first.
pub fn log_paths_since(dir: &Path, paths: &[String], since: &str) -> Result<Vec<Commit>> {
    let range = if since.is_empty() {
        "HEAD".to_string()
    } else {
        format!("{}..HEAD", since)
    };
    let mut args = vec!["log", LOG_FORMAT, range.as_str(), "--"];
    args.extend(paths.iter().map(String::as_str));
    parse_log(&run(dir, &args)?)
}

/// The most recent commit touching `path`.
pub fn latest_commit_for_path(dir: &Path, path: &str) -> Result<Commit> {
    let out = run(dir, &["log", "-1", LOG_FORMAT, "HEAD", "--", path])?;
    parse_log(&out)?
        .into_iter()
        .next()
        .ok_or_else(|| Error::GitCommand {
            command: format!("log -1 -- {}", path),
            dir: dir.display().to_string(),
            stderr: format!("no commit touches {}", path),
        })
}

/// Files changed by `hash`.
pub fn files_in_commit(dir: &Path, hash: &str) -> Result<Vec<String>> {
    let out = run(
        dir,
        &["diff-tree", "--no-commit-id", "--name-only", "-r", "--root", hash],
    )?;
    Ok(non_empty_lines(&out))
}

/// Paths reported by `git status --porcelain`.
pub fn status_porcelain(dir: &Path) -> Result<Vec<String>> {
    let out = run(dir, &["status", "--porcelain", "--untracked-files=all"])?;
    Ok(parse_porcelain(&out))
}

fn non_empty_lines(out: &str) -> Vec<String> {
    out.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse `git status --porcelain` output, keeping the new name of renames.
pub fn parse_porcelain(out: &str) -> Vec<String> {
    out.lines()
        .filter(|line| line.len() > 3)
        .map(|line| {
            let path = &line[3..];
            match path.split_once(" -> ") {
                Some((_, to)) => to.trim_matches('"').to_string(),
                None => path.trim_matches('"').to_string(),
            }
        })
        .collect()
}

/// Parse records produced with [`LOG_FORMAT`].
pub fn parse_log(out: &str) -> Result<Vec<Commit>> {
    let mut commits = Vec::new();
    for record in out.split(RECORD_SEP) {
        let record = record.trim_start_matches(['\n', '\r']);
        if record.trim().is_empty() {
            continue;
        }
        let mut fields = record.splitn(3, FIELD_SEP);
        let hash = fields.next().unwrap_or_default().trim().to_string();
        let when = fields.next().unwrap_or_default().trim();
        let message = fields.next().unwrap_or_default().trim_end().to_string();
        let when = DateTime::parse_from_rfc3339(when)?.with_timezone(&Utc);
        commits.push(Commit {
            hash,
            message,
            when,
        });
    }
    Ok(commits)
}
