//! Path matching utilities for library ownership checks

use crate::error::{Error, Result};
use glob::Pattern;

/// Match a path against a glob pattern
pub fn glob_match(pattern: &str, path: &str) -> Result<bool> {
    let pattern = Pattern::new(pattern).map_err(Error::Glob)?;
    Ok(pattern.matches(path))
}

/// Normalize a manifest path: strip `./` prefixes and trailing slashes.
pub fn normalize(path: &str) -> &str {
    let mut path = path;
    while let Some(stripped) = path.strip_prefix("./") {
        path = stripped;
    }
    path.trim_end_matches('/')
}

/// Whether `path` is `root` itself or lies below it.
///
/// An empty root or `.` owns every path.
pub fn is_within(path: &str, root: &str) -> bool {
    let root = normalize(root);
    let path = normalize(path);
    if root.is_empty() || root == "." {
        return true;
    }
    path == root
        || path
            .strip_prefix(root)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Whether `path` is covered by any exclude entry. Entries containing glob
/// metacharacters are matched as globs, everything else as a path prefix.
pub fn is_excluded(path: &str, excludes: &[String]) -> Result<bool> {
    for exclude in excludes {
        let matched = if exclude.contains(['*', '?', '[']) {
            glob_match(exclude, normalize(path))?
        } else {
            is_within(path, exclude)
        };
        if matched {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Whether `path` is owned by one of `roots` and not excluded.
pub fn is_owned(path: &str, roots: &[String], excludes: &[String]) -> Result<bool> {
    if !roots.iter().any(|root| is_within(path, root)) {
        return Ok(false);
    }
    Ok(!is_excluded(path, excludes)?)
}
