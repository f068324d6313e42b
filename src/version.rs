//! # Release Version Calculation
//!
//! Decides which version a triggered library is released at.
//!
//! ## Precedence
//!
//! 1.  An explicit version supplied by the caller.
//! 2.  The library's recorded `next_version`.
//! 3.  An arithmetic bump of the current version:
//!     - With a prerelease ending in digits, the trailing digits are
//!       incremented and keep at least their original width
//!       (`1.2.0-beta.09` becomes `1.2.0-beta.10`).
//!     - With a prerelease lacking trailing digits (`1.2.0-rc`), the bump
//!       fails.
//!     - Without a prerelease, the minor version is bumped and the patch
//!       reset (`1.2.3` becomes `1.3.0`).
//!
//!     Build metadata is always dropped.
//!
//! Prerelease identifiers are handled as text because zero-padded numeric
//! identifiers such as `09` are not valid semver and would be rejected by a
//! strict parser.

use crate::error::{Error, Result};
use crate::manifest::Library;
use semver::Version;

/// Compute the version `library` should be released at.
pub fn calculate_next_version(library: &Library, explicit: Option<&str>) -> Result<String> {
    if let Some(version) = explicit.filter(|v| !v.is_empty()) {
        return Ok(version.to_string());
    }
    if !library.state.next_version.is_empty() {
        return Ok(library.state.next_version.clone());
    }
    if library.state.version.is_empty() {
        return Err(Error::Version {
            version: String::new(),
            message: format!(
                "library {} has no current version to bump and no version was supplied",
                library.name
            ),
        });
    }
    bump_version(&library.state.version)
}

/// Bump a version string as described in the module docs.
pub fn bump_version(current: &str) -> Result<String> {
    let (core, prerelease) = split_version(current);
    let core_version = Version::parse(core).map_err(|e| Error::Version {
        version: current.to_string(),
        message: e.to_string(),
    })?;

    match prerelease {
        Some(pre) => {
            let bumped = increment_trailing_digits(pre).ok_or_else(|| Error::Version {
                version: current.to_string(),
                message: format!("prerelease {:?} has no trailing number to increment", pre),
            })?;
            Ok(format!("{}-{}", core_version, bumped))
        }
        None => Ok(format!("{}.{}.0", core_version.major, core_version.minor + 1)),
    }
}

/// Split `X.Y.Z[-pre][+build]` into the core and the prerelease.
fn split_version(version: &str) -> (&str, Option<&str>) {
    let without_build = version.split_once('+').map_or(version, |(v, _)| v);
    match without_build.split_once('-') {
        Some((core, pre)) if !pre.is_empty() => (core, Some(pre)),
        Some((core, _)) => (core, None),
        None => (without_build, None),
    }
}

/// Increment the run of ASCII digits at the end of `s`, zero-padding to the
/// original width.
fn increment_trailing_digits(s: &str) -> Option<String> {
    let prefix_len = s.trim_end_matches(|c: char| c.is_ascii_digit()).len();
    let digits = &s[prefix_len..];
    if digits.is_empty() {
        return None;
    }
    let next = digits.parse::<u128>().ok()?.checked_add(1)?;
    Some(format!(
        "{}{:0width$}",
        &s[..prefix_len],
        next,
        width = digits.len()
    ))
}
