//! # Error Handling
//!
//! This module defines the centralized error type for the `librarian`
//! library. It uses `thiserror` to build a single `Error` enum covering every
//! failure the defaults engine, the note engine, and the repository plumbing
//! can report.
//!
//! Errors fall into two severities at the call sites:
//!
//! - **Library-level**: a single library failed to fetch commits, generate, or
//!   build. Callers record the library ID and carry on with its siblings.
//! - **Run-level**: the manifest cannot be read, no start commit can anchor the
//!   diff, or state cannot be written. These abort the run before any artifact
//!   is produced.
//!
//! Every variant names the operation and the identifier (library ID, path,
//! commit hash) that failed, so wrapped collaborator errors are never
//! surfaced without context.

use thiserror::Error;

/// Main error type for librarian operations
#[derive(Error, Debug)]
pub enum Error {
    /// The manifest could not be parsed or failed validation.
    #[error("Manifest parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ManifestParse {
        message: String,
        /// Optional hint for how to fix the manifest
        hint: Option<String>,
    },

    /// No library with the given ID exists in the manifest.
    #[error("Library not found: {id}")]
    LibraryNotFound { id: String },

    /// A library with the given ID is already present in the manifest.
    #[error("Library already exists: {id}")]
    LibraryExists { id: String },

    /// The library does not declare the requested API path.
    #[error("API {path} not found in library {library}")]
    ApiNotFound { library: String, path: String },

    /// The API entry has no service config to look up.
    #[error("Service config not found for API {path} in library {library}")]
    ServiceConfigNotFound { library: String, path: String },

    /// A veneer library has no explicit output directory.
    #[error("Missing output for veneer library {library}: veneers must set `output` explicitly")]
    MissingOutput { library: String },

    /// A commit carried an empty message and cannot be parsed.
    #[error("Commit {hash} has an empty message")]
    EmptyCommitMessage { hash: String },

    /// The commit has no `PiperOrigin-RevId` footer.
    #[error("PiperOrigin-RevId not found in commit {hash}")]
    PiperIdNotFound { hash: String },

    /// Changed files in the language repository could not be listed.
    #[error("failed to fetch changes in language repo: {message}")]
    FetchChanges { message: String },

    /// Conventional commits for a library could not be fetched or parsed.
    #[error("failed to fetch conventional commits for library {library}: {message}")]
    FetchCommits { library: String, message: String },

    /// No reference commit could anchor the proto diff range.
    #[error("failed to find the start commit: {message}")]
    StartCommitNotFound { message: String },

    /// A version could not be computed.
    #[error("Version error for {version:?}: {message}")]
    Version { version: String, message: String },

    /// A git command failed.
    #[error("Git command failed in {dir}: {command} - {stderr}")]
    GitCommand {
        command: String,
        dir: String,
        stderr: String,
    },

    /// The per-library generator reported a failure.
    #[error("Generation failed for {library}: {message}")]
    Generator { library: String, message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A JSON parsing error, wrapped from `serde_json::Error`.
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// A regular expression error, wrapped from `regex::Error`.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// A glob pattern error, wrapped from `glob::PatternError`.
    #[error("Glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),

    /// A semantic versioning parsing error, wrapped from `semver::Error`.
    #[error("Semver parsing error: {0}")]
    Semver(#[from] semver::Error),

    /// A timestamp parsing error, wrapped from `chrono::ParseError`.
    #[error("Timestamp parsing error: {0}")]
    Timestamp(#[from] chrono::ParseError),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_manifest_parse() {
        let error = Error::ManifestParse {
            message: "unknown field `outptu`".to_string(),
            hint: None,
        };
        let display = format!("{}", error);
        assert!(display.contains("Manifest parsing error"));
        assert!(display.contains("outptu"));
        assert!(!display.contains("hint:"));
    }

    #[test]
    fn test_error_display_manifest_parse_with_hint() {
        let error = Error::ManifestParse {
            message: "missing field `language`".to_string(),
            hint: Some("Add 'language: rust' at the top level".to_string()),
        };
        let display = format!("{}", error);
        assert!(display.contains("hint:"));
        assert!(display.contains("language: rust"));
    }

    #[test]
    fn test_error_display_missing_output() {
        let error = Error::MissingOutput {
            library: "google-cloud-wkt".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("google-cloud-wkt"));
        assert!(display.contains("veneer"));
    }

    #[test]
    fn test_error_display_fetch_commits_names_library() {
        let error = Error::FetchCommits {
            library: "secretmanager".to_string(),
            message: "bad revision".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.starts_with("failed to fetch conventional commits for library secretmanager"));
        assert!(display.contains("bad revision"));
    }

    #[test]
    fn test_error_display_start_commit() {
        let error = Error::StartCommitNotFound {
            message: "no library has a last generated commit".to_string(),
        };
        assert!(format!("{}", error).starts_with("failed to find the start commit"));
    }

    #[test]
    fn test_error_display_git_command() {
        let error = Error::GitCommand {
            command: "log".to_string(),
            dir: "/tmp/googleapis".to_string(),
            stderr: "fatal: bad object".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("Git command failed"));
        assert!(display.contains("/tmp/googleapis"));
        assert!(display.contains("fatal: bad object"));
    }

    #[test]
    fn test_error_from_io_error() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let error: Error = io_error.into();
        let display = format!("{}", error);
        assert!(display.contains("I/O error"));
        assert!(display.contains("File not found"));
    }

    #[test]
    fn test_error_from_yaml_error() {
        let yaml_error = serde_yaml::from_str::<serde_yaml::Value>("invalid: [unclosed").unwrap_err();
        let error: Error = yaml_error.into();
        assert!(format!("{}", error).contains("YAML parsing error"));
    }

    #[test]
    fn test_error_from_semver_error() {
        let semver_error = semver::Version::parse("not-a-version").unwrap_err();
        let error: Error = semver_error.into();
        assert!(format!("{}", error).contains("Semver parsing error"));
    }
}
