//! Shared test utilities for integration and E2E tests.
//!
//! This module provides common fixtures, manifests, and git helpers to reduce
//! duplication across test files.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_manifest(manifests::RUST);
//!     fixture.command().arg("tidy").assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::git;
    #[allow(unused_imports)]
    pub use super::manifests;
    pub use super::TestFixture;
}

/// Manifest snippets for testing.
#[allow(dead_code)]
pub mod manifests {
    /// A rust manifest whose single library spells out every derived field.
    pub const RUST_VERBOSE: &str = r#"
language: rust
default:
  output: src/generated
  release_level: preview
libraries:
  - name: google-cloud-secretmanager-v1
    output: src/generated/cloud/secretmanager/v1
    release_level: preview
    apis:
      - path: google/cloud/secretmanager/v1
"#;

    /// The tidy form of [`RUST_VERBOSE`].
    pub const RUST_TIDY: &str = r#"
language: rust
default:
  output: src/generated
  release_level: preview
libraries:
  - name: google-cloud-secretmanager-v1
"#;

    /// A go manifest without libraries.
    pub const GO_EMPTY: &str = r#"
language: go
default:
  output: .
"#;

    /// A veneer with no output, which cannot be resolved.
    pub const VENEER_WITHOUT_OUTPUT: &str = r#"
language: rust
libraries:
  - name: google-cloud-storage
    veneer: true
"#;

    /// A manifest with a misspelled field.
    pub const UNKNOWN_FIELD: &str = r#"
language: rust
libraries:
  - name: a
    outptu: src/a
"#;
}

/// A test fixture that provides a temporary directory with an optional
/// `librarian.yaml`.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Write `librarian.yaml` with the given content.
    pub fn with_manifest(self, content: &str) -> Self {
        self.temp_dir
            .child("librarian.yaml")
            .write_str(content)
            .expect("Failed to write manifest");
        self
    }

    /// Add a file with the given path and content.
    #[allow(dead_code)]
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Get the path to the manifest.
    pub fn manifest_path(&self) -> PathBuf {
        self.temp_dir.path().join("librarian.yaml")
    }

    /// Parse the manifest as it is on disk now.
    #[allow(dead_code)]
    pub fn manifest(&self) -> librarian::manifest::Manifest {
        librarian::manifest::Manifest::from_file(self.manifest_path())
            .expect("Failed to read manifest")
    }

    /// Create a command configured to run in this fixture's directory.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("librarian");
        cmd.current_dir(self.path());
        cmd.env_remove("LIBRARIAN_MANIFEST");
        cmd.env_remove("LIBRARIAN_IMAGE");
        cmd.env_remove("LIBRARIAN_GENERATOR");
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Helpers driving the real `git` binary, for tests behind the
/// `integration-tests` feature.
#[allow(dead_code)]
pub mod git {
    use super::*;

    fn run(dir: &Path, args: &[&str]) -> String {
        let output = Command::new("git")
            .arg("-C")
            .arg(dir)
            .args(args)
            .env("GIT_AUTHOR_NAME", "Test")
            .env("GIT_AUTHOR_EMAIL", "test@example.com")
            .env("GIT_COMMITTER_NAME", "Test")
            .env("GIT_COMMITTER_EMAIL", "test@example.com")
            .output()
            .expect("Failed to run git");
        assert!(
            output.status.success(),
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    /// Initialize an empty repository at `dir`.
    pub fn init(dir: &Path) {
        std::fs::create_dir_all(dir).expect("Failed to create repository dir");
        run(dir, &["init", "--quiet"]);
    }

    /// Write `files` and commit them with `message`, returning the hash.
    pub fn commit(dir: &Path, files: &[(&str, &str)], message: &str) -> String {
        for (path, content) in files {
            let full = dir.join(path);
            if let Some(parent) = full.parent() {
                std::fs::create_dir_all(parent).expect("Failed to create parent dir");
            }
            std::fs::write(&full, content).expect("Failed to write file");
            run(dir, &["add", path]);
        }
        run(dir, &["commit", "--quiet", "-m", message]);
        run(dir, &["rev-parse", "HEAD"])
    }

    /// Create a lightweight tag at `HEAD`.
    pub fn tag(dir: &Path, name: &str) {
        run(dir, &["tag", name]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_creates_temp_dir() {
        let fixture = TestFixture::new();
        assert!(fixture.path().exists());
    }

    #[test]
    fn test_fixture_with_manifest() {
        let fixture = TestFixture::new().with_manifest(manifests::RUST_TIDY);
        assert!(fixture.manifest_path().exists());
        assert_eq!(fixture.manifest().libraries.len(), 1);
    }

    #[test]
    fn test_manifests_are_valid_yaml() {
        for manifest in [
            manifests::RUST_VERBOSE,
            manifests::RUST_TIDY,
            manifests::GO_EMPTY,
            manifests::VENEER_WITHOUT_OUTPUT,
            manifests::UNKNOWN_FIELD,
        ] {
            serde_yaml::from_str::<serde_yaml::Value>(manifest).expect("Manifest should be valid YAML");
        }
    }
}
