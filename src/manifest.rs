//! # Manifest Schema and Parsing
//!
//! This module defines the data structures behind `librarian.yaml`, the
//! declarative manifest describing every generated library in a monorepo, and
//! the logic to read and write it.
//!
//! ## Key Components
//!
//! - **`Manifest`**: The whole file: the target language, the upstream
//!   specification repository, the language repository, the default bundle,
//!   and the ordered list of libraries.
//! - **`Library`**: One library record. Most fields may be left empty and are
//!   filled in by [`crate::defaults::resolve_library`].
//! - **`Defaults`**: The layered default bundle applied to empty library fields.
//! - **`LibraryState`**: Fields written back by generation and release runs.
//!
//! Unknown fields are rejected so that typos in hand-edited manifests surface
//! as errors instead of silently changing derived defaults.

use crate::conventional::ConventionalCommit;
use crate::error::{Error, Result};
use crate::language::{self, LanguageRules};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Default manifest file name.
pub const DEFAULT_MANIFEST_FILENAME: &str = "librarian.yaml";

fn is_false(value: &bool) -> bool {
    !*value
}

/// A GitHub repository, used to build source and compare links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GitHubRepo {
    pub owner: String,
    pub name: String,
}

impl GitHubRepo {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// `owner/name`
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    /// Link to a single commit.
    pub fn commit_url(&self, hash: &str) -> String {
        format!("https://github.com/{}/{}/commit/{}", self.owner, self.name, hash)
    }

    /// Link comparing two refs.
    pub fn compare_url(&self, from: &str, to: &str) -> String {
        format!(
            "https://github.com/{}/{}/compare/{}...{}",
            self.owner, self.name, from, to
        )
    }

    /// Link to a release tag.
    pub fn tag_url(&self, tag: &str) -> String {
        format!(
            "https://github.com/{}/{}/releases/tag/{}",
            self.owner, self.name, tag
        )
    }
}

impl Default for GitHubRepo {
    fn default() -> Self {
        Self::new("googleapis", "googleapis")
    }
}

/// One API (channel) a library is generated from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Api {
    /// Path of the API definition in the specification repository, e.g.
    /// `google/cloud/secretmanager/v1`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub path: String,
    /// Service config file name, relative to `path` unless it contains a `/`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub service_config: String,
}

impl Api {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            service_config: String::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty() && self.service_config.is_empty()
    }

    /// Path of the service config file in the specification repository.
    pub fn service_config_path(&self) -> Option<String> {
        if self.service_config.is_empty() {
            None
        } else if self.service_config.contains('/') {
            Some(self.service_config.clone())
        } else {
            Some(language::join_path(&self.path, &self.service_config))
        }
    }
}

/// A Cargo dependency the generated crate may use.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RustPackageDependency {
    /// Dependency key; unique within a crate.
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub package: String,
    /// Proto package this dependency provides.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub source: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub feature: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub ignore: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub used_if: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub force_used: bool,
}

/// A module generated into an existing crate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RustModule {
    pub output: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub source: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub template: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generate_setter_samples: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub disabled_rustdoc_warnings: Vec<String>,
}

/// Rust-specific library configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RustCrate {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub package_dependencies: Vec<RustPackageDependency>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub disabled_rustdoc_warnings: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generate_setter_samples: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modules: Vec<RustModule>,
}

/// Rust defaults shared by every crate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RustDefault {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub package_dependencies: Vec<RustPackageDependency>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub disabled_rustdoc_warnings: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generate_setter_samples: Option<bool>,
}

/// Dart package metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DartPackage {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub issue_tracker_url: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_keys_environment_variables: String,
    /// Package name to version constraint.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub dependencies: BTreeMap<String, String>,
}

/// Dart defaults shared by every package.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DartDefault {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub issue_tracker_url: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub dependencies: BTreeMap<String, String>,
}

/// The default bundle applied to empty library fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Defaults {
    /// Root directory for derived output paths.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub output: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub release_level: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub transport: String,
    /// Tag format override for every library, e.g. `{id}-v{version}`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tag_format: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rust: Option<RustDefault>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dart: Option<DartDefault>,
}

/// Fields written back by generation and release runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LibraryState {
    /// Current released version.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,
    /// Version the next release must use, if pinned.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub next_version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub previous_version: String,
    /// Specification repository commit the library was last generated from.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub last_generated_commit: String,
    /// Language repository commit of the last release.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub last_released_commit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_timestamp: Option<DateTime<Utc>>,
    /// Changes accumulated since the last release.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub changes: Vec<ConventionalCommit>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub release_triggered: bool,
}

impl LibraryState {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// One library in the manifest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Library {
    /// Unique library ID.
    pub name: String,
    /// Directory of the generated code.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub output: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub apis: Vec<Api>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub release_level: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub transport: String,
    /// Hand-written wrapper; never generated, output must be explicit.
    #[serde(default, skip_serializing_if = "is_false")]
    pub veneer: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub skip_generate: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub skip_publish: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tag_format: String,
    /// Paths in the language repository owned by this library.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub source_roots: Vec<String>,
    /// Glob patterns or path prefixes ignored when deciding release-worthiness.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub release_exclude_paths: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rust: Option<RustCrate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dart: Option<DartPackage>,
    #[serde(default, skip_serializing_if = "LibraryState::is_empty")]
    pub state: LibraryState,
}

impl Library {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Non-empty API paths, in declaration order.
    pub fn api_paths(&self) -> Vec<String> {
        self.apis
            .iter()
            .filter(|api| !api.path.is_empty())
            .map(|api| api.path.clone())
            .collect()
    }

    /// Paths owned by the library in the language repository. Falls back to
    /// the output directory when no source roots are declared.
    pub fn owned_paths(&self) -> Vec<String> {
        if !self.source_roots.is_empty() {
            self.source_roots.clone()
        } else if !self.output.is_empty() {
            vec![self.output.clone()]
        } else {
            Vec::new()
        }
    }

    /// Tag format in effect: library, then defaults, then language rule.
    pub fn effective_tag_format<'a>(
        &'a self,
        defaults: &'a Defaults,
        rules: &'static LanguageRules,
    ) -> &'a str {
        if !self.tag_format.is_empty() {
            &self.tag_format
        } else if !defaults.tag_format.is_empty() {
            &defaults.tag_format
        } else {
            rules.tag_format
        }
    }
}

/// The whole `librarian.yaml` file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Target language identifier, e.g. `rust`.
    pub language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Upstream specification repository.
    #[serde(default)]
    pub sources: GitHubRepo,
    /// Language repository, used for release links.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<GitHubRepo>,
    #[serde(default)]
    pub default: Defaults,
    #[serde(default)]
    pub libraries: Vec<Library>,
}

impl Manifest {
    /// Parse a manifest from YAML and validate it.
    pub fn parse(yaml_content: &str) -> Result<Self> {
        let manifest: Manifest =
            serde_yaml::from_str(yaml_content).map_err(|e| Error::ManifestParse {
                message: e.to_string(),
                hint: manifest_hint(&e.to_string()),
            })?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Read a manifest from disk.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Write the manifest back to disk.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_yaml()?)?;
        Ok(())
    }

    /// Derivation rules for the manifest's language.
    pub fn rules(&self) -> &'static LanguageRules {
        language::rules_for(&self.language)
    }

    pub fn library(&self, id: &str) -> Option<&Library> {
        self.libraries.iter().find(|lib| lib.name == id)
    }

    pub fn library_mut(&mut self, id: &str) -> Option<&mut Library> {
        self.libraries.iter_mut().find(|lib| lib.name == id)
    }

    /// Check invariants serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.language.is_empty() {
            return Err(Error::ManifestParse {
                message: "language must not be empty".to_string(),
                hint: Some(format!(
                    "Set 'language' to one of: {}",
                    language::supported_languages().join(", ")
                )),
            });
        }
        let mut seen = std::collections::HashSet::new();
        for library in &self.libraries {
            if library.name.is_empty() {
                return Err(Error::ManifestParse {
                    message: "library with empty name".to_string(),
                    hint: Some("Every library needs a unique 'name'".to_string()),
                });
            }
            if !seen.insert(library.name.as_str()) {
                return Err(Error::ManifestParse {
                    message: format!("duplicate library name: {}", library.name),
                    hint: Some("Library names must be unique within a manifest".to_string()),
                });
            }
        }
        Ok(())
    }
}

fn manifest_hint(message: &str) -> Option<String> {
    if message.contains("unknown field") {
        Some("Check the field name for typos; unknown fields are not allowed".to_string())
    } else if message.contains("missing field `language`") {
        Some("Add 'language: <name>' at the top level".to_string())
    } else if message.contains("missing field `name`") {
        Some("Every library needs a 'name'".to_string())
    } else {
        None
    }
}
