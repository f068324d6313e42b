//! # Language Rules
//!
//! Each supported language has its own small set of pure derivation rules:
//! where generated code lands by default, how a library name maps to an API
//! path and back, and how release tags are spelled. The rules are kept in a
//! static registry keyed by language identifier so callers never branch on
//! the language themselves. Unknown identifiers fall back to the generic
//! rules.
//!
//! The exact string rules matter: `tidy` drops any manifest value equal to
//! its derived default, so the derivations must be stable across runs.

/// Derivation rules for one language.
#[derive(Debug, Clone, Copy)]
pub struct LanguageRules {
    /// Language identifier as written in the manifest.
    pub id: &'static str,
    /// Maps the first API path and the default output root to an output
    /// directory.
    pub default_output: fn(api_path: &str, default_root: &str) -> String,
    /// Maps a library name to its canonical API path.
    pub api_path_from_name: fn(name: &str) -> String,
    /// Maps an API path to the default library name.
    pub name_from_api_path: fn(api_path: &str) -> String,
    /// Tag format used when neither the library nor the defaults set one.
    pub tag_format: &'static str,
}

const RUST: LanguageRules = LanguageRules {
    id: "rust",
    default_output: rust_default_output,
    api_path_from_name: dashes_to_slashes,
    name_from_api_path: slashes_to_dashes,
    tag_format: "{id}-v{version}",
};

const GO: LanguageRules = LanguageRules {
    id: "go",
    default_output: go_default_output,
    api_path_from_name: go_api_path_from_name,
    name_from_api_path: go_name_from_api_path,
    tag_format: "{id}/v{version}",
};

const PYTHON: LanguageRules = LanguageRules {
    id: "python",
    default_output: python_default_output,
    api_path_from_name: python_api_path_from_name,
    name_from_api_path: python_name_from_api_path,
    tag_format: "{id}-v{version}",
};

const DART: LanguageRules = LanguageRules {
    id: "dart",
    default_output: dart_default_output,
    api_path_from_name: underscores_to_slashes,
    name_from_api_path: slashes_to_underscores,
    tag_format: "{id}-v{version}",
};

const GENERIC: LanguageRules = LanguageRules {
    id: "generic",
    default_output: generic_default_output,
    api_path_from_name: dashes_to_slashes,
    name_from_api_path: slashes_to_dashes,
    tag_format: "{id}-{version}",
};

static REGISTRY: &[LanguageRules] = &[RUST, GO, PYTHON, DART];

/// Returns the rules for `language`, or the generic rules when the language
/// is not registered.
pub fn rules_for(language: &str) -> &'static LanguageRules {
    REGISTRY
        .iter()
        .find(|rules| rules.id.eq_ignore_ascii_case(language))
        .unwrap_or(&GENERIC)
}

/// Returns the identifiers of all registered languages.
pub fn supported_languages() -> Vec<&'static str> {
    REGISTRY.iter().map(|rules| rules.id).collect()
}

/// Expand a tag format such as `{id}-v{version}`.
pub fn format_tag(format: &str, id: &str, version: &str) -> String {
    format.replace("{id}", id).replace("{version}", version)
}

/// Join manifest paths with `/` regardless of host platform.
pub(crate) fn join_path(root: &str, rel: &str) -> String {
    let root = root.trim_end_matches('/');
    let rel = rel.trim_start_matches('/');
    match (root.is_empty(), rel.is_empty()) {
        (true, _) => rel.to_string(),
        (_, true) => root.to_string(),
        _ => format!("{}/{}", root, rel),
    }
}

/// Whether a path segment looks like an API version (`v1`, `v2beta`, ...).
fn is_version_segment(segment: &str) -> bool {
    let mut chars = segment.chars();
    chars.next() == Some('v') && chars.next().is_some_and(|c| c.is_ascii_digit())
}

/// Drop a trailing version segment, if any.
fn strip_version(api_path: &str) -> &str {
    match api_path.rsplit_once('/') {
        Some((head, last)) if is_version_segment(last) => head,
        _ => api_path,
    }
}

fn slashes_to_dashes(s: &str) -> String {
    s.replace('/', "-")
}

fn dashes_to_slashes(s: &str) -> String {
    s.replace('-', "/")
}

fn slashes_to_underscores(s: &str) -> String {
    s.replace('/', "_")
}

fn underscores_to_slashes(s: &str) -> String {
    s.replace('_', "/")
}

fn rust_default_output(api_path: &str, default_root: &str) -> String {
    let rel = api_path.strip_prefix("google/").unwrap_or(api_path);
    join_path(default_root, rel)
}

fn go_name_from_api_path(api_path: &str) -> String {
    let trimmed = strip_version(api_path);
    trimmed.rsplit('/').next().unwrap_or(trimmed).to_string()
}

fn go_api_path_from_name(name: &str) -> String {
    format!("google/cloud/{}/v1", name)
}

fn go_default_output(api_path: &str, default_root: &str) -> String {
    join_path(default_root, &go_name_from_api_path(api_path))
}

fn python_name_from_api_path(api_path: &str) -> String {
    strip_version(api_path).replace('/', "-")
}

fn python_api_path_from_name(name: &str) -> String {
    format!("{}/v1", name.replace('-', "/"))
}

fn python_default_output(api_path: &str, default_root: &str) -> String {
    join_path(default_root, &python_name_from_api_path(api_path))
}

fn dart_default_output(api_path: &str, default_root: &str) -> String {
    join_path(default_root, &slashes_to_underscores(api_path))
}

fn generic_default_output(_api_path: &str, default_root: &str) -> String {
    default_root.to_string()
}
