//! # Library Generation
//!
//! Code generation itself is language specific and happens outside this
//! crate. A [`Generator`] is handed one resolved library at a time and returns
//! the updated record. [`generate_all`] fans the libraries out across a rayon
//! pool, joins, and reports failures per library so that one broken library
//! does not stop its siblings.
//!
//! [`CommandGenerator`] is the stock implementation. It runs an external
//! command with the library described through environment variables:
//!
//! | variable | value |
//! |---|---|
//! | `LIBRARIAN_LIBRARY_ID` | library name |
//! | `LIBRARIAN_OUTPUT` | output directory |
//! | `LIBRARIAN_SOURCE` | checkout of the specification repository |
//! | `LIBRARIAN_API_PATHS` | API paths, comma separated |
//! | `LIBRARIAN_RESPONSE` | file the command may write a [`GenerateResponse`] to |

use crate::error::{Error, Result};
use crate::manifest::Library;
use log::{debug, info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Generates code for a single library.
pub trait Generator: Send + Sync {
    /// Generate `library` from the specification checkout at `source`.
    fn generate(&self, library: &Library, source: &Path) -> Result<Library>;
}

/// Optional JSON written by a generator command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateResponse {
    /// Set when generation failed.
    pub error: Option<String>,
    /// Replaces the library's source roots when non-empty.
    pub source_roots: Vec<String>,
    /// Replaces the library's release exclude paths when non-empty.
    pub release_exclude_paths: Vec<String>,
}

impl GenerateResponse {
    /// Apply the response to `library`.
    pub fn apply(self, mut library: Library) -> Result<Library> {
        if let Some(message) = self.error.filter(|m| !m.is_empty()) {
            return Err(Error::Generator {
                library: library.name,
                message,
            });
        }
        if !self.source_roots.is_empty() {
            library.source_roots = self.source_roots;
        }
        if !self.release_exclude_paths.is_empty() {
            library.release_exclude_paths = self.release_exclude_paths;
        }
        Ok(library)
    }
}

/// Runs an external program for each library.
#[derive(Debug, Clone)]
pub struct CommandGenerator {
    program: String,
    args: Vec<String>,
    work_dir: PathBuf,
}

impl CommandGenerator {
    pub fn new(program: impl Into<String>, args: Vec<String>, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args,
            work_dir: work_dir.into(),
        }
    }

    /// Build from a whitespace-separated command line.
    pub fn from_command_line(command: &str, work_dir: impl Into<PathBuf>) -> Result<Self> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next().ok_or_else(|| Error::Generator {
            library: String::new(),
            message: "empty generator command".to_string(),
        })?;
        Ok(Self::new(program, parts.collect(), work_dir))
    }

    fn response_path(&self, library: &Library) -> PathBuf {
        let safe: String = library
            .name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        std::env::temp_dir().join(format!(
            "librarian-{}-{}-response.json",
            std::process::id(),
            safe
        ))
    }
}

impl Generator for CommandGenerator {
    fn generate(&self, library: &Library, source: &Path) -> Result<Library> {
        let response = self.response_path(library);
        if response.exists() {
            std::fs::remove_file(&response)?;
        }

        debug!("Running {} for {}", self.program, library.name);
        let output = Command::new(&self.program)
            .args(&self.args)
            .current_dir(&self.work_dir)
            .env("LIBRARIAN_LIBRARY_ID", &library.name)
            .env("LIBRARIAN_OUTPUT", &library.output)
            .env("LIBRARIAN_SOURCE", source)
            .env("LIBRARIAN_API_PATHS", library.api_paths().join(","))
            .env("LIBRARIAN_RESPONSE", &response)
            .output()
            .map_err(|e| Error::Generator {
                library: library.name.clone(),
                message: format!("failed to run {}: {}", self.program, e),
            })?;

        if !output.status.success() {
            let _ = std::fs::remove_file(&response);
            return Err(Error::Generator {
                library: library.name.clone(),
                message: format!(
                    "{} exited with {}: {}",
                    self.program,
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        if !response.exists() {
            return Ok(library.clone());
        }
        let content = std::fs::read_to_string(&response)?;
        std::fs::remove_file(&response)?;
        let parsed: GenerateResponse = serde_json::from_str(&content)?;
        parsed.apply(library.clone())
    }
}

/// Result of a generation run.
#[derive(Debug, Clone, Default)]
pub struct GenerationOutcome {
    /// Every input library, updated when generation succeeded and unchanged
    /// otherwise, in input order.
    pub libraries: Vec<Library>,
    /// IDs of libraries whose generation failed, in input order.
    pub failed: Vec<String>,
}

/// Generate every library in parallel.
///
/// Libraries with `skip_generate` pass through untouched. `on_done` is called
/// once per library as it finishes, from worker threads.
pub fn generate_all<F>(
    generator: &dyn Generator,
    libraries: Vec<Library>,
    source: &Path,
    on_done: F,
) -> GenerationOutcome
where
    F: Fn(&str) + Sync,
{
    let results: Vec<(Library, Option<Error>)> = libraries
        .into_par_iter()
        .map(|library| {
            if library.skip_generate {
                debug!("Skipping generation of {}", library.name);
                on_done(&library.name);
                return (library, None);
            }
            let result = generator.generate(&library, source);
            on_done(&library.name);
            match result {
                Ok(updated) => (updated, None),
                Err(e) => (library, Some(e)),
            }
        })
        .collect();

    let mut outcome = GenerationOutcome::default();
    for (library, error) in results {
        if let Some(e) = error {
            warn!("Generation failed for {}: {}", library.name, e);
            outcome.failed.push(library.name.clone());
        }
        outcome.libraries.push(library);
    }
    info!(
        "Generated {} libraries, {} failed",
        outcome.libraries.len() - outcome.failed.len(),
        outcome.failed.len()
    );
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeGenerator;

    impl Generator for FakeGenerator {
        fn generate(&self, library: &Library, _source: &Path) -> Result<Library> {
            if library.name.starts_with("broken") {
                return Err(Error::Generator {
                    library: library.name.clone(),
                    message: "protoc failed".to_string(),
                });
            }
            let mut updated = library.clone();
            updated.source_roots = vec![format!("src/{}", library.name)];
            Ok(updated)
        }
    }

    fn libs(names: &[&str]) -> Vec<Library> {
        names.iter().map(|n| Library::new(*n)).collect()
    }

    #[test]
    fn test_generate_all_isolates_failures() {
        let counter = AtomicUsize::new(0);
        let outcome = generate_all(
            &FakeGenerator,
            libs(&["a", "broken-1", "b", "broken-2", "c"]),
            Path::new("/tmp/googleapis"),
            |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            },
        );
        assert_eq!(counter.load(Ordering::SeqCst), 5);
        assert_eq!(outcome.failed, vec!["broken-1", "broken-2"]);
        let names: Vec<_> = outcome.libraries.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["a", "broken-1", "b", "broken-2", "c"]);
        assert_eq!(outcome.libraries[0].source_roots, vec!["src/a"]);
        assert!(outcome.libraries[1].source_roots.is_empty());
    }

    #[test]
    fn test_skip_generate_passes_through() {
        let mut input = libs(&["broken-but-skipped"]);
        input[0].skip_generate = true;
        let outcome = generate_all(&FakeGenerator, input, Path::new("."), |_| {});
        assert!(outcome.failed.is_empty());
        assert!(outcome.libraries[0].source_roots.is_empty());
    }

    #[test]
    fn test_response_apply() {
        let response: GenerateResponse =
            serde_json::from_str(r#"{"source_roots": ["src/a", "tests/a"]}"#).unwrap();
        let lib = response.apply(Library::new("a")).unwrap();
        assert_eq!(lib.source_roots, vec!["src/a", "tests/a"]);

        let failed: GenerateResponse = serde_json::from_str(r#"{"error": "bad proto"}"#).unwrap();
        let err = failed.apply(Library::new("a")).unwrap_err();
        assert_eq!(err.to_string(), "Generation failed for a: bad proto");
    }

    #[test]
    fn test_from_command_line() {
        let generator = CommandGenerator::from_command_line("docker run img generate", ".").unwrap();
        assert_eq!(generator.program, "docker");
        assert_eq!(generator.args, vec!["run", "img", "generate"]);
        assert!(CommandGenerator::from_command_line("   ", ".").is_err());
    }

    #[test]
    fn test_response_path_is_sanitized() {
        let generator = CommandGenerator::new("true", Vec::new(), ".");
        let path = generator.response_path(&Library::new("google/cloud x"));
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.ends_with("-google_cloud_x-response.json"));
    }

    #[test]
    #[cfg(unix)]
    fn test_command_generator_runs_program() {
        let dir = tempfile::tempdir().unwrap();
        let script = r#"printf '{"source_roots":["%s"]}' "$LIBRARIAN_OUTPUT" > "$LIBRARIAN_RESPONSE""#;
        let generator = CommandGenerator::new(
            "sh",
            vec!["-c".to_string(), script.to_string()],
            dir.path(),
        );
        let mut lib = Library::new("cmd-gen-test");
        lib.output = "src/out".to_string();
        let updated = generator.generate(&lib, dir.path()).unwrap();
        assert_eq!(updated.source_roots, vec!["src/out"]);
    }

    #[test]
    #[cfg(unix)]
    fn test_command_generator_failure() {
        let dir = tempfile::tempdir().unwrap();
        let generator = CommandGenerator::new(
            "sh",
            vec!["-c".to_string(), "echo nope >&2; exit 3".to_string()],
            dir.path(),
        );
        let err = generator
            .generate(&Library::new("cmd-gen-fail"), dir.path())
            .unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("Generation failed for cmd-gen-fail"));
        assert!(message.contains("nope"));
    }
}
