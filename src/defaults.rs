//! # Defaults Resolution
//!
//! Library records in the manifest are deliberately sparse: output
//! directories, API paths, release levels, and language settings are left
//! out whenever they match what the language rules and the default bundle
//! would produce. This module fills them back in for consumers and strips
//! them out again for `tidy`.
//!
//! Precedence, highest first:
//!
//! 1. An explicit value on the library record.
//! 2. The library's own language sub-config.
//! 3. The manifest's default bundle.
//!
//! Dependency lists merge by name, with the library's entry winning over a
//! default of the same name. Merged lists are sorted by name so that resolving
//! a tidied record reproduces the same record.
//!
//! All functions take the record by value and return the updated record.

use crate::error::{Error, Result};
use crate::language;
use crate::manifest::{Api, DartDefault, DartPackage, Defaults, Library, RustCrate, RustDefault};
use std::collections::BTreeMap;

/// Fill every derivable field of `library`.
///
/// Fails with [`Error::MissingOutput`] when a veneer has no explicit output.
pub fn resolve_library(language: &str, mut library: Library, defaults: &Defaults) -> Result<Library> {
    let rules = language::rules_for(language);

    if library.apis.is_empty() {
        library.apis.push(Api::default());
    }

    if !library.veneer {
        for api in &mut library.apis {
            if api.path.is_empty() {
                api.path = (rules.api_path_from_name)(&library.name);
            }
        }
    }

    if library.output.is_empty() {
        if library.veneer {
            return Err(Error::MissingOutput {
                library: library.name.clone(),
            });
        }
        library.output = (rules.default_output)(&library.apis[0].path, &defaults.output);
    }

    Ok(apply_defaults(library, defaults))
}

/// Apply the default bundle to empty fields and merge language sub-configs.
pub fn apply_defaults(mut library: Library, defaults: &Defaults) -> Library {
    if library.release_level.is_empty() {
        library.release_level = defaults.release_level.clone();
    }
    if library.transport.is_empty() {
        library.transport = defaults.transport.clone();
    }
    if library.output.is_empty() {
        library.output = defaults.output.clone();
    }
    if let Some(rust_default) = &defaults.rust {
        let krate = library.rust.take().unwrap_or_default();
        library.rust = Some(merge_rust(krate, rust_default));
    }
    if let Some(dart_default) = &defaults.dart {
        let package = library.dart.take().unwrap_or_default();
        library.dart = Some(merge_dart(package, dart_default));
    }
    library
}

fn merge_rust(mut krate: RustCrate, defaults: &RustDefault) -> RustCrate {
    let mut deps: BTreeMap<String, _> = defaults
        .package_dependencies
        .iter()
        .map(|dep| (dep.name.clone(), dep.clone()))
        .collect();
    for dep in krate.package_dependencies.drain(..) {
        deps.insert(dep.name.clone(), dep);
    }
    krate.package_dependencies = deps.into_values().collect();

    krate.disabled_rustdoc_warnings =
        sorted_union(&krate.disabled_rustdoc_warnings, &defaults.disabled_rustdoc_warnings);

    if krate.generate_setter_samples.is_none() {
        krate.generate_setter_samples = defaults.generate_setter_samples;
    }

    for module in &mut krate.modules {
        if module.generate_setter_samples.is_none() {
            module.generate_setter_samples = krate.generate_setter_samples;
        }
        if module.disabled_rustdoc_warnings.is_empty() {
            module.disabled_rustdoc_warnings = krate.disabled_rustdoc_warnings.clone();
        }
    }
    krate
}

fn merge_dart(mut package: DartPackage, defaults: &DartDefault) -> DartPackage {
    if package.version.is_empty() {
        package.version = defaults.version.clone();
    }
    if package.issue_tracker_url.is_empty() {
        package.issue_tracker_url = defaults.issue_tracker_url.clone();
    }
    for (name, constraint) in &defaults.dependencies {
        package
            .dependencies
            .entry(name.clone())
            .or_insert_with(|| constraint.clone());
    }
    package
}

fn sorted_union(a: &[String], b: &[String]) -> Vec<String> {
    let mut merged: Vec<String> = a.iter().chain(b).cloned().collect();
    merged.sort();
    merged.dedup();
    merged
}

/// Strip every field that [`resolve_library`] would derive identically.
///
/// Operates on the raw manifest record. Running it twice is a no-op, and
/// resolving its output gives the same record as resolving its input.
pub fn tidy_library(language: &str, mut library: Library, defaults: &Defaults) -> Library {
    let rules = language::rules_for(language);

    if !library.veneer {
        let derived_path = (rules.api_path_from_name)(&library.name);
        let first_path = library
            .apis
            .first()
            .map(|api| api.path.clone())
            .filter(|path| !path.is_empty())
            .unwrap_or_else(|| derived_path.clone());

        if !library.output.is_empty()
            && library.output == (rules.default_output)(&first_path, &defaults.output)
        {
            library.output.clear();
        }
        for api in &mut library.apis {
            if api.path == derived_path {
                api.path.clear();
            }
        }
    }
    if library.apis.len() == 1 && library.apis[0].is_empty() {
        library.apis.clear();
    }

    if library.release_level == defaults.release_level {
        library.release_level.clear();
    }
    if library.transport == defaults.transport {
        library.transport.clear();
    }

    if let (Some(krate), Some(rust_default)) = (library.rust.as_mut(), defaults.rust.as_ref()) {
        krate
            .package_dependencies
            .retain(|dep| !rust_default.package_dependencies.contains(dep));
        krate
            .disabled_rustdoc_warnings
            .retain(|w| !rust_default.disabled_rustdoc_warnings.contains(w));
        if krate.generate_setter_samples.is_some()
            && krate.generate_setter_samples == rust_default.generate_setter_samples
        {
            krate.generate_setter_samples = None;
        }
    }
    if library.rust.as_ref().is_some_and(|k| *k == RustCrate::default()) {
        library.rust = None;
    }

    if let (Some(package), Some(dart_default)) = (library.dart.as_mut(), defaults.dart.as_ref()) {
        package
            .dependencies
            .retain(|name, constraint| dart_default.dependencies.get(name) != Some(constraint));
        if package.version == dart_default.version {
            package.version.clear();
        }
        if package.issue_tracker_url == dart_default.issue_tracker_url {
            package.issue_tracker_url.clear();
        }
    }
    if library.dart.as_ref().is_some_and(|p| *p == DartPackage::default()) {
        library.dart = None;
    }

    library
}

/// Build a new, tidied library record for `api_path`, as the `add` and
/// `create` flows do. The record is resolved once to validate it.
pub fn new_library(language: &str, api_path: &str, name: Option<&str>, defaults: &Defaults) -> Result<Library> {
    let rules = language::rules_for(language);
    let name = match name {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => (rules.name_from_api_path)(api_path),
    };
    let mut library = Library::new(name);
    library.apis.push(Api::new(api_path));
    resolve_library(language, library.clone(), defaults)?;
    Ok(tidy_library(language, library, defaults))
}
