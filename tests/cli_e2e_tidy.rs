//! End-to-end tests for the `librarian tidy` command.

mod common;
use common::prelude::*;

#[test]
fn test_tidy_strips_derived_fields() {
    let fixture = TestFixture::new().with_manifest(manifests::RUST_VERBOSE);

    fixture
        .command()
        .arg("tidy")
        .assert()
        .success()
        .stdout(predicate::str::contains("Tidied 1 of 1 libraries"));

    let manifest = fixture.manifest();
    let library = &manifest.libraries[0];
    assert_eq!(library.name, "google-cloud-secretmanager-v1");
    assert!(library.output.is_empty());
    assert!(library.apis.is_empty());
    assert!(library.release_level.is_empty());
}

#[test]
fn test_tidy_is_idempotent() {
    let fixture = TestFixture::new().with_manifest(manifests::RUST_VERBOSE);
    fixture.command().arg("tidy").assert().success();
    let first = std::fs::read_to_string(fixture.manifest_path()).unwrap();

    fixture
        .command()
        .arg("tidy")
        .assert()
        .success()
        .stdout(predicate::str::contains("Tidied 0 of 1 libraries"));
    let second = std::fs::read_to_string(fixture.manifest_path()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_tidy_check_fails_on_untidy_manifest() {
    let fixture = TestFixture::new().with_manifest(manifests::RUST_VERBOSE);

    fixture
        .command()
        .args(["tidy", "--check"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not tidy"))
        .stderr(predicate::str::contains("google-cloud-secretmanager-v1"));

    // Nothing was rewritten.
    let content = std::fs::read_to_string(fixture.manifest_path()).unwrap();
    assert_eq!(content, manifests::RUST_VERBOSE);
}

#[test]
fn test_tidy_check_passes_on_tidy_manifest() {
    let fixture = TestFixture::new().with_manifest(manifests::RUST_TIDY);

    fixture
        .command()
        .args(["tidy", "--check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("is tidy"));
}

#[test]
fn test_tidy_rejects_veneer_without_output() {
    let fixture = TestFixture::new().with_manifest(manifests::VENEER_WITHOUT_OUTPUT);

    fixture
        .command()
        .arg("tidy")
        .assert()
        .failure()
        .stderr(predicate::str::contains("google-cloud-storage is invalid"))
        .stderr(predicate::str::contains("veneers must set `output` explicitly"));
}

#[test]
fn test_tidy_reports_unknown_fields() {
    let fixture = TestFixture::new().with_manifest(manifests::UNKNOWN_FIELD);

    fixture
        .command()
        .arg("tidy")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Manifest parsing error"))
        .stderr(predicate::str::contains("outptu"));
}

#[test]
fn test_tidy_missing_manifest() {
    let fixture = TestFixture::new();

    fixture
        .command()
        .arg("tidy")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load manifest"));
}

#[test]
fn test_tidy_manifest_flag_and_env() {
    let fixture = TestFixture::new().with_file("conf/libs.yaml", manifests::RUST_VERBOSE);

    fixture
        .command()
        .args(["tidy", "--check", "--manifest", "conf/libs.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not tidy"));

    fixture
        .command()
        .arg("tidy")
        .env("LIBRARIAN_MANIFEST", "conf/libs.yaml")
        .assert()
        .success();

    let content = std::fs::read_to_string(fixture.path().join("conf/libs.yaml")).unwrap();
    assert!(!content.contains("src/generated/cloud/secretmanager/v1"));
}
