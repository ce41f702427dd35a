//! Integration tests for the `remold` binary entry point.
//!
//! Exercises in-place migration, dry-run behaviour, review-flag
//! reporting, and the untouched-on-failure guarantee.

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use tempfile::TempDir;

const CLOSE_EVENT: &str = r"#[dom_struct]
pub struct CloseEvent {
    event: Event,
    code: u16,
}

impl CloseEvent {
    pub fn Code(&self) -> u16 {
        self.code
    }
}
";

fn remold() -> Command {
    Command::cargo_bin("remold").expect("remold binary")
}

fn write_module(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("write module");
    path
}

#[test]
fn migrates_a_module_in_place() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_module(&dir, "closeevent.rs", CLOSE_EVENT);

    remold()
        .arg(&path)
        .assert()
        .success()
        .stdout(contains("migrated 1 of 1 files (0 flagged)"));

    let migrated = fs::read_to_string(&path).expect("read module");
    assert!(migrated.contains("magic_dom_struct! {"));
    assert!(migrated.contains("self.code.get()"));
}

#[test]
fn dry_run_reports_without_writing() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_module(&dir, "closeevent.rs", CLOSE_EVENT);

    remold()
        .arg("--dry-run")
        .arg(&path)
        .assert()
        .success()
        .stdout(contains("would migrate").and(contains("migrated 1 of 1 files")));

    assert_eq!(fs::read_to_string(&path).expect("read module"), CLOSE_EVENT);
}

#[test]
fn directories_are_walked_for_rust_sources() {
    let dir = TempDir::new().expect("temp dir");
    write_module(&dir, "closeevent.rs", CLOSE_EVENT);
    write_module(&dir, "notes.txt", "not rust");

    remold()
        .arg(dir.path())
        .assert()
        .success()
        .stdout(contains("migrated 1 of 1 files"));
}

#[test]
fn unrecognised_fields_are_reported_as_flags() {
    let source = r"#[dom_struct]
pub struct FormData {
    reflector_: Reflector,
    state: HashMap<DOMString, FormDatum>,
}
";
    let dir = TempDir::new().expect("temp dir");
    let path = write_module(&dir, "formdata.rs", source);

    remold()
        .arg(&path)
        .assert()
        .success()
        .stderr(contains("formdata.rs:4: state has unrecognised wrapper shape"));
}

#[test]
fn failed_files_are_left_untouched() {
    let broken = r"#[dom_struct]
pub struct Broken {
    value: u32,
";
    let dir = TempDir::new().expect("temp dir");
    let path = write_module(&dir, "broken.rs", broken);

    remold()
        .arg(&path)
        .assert()
        .failure()
        .stderr(contains("unterminated record declaration starting at line 1"))
        .stdout(contains("migrated 0 of 1 files"));

    assert_eq!(fs::read_to_string(&path).expect("read module"), broken);
}

#[test]
fn missing_paths_fail_before_processing() {
    remold()
        .arg("/no/such/path")
        .assert()
        .failure()
        .stderr(contains("is neither a file nor a directory"));
}
