//! Command-line usage error tests

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn cpe() -> Command {
    Command::cargo_bin("cpe").unwrap()
}

#[test]
fn test_help() {
    cpe()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--chunk-overlap"));
}

#[test]
fn test_missing_pdf_is_usage_error() {
    let tmp = TempDir::new().unwrap();
    cpe()
        .arg(tmp.path().join("DOES_NOT_EXIST.pdf"))
        .arg("--out")
        .arg(tmp.path().join("out"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("PDF file not found"));
    assert!(!tmp.path().join("out").exists());
}

#[test]
fn test_directory_is_usage_error() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("folder.pdf");
    std::fs::create_dir(&dir).unwrap();

    cpe()
        .arg(&dir)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("is a directory"));
}

#[test]
fn test_wrong_extension_is_usage_error() {
    let tmp = TempDir::new().unwrap();
    let txt = tmp.path().join("notes.txt");
    std::fs::write(&txt, "hello").unwrap();

    cpe()
        .arg(&txt)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Expected a .pdf file"));
}

#[test]
fn test_bad_chunk_parameters_are_usage_errors() {
    let tmp = TempDir::new().unwrap();
    let pdf = tmp.path().join("doc.PDF");
    std::fs::write(&pdf, b"%PDF-1.4").unwrap();

    cpe()
        .arg(&pdf)
        .args(["--chunks", "--chunk-size", "100", "--chunk-overlap", "100"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("chunk_overlap must be < chunk_size"));

    cpe()
        .arg(&pdf)
        .args(["--chunk-overlap", "-1"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("chunk_overlap must be >= 0"));

    cpe()
        .arg(&pdf)
        .args(["--chunk-size", "0"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("chunk_size must be > 0"));

    cpe()
        .arg(&pdf)
        .args(["--max-blank-lines", "0"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("max_blank_lines must be >= 1"));
}
