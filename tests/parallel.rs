//! Tests for parallel CLI processing of multiple files.

use std::fs;

use tempfile::tempdir;

#[macro_use]
mod prelude;
use prelude::*;

#[rstest]
fn test_cli_parallel_output_keeps_input_order() {
    let dir = tempdir().expect("failed to create temporary directory");
    let mut files = Vec::new();
    let mut expected = String::new();
    for i in 0..6 {
        let path = dir.path().join(format!("page{i}.html"));
        let key = format!("K{i}");
        let first = i.to_string();
        let markup = plain_table(&[key.as_str(), "V"], &[&[first.as_str(), "x"], &["y", "z"]]);
        fs::write(&path, &markup).expect("failed to write page");
        let table = &tablegrab::extract_tables(&markup, &FilterConfig::default())[0];
        expected.push_str(&tablegrab::encode::to_csv(table));
        expected.push('\n');
        files.push(path);
    }

    let output = Command::cargo_bin("tablegrab")
        .expect("failed to create command")
        .args(["--format", "csv"])
        .args(&files)
        .output()
        .expect("failed to run command");
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), expected);
}

#[rstest]
fn test_cli_parallel_missing_file_error(product_page: Vec<String>) {
    let dir = tempdir().expect("failed to create temporary directory");
    let good = dir.path().join("good.html");
    fs::write(&good, html(&product_page)).expect("failed to write page");
    let missing = dir.path().join("missing.html");

    let output = Command::cargo_bin("tablegrab")
        .expect("failed to create command")
        .arg(&good)
        .arg(&missing)
        .output()
        .expect("failed to run command");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("| A-1 | Widget | 9.5 |"));
    assert!(String::from_utf8_lossy(&output.stderr).contains("missing.html"));
}

#[test]
fn test_cli_pages_without_tables_print_nothing() {
    let dir = tempdir().expect("failed to create temporary directory");
    let path = dir.path().join("empty.html");
    fs::write(&path, "<p>no tables here</p>").expect("failed to write page");
    Command::cargo_bin("tablegrab")
        .expect("failed to create command")
        .arg(&path)
        .assert()
        .success()
        .stdout("");
}
