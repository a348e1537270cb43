//! Integration tests for the `codeprint` binary.

#![allow(deprecated)]

use assert_cmd::Command;
use indoc::indoc;
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

fn codeprint(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("codeprint").unwrap();
    cmd.current_dir(dir.path()).env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd
}

#[test]
fn analyze_stdin_emits_json_record() {
    let dir = TempDir::new().unwrap();
    let output = codeprint(&dir)
        .args(["analyze", "-"])
        .write_stdin("package main\n\nfunc main() {\n}\n")
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: Value = serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    assert_eq!(json["version"], "1.0");
    assert_eq!(json["language"]["language"], "go");
    assert!(json["complexity"]["timeComplexity"].is_string());
}

#[test]
fn analyze_file_as_summary() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("fib.py");
    fs::write(
        &path,
        indoc! {"
            def fib(n):
                if n < 2:
                    return n
                return fib(n - 1) + fib(n - 2)
        "},
    )
    .unwrap();

    let output = codeprint(&dir)
        .args(["analyze", path.to_str().unwrap(), "--format", "summary"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Python"));
    assert!(stdout.contains("O(2^n)"));
    assert!(stdout.contains("memoize"));
}

#[test]
fn analyze_empty_stdin_prints_null() {
    let dir = TempDir::new().unwrap();
    let output = codeprint(&dir)
        .args(["analyze", "-"])
        .write_stdin("   \n")
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout).unwrap().trim(), "null");
}

#[test]
fn analyze_missing_file_fails() {
    let dir = TempDir::new().unwrap();
    let output = codeprint(&dir)
        .args(["analyze", "does-not-exist.js"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("does-not-exist.js"));
}

#[test]
fn config_file_sets_output_format() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join(".codeprint.toml"),
        indoc! {r#"
            [output]
            format = "json"
            pretty = false
        "#},
    )
    .unwrap();

    let output = codeprint(&dir)
        .args(["analyze", "-"])
        .write_stdin("def f(x):\n    return x\n")
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.trim_end().lines().count(), 1);
}

#[test]
fn compare_reports_translation_check() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("source.py");
    let target = dir.path().join("target.js");
    fs::write(&source, "def add(a, b):\n    return a + b\n").unwrap();
    fs::write(&target, "function add(a, b) {\n  return a + b;\n}\n").unwrap();

    let output = codeprint(&dir)
        .args([
            "compare",
            source.to_str().unwrap(),
            target.to_str().unwrap(),
            "--format",
            "json",
        ])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["isValid"], true);
    assert!(json["checks"].as_array().unwrap().len() >= 5);
}

#[test]
fn init_writes_config_once() {
    let dir = TempDir::new().unwrap();
    codeprint(&dir).arg("init").assert().success();
    let written = fs::read_to_string(dir.path().join(".codeprint.toml")).unwrap();
    assert!(written.contains("[detection]"));

    codeprint(&dir).arg("init").assert().failure();
    codeprint(&dir).args(["init", "--force"]).assert().success();
}
