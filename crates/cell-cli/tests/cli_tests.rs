//! Integration tests for the cell CLI

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

fn cell() -> Command {
    let mut cmd = Command::cargo_bin("cell").unwrap();
    // keep the user's configuration out of the tests
    cmd.env("HOME", env!("CARGO_TARGET_TMPDIR"));
    cmd
}

fn write_cell(dir: &TempDir, name: &str, source: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, source).unwrap();
    path
}

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

#[test]
fn test_cli_help() {
    cell()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("compile"))
        .stdout(predicate::str::contains("globals"));
}

#[test]
fn test_cli_version() {
    cell()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_compile_prints_cell_json() {
    let dir = TempDir::new().unwrap();
    let path = write_cell(&dir, "cell.js", "const result = specialFunc(x)");

    let output = cell().current_dir(dir.path()).arg("compile").arg(&path).output().unwrap();
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["inputs"], serde_json::json!([{"name": "specialFunc"}, {"name": "x"}]));
    assert_eq!(json["outputs"], serde_json::json!([{"name": "result"}]));
    assert_eq!(json["implicitReturn"], "result");
}

#[test]
fn test_compile_reads_stdin() {
    let output = cell()
        .args(["compile", "-", "--expr"])
        .write_stdin("x * 3")
        .output()
        .unwrap();
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["expr"], true);
    assert_eq!(json["inputs"], serde_json::json!([{"name": "x"}]));
}

#[test]
fn test_compile_reports_syntax_errors() {
    let dir = TempDir::new().unwrap();
    let path = write_cell(&dir, "broken.js", "foo bar()");

    let output = cell().current_dir(dir.path()).arg("compile").arg(&path).output().unwrap();
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["messages"][0]["type"], "error");
    assert!(String::from_utf8_lossy(&output.stderr).contains("Syntax error in Javascript"));

    cell()
        .current_dir(dir.path())
        .args(["compile", "--strict"])
        .arg(&path)
        .assert()
        .failure();
}

#[test]
fn test_compile_missing_file() {
    cell()
        .args(["compile", "nonexistent.js"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_compile_unknown_extension() {
    let dir = TempDir::new().unwrap();
    let path = write_cell(&dir, "cell.py", "x = 1");
    cell().current_dir(dir.path()).arg("compile").arg(&path).assert().failure();
}

#[test]
fn test_compile_unknown_language_lists_known_ones() {
    cell()
        .args(["compile", "--language", "python", "-"])
        .write_stdin("x = 1")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown cell language \"python\" (known: javascript)"));
}

#[test]
fn test_config_file_adds_builtins() {
    let dir = TempDir::new().unwrap();
    let path = write_cell(&dir, "cell.js", "plot(data)");
    fs::write(
        dir.path().join("cellc.toml"),
        "[compile]\nextra_builtins = [\"plot\"]\n",
    )
    .unwrap();

    let output = cell().current_dir(dir.path()).arg("compile").arg(&path).output().unwrap();
    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["inputs"], serde_json::json!([{"name": "data"}]));
}

#[test]
fn test_globals_lists_free_names() {
    let dir = TempDir::new().unwrap();
    let path = write_cell(&dir, "cell.js", "let a = b + Math.max(c)\nfunction f () { return d }");

    cell()
        .current_dir(dir.path())
        .arg("globals")
        .arg(&path)
        .assert()
        .success()
        .stdout("b\nc\nd\n");

    cell()
        .current_dir(dir.path())
        .args(["globals", "--all"])
        .arg(&path)
        .assert()
        .success()
        .stdout("b\nMath\nc\nd\n");
}

#[test]
fn test_spec_prints_function_spec() {
    let dir = TempDir::new().unwrap();
    let path = write_cell(
        &dir,
        "sum.js",
        "/**\n * Sum numbers.\n * @param {...number} values The numbers\n * @return {number} The total\n */\nfunction sum(...values) {\n  return values.reduce((a, b) => a + b, 0)\n}\n",
    );

    let output = cell().current_dir(dir.path()).arg("spec").arg(&path).output().unwrap();
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["type"], "function");
    assert_eq!(json["name"], "sum");
    assert_eq!(json["description"], "Sum numbers.");
    let method = &json["methods"]["sum(values: number): number"];
    assert_eq!(method["params"][0]["repeats"], true);

    let other = write_cell(&dir, "value.js", "const x = 1");
    cell()
        .current_dir(dir.path())
        .arg("spec")
        .arg(&other)
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not end with a function declaration"));
}
