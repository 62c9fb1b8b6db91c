//! CLI integration tests
//!
//! Runs the compiled `sme` binary against the fixture manifest and against
//! broken copies written to temp directories.

use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Path to the compiled sme binary (resolved at compile time)
fn sme_bin() -> String {
    env!("CARGO_BIN_EXE_sme").to_string()
}

fn fixture() -> &'static str {
    "tests/fixtures/us_employment.json"
}

fn run(args: &[&str]) -> Output {
    Command::new(sme_bin())
        .args(args)
        .output()
        .expect("Failed to run sme")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn fixture_json() -> Value {
    serde_json::from_str(&std::fs::read_to_string(fixture()).unwrap()).unwrap()
}

fn write_manifest(dir: &TempDir, value: &Value) -> PathBuf {
    let path = dir.path().join("semantic_manifest.json");
    std::fs::write(&path, serde_json::to_string_pretty(value).unwrap()).unwrap();
    path
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

// ── sme validate ───────────────────────────────────────────────────────

#[test]
fn test_validate_fixture_passes() {
    let output = run(&["validate", fixture()]);
    assert!(
        output.status.success(),
        "stdout: {}\nstderr: {}",
        stdout(&output),
        stderr(&output)
    );
    assert!(stdout(&output).contains("Validation passed: 0 errors, 0 warnings"));
}

#[test]
fn test_validate_reports_cycle() {
    let dir = TempDir::new().unwrap();
    let mut manifest = fixture_json();
    manifest["metrics"].as_array_mut().unwrap().extend([
        serde_json::json!({"name": "a", "type": "derived",
            "type_params": {"expr": "b", "metrics": ["b"]}}),
        serde_json::json!({"name": "b", "type": "derived",
            "type_params": {"expr": "a", "metrics": ["a"]}}),
    ]);
    let path = write_manifest(&dir, &manifest);

    let output = run(&["validate", path_str(&path)]);
    assert_eq!(output.status.code(), Some(1));
    let out = stdout(&output);
    assert!(out.contains("CIRCULAR_METRIC_DEPENDENCY"), "{}", out);
    assert!(out.contains("a -> b -> a"), "{}", out);
}

#[test]
fn test_validate_json_output() {
    let dir = TempDir::new().unwrap();
    let mut manifest = fixture_json();
    manifest["metrics"][0]["type_params"]["measure"] = "us_employment.employed_totl".into();
    let path = write_manifest(&dir, &manifest);

    let output = run(&["validate", path_str(&path), "--output", "json"]);
    assert_eq!(output.status.code(), Some(1));
    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["valid"], false);
    assert_eq!(report["errors"][0]["code"], "UNKNOWN_MEASURE_REFERENCE");
    assert_eq!(report["errors"][0]["location"], "metrics[0].type_params.measure");
}

#[test]
fn test_validate_unparseable_document_as_json() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ not json").unwrap();

    let output = run(&["validate", path_str(&path), "-o", "json"]);
    assert_eq!(output.status.code(), Some(1));
    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["errors"][0]["code"], "INVALID_DOCUMENT");
}

#[test]
fn test_validate_unparseable_document_as_text() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "[]").unwrap();

    let output = run(&["validate", path_str(&path)]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Failed to import"));
}

#[test]
fn test_validate_strict_fails_on_warnings() {
    let dir = TempDir::new().unwrap();
    let mut manifest = fixture_json();
    manifest["semantic_models"][0]["owner"] = "data-team".into();
    let path = write_manifest(&dir, &manifest);

    let lenient = run(&["validate", path_str(&path)]);
    assert!(lenient.status.success(), "{}", stdout(&lenient));
    assert!(stdout(&lenient).contains("UNKNOWN_FIELD"));

    let strict = run(&["validate", path_str(&path), "--strict"]);
    assert_eq!(strict.status.code(), Some(1));
}

#[test]
fn test_validate_single_model() {
    let output = run(&["validate", fixture(), "--model", "us_employment"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("semantic model 'us_employment'"));

    let missing = run(&["validate", fixture(), "--model", "nope"]);
    assert_eq!(missing.status.code(), Some(2));
}

// ── sme export ─────────────────────────────────────────────────────────

#[test]
fn test_export_attaches_status() {
    let output = run(&["export", fixture()]);
    assert!(output.status.success(), "{}", stderr(&output));
    let exported: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(exported["validation_status"]["valid"], true);
    assert_eq!(exported["validation_status"]["error_count"], 0);
    assert_eq!(
        exported["semantic_models"].as_array().unwrap().len(),
        fixture_json()["semantic_models"].as_array().unwrap().len()
    );
}

#[test]
fn test_export_to_file_is_stable() {
    let dir = TempDir::new().unwrap();
    let first = dir.path().join("out/first.json");
    let second = dir.path().join("out/second.json");

    assert!(run(&["export", fixture(), "--out", path_str(&first)])
        .status
        .success());
    assert!(run(&["export", fixture(), "--out", path_str(&second)])
        .status
        .success());

    assert_eq!(
        std::fs::read(&first).unwrap(),
        std::fs::read(&second).unwrap()
    );
}

#[test]
fn test_export_fills_default_time_spine() {
    let dir = TempDir::new().unwrap();
    let mut manifest = fixture_json();
    manifest
        .as_object_mut()
        .unwrap()
        .remove("project_configuration");
    let path = write_manifest(&dir, &manifest);

    let output = run(&["export", path_str(&path)]);
    let exported: Value = serde_json::from_slice(&output.stdout).unwrap();
    let spine = &exported["project_configuration"]["time_spine_table_configurations"][0];
    assert_eq!(spine["location"], "main.metricflow_time_spine");
    assert_eq!(spine["column_name"], "date_day");
}

// ── sme versions ───────────────────────────────────────────────────────

#[test]
fn test_versions_lifecycle() {
    let project = TempDir::new().unwrap();
    let root = path_str(project.path());
    let manifest = std::fs::canonicalize(fixture()).unwrap();

    let save = run(&["versions", "save", "baseline", path_str(&manifest), "-p", root]);
    assert!(save.status.success(), "{}", stderr(&save));
    assert!(project.path().join(".sme/versions/baseline.json").exists());

    let list = run(&["versions", "list", "-o", "json", "-p", root]);
    let versions: Value = serde_json::from_slice(&list.stdout).unwrap();
    assert_eq!(versions[0]["name"], "baseline");
    assert_eq!(versions[0]["semantic_models"], 2);

    let load = run(&["versions", "load", "baseline", "-p", root]);
    let loaded: Value = serde_json::from_slice(&load.stdout).unwrap();
    assert_eq!(loaded["metrics"][0]["name"], "employed");

    let delete = run(&["versions", "delete", "baseline", "-p", root]);
    assert!(delete.status.success());
    let missing = run(&["versions", "load", "baseline", "-p", root]);
    assert_eq!(missing.status.code(), Some(2));
}

#[test]
fn test_versions_reject_bad_name() {
    let project = TempDir::new().unwrap();
    let manifest = std::fs::canonicalize(fixture()).unwrap();
    let output = run(&[
        "versions",
        "save",
        "../escape",
        path_str(&manifest),
        "-p",
        path_str(project.path()),
    ]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_versions_path_from_config() {
    let project = TempDir::new().unwrap();
    std::fs::write(
        project.path().join("sme.yml"),
        "name: bls\nversions_path: snapshots\n",
    )
    .unwrap();
    let manifest = std::fs::canonicalize(fixture()).unwrap();

    let output = run(&[
        "versions",
        "save",
        "v1",
        path_str(&manifest),
        "-p",
        path_str(project.path()),
    ]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(project.path().join("snapshots/v1.json").exists());
}

// ── sme check-db ───────────────────────────────────────────────────────

fn build_warehouse(dir: &TempDir, cpi_value_column: &str) -> PathBuf {
    let path = dir.path().join("bls_data.duckdb");
    let conn = duckdb::Connection::open(&path).unwrap();
    conn.execute_batch(&format!(
        "CREATE TABLE us_employment (state_fips VARCHAR, region_code VARCHAR, year INTEGER,
             state_name VARCHAR, employed_total BIGINT, unemployed_count BIGINT);
         CREATE TABLE cpi_monthly (series_id VARCHAR, period_month DATE, {} DOUBLE);",
        cpi_value_column
    ))
    .unwrap();
    path
}

#[test]
fn test_check_db_passes() {
    let dir = TempDir::new().unwrap();
    let db = build_warehouse(&dir, "index_value");

    let output = run(&["check-db", fixture(), "--database", path_str(&db)]);
    assert!(
        output.status.success(),
        "stdout: {}\nstderr: {}",
        stdout(&output),
        stderr(&output)
    );
    assert!(stdout(&output).contains("Database check passed"));
}

#[test]
fn test_check_db_missing_column_json() {
    let dir = TempDir::new().unwrap();
    let db = build_warehouse(&dir, "cpi");

    let output = run(&[
        "check-db",
        fixture(),
        "--database",
        path_str(&db),
        "--output",
        "json",
    ]);
    assert_eq!(output.status.code(), Some(1));
    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["errors"][0]["code"], "COLUMN_NOT_FOUND");
    assert_eq!(report["incomplete"], false);
}

#[test]
fn test_check_db_single_model() {
    let dir = TempDir::new().unwrap();
    let db = build_warehouse(&dir, "cpi");

    let output = run(&[
        "check-db",
        fixture(),
        "--database",
        path_str(&db),
        "--model",
        "us_employment",
        "-o",
        "json",
    ]);
    assert!(output.status.success(), "{}", stdout(&output));
    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["tables"].as_array().unwrap().len(), 1);
}

#[test]
fn test_check_db_unknown_model_suggests() {
    let output = run(&[
        "check-db",
        fixture(),
        "--database",
        "whatever.duckdb",
        "--model",
        "us_employmnt",
    ]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Did you mean: us_employment?"));
}

#[test]
fn test_check_db_unreachable_database_is_incomplete() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("absent.duckdb");

    let output = run(&[
        "check-db",
        fixture(),
        "--database",
        path_str(&missing),
        "-o",
        "json",
    ]);
    assert!(output.status.success());
    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["incomplete"], true);
    assert_eq!(report["warnings"][0]["code"], "DATABASE_UNAVAILABLE");
}

#[test]
fn test_check_db_requires_database() {
    let project = TempDir::new().unwrap();
    let manifest = std::fs::canonicalize(fixture()).unwrap();
    let output = run(&[
        "check-db",
        path_str(&manifest),
        "-p",
        path_str(project.path()),
    ]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("No database to check against"));
}

// ── sme ls ─────────────────────────────────────────────────────────────

#[test]
fn test_ls_table() {
    let output = run(&["ls", fixture()]);
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.starts_with("NAME"));
    assert!(out.contains("unemployment_rate"));
    assert!(out.contains("2 semantic models, 4 metrics"));
}

#[test]
fn test_ls_json() {
    let output = run(&["ls", fixture(), "--output", "json"]);
    let items: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(items.as_array().unwrap().len(), 6);
    assert_eq!(items[0]["kind"], "semantic_model");
    assert_eq!(items[2]["type"], "simple");
}
