use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const RECEIPT: &str = "GROCERY STORE RECEIPT
Milk 2% 1 gallon $3.99
Bread Whole Wheat $2.49
Chicken Breast 2.5 lb $8.99
Xyz Unknown Product $9.99
SUBTOTAL: $25.46
TAX $2.04
TOTAL: $27.50
";

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../larder-core/tests/fixtures")
        .join(name)
}

/// A temp dir with a receipt file and a default config file.
fn workspace() -> (TempDir, PathBuf, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let receipt = dir.path().join("receipt.txt");
    fs::write(&receipt, RECEIPT).unwrap();
    let config = dir.path().join("config.json");
    fs::write(&config, "{}").unwrap();
    (dir, receipt, config)
}

fn larder(config: &Path) -> Command {
    let mut cmd = Command::cargo_bin("larder").unwrap();
    cmd.arg("--config").arg(config);
    cmd
}

#[test]
fn test_extract_json() {
    let (_dir, receipt, config) = workspace();

    let output = larder(&config)
        .arg("extract")
        .arg(&receipt)
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let items = value["items"].as_array().unwrap();

    assert_eq!(value["tier"], "rule_based");
    assert_eq!(items.len(), 4);
    assert_eq!(items[0]["name"], "Milk 2%");
    assert_eq!(items[0]["category"], "dairy");
    assert_eq!(items[2]["unit"], "lb");
    assert_eq!(items[3]["category"], "dry_goods");
    assert_eq!(value["stats"]["rejected"], 4);
}

#[test]
fn test_extract_csv_from_stdin() {
    let (_dir, _receipt, config) = workspace();

    larder(&config)
        .args(["extract", "-", "--format", "csv"])
        .write_stdin("Bananas 3 lb\nTOTAL: $1.99\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("line,name,category"))
        .stdout(predicate::str::contains("1,Bananas,fruits,3,lb,,0.70,"));
}

#[test]
fn test_extract_text_with_expiry() {
    let (_dir, receipt, config) = workspace();

    larder(&config)
        .arg("extract")
        .arg(&receipt)
        .args(["--format", "text", "--storage", "freezer", "--purchased", "2024-01-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Chicken Breast [meat] 2.5 lb $8.99"))
        .stdout(predicate::str::contains("expires 2024-06-29"));
}

#[test]
fn test_extract_with_classifier() {
    let (_dir, receipt, config) = workspace();

    let output = larder(&config)
        .arg("extract")
        .arg(&receipt)
        .arg("--classifier")
        .arg(fixture("token_weights.json"))
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["tier"], "assisted");
    assert!(value["prediction"]["category"].is_string());
}

#[test]
fn test_extract_missing_classifier_fails() {
    let (dir, receipt, config) = workspace();

    larder(&config)
        .arg("extract")
        .arg(&receipt)
        .arg("--classifier")
        .arg(dir.path().join("missing.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load classifier"));
}

#[test]
fn test_extract_missing_input() {
    let (dir, _receipt, config) = workspace();

    larder(&config)
        .arg("extract")
        .arg(dir.path().join("nope.txt"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn test_batch_with_summary() {
    let (dir, _receipt, config) = workspace();
    fs::write(dir.path().join("second.txt"), "Spinach Baby $3.49\n").unwrap();
    fs::write(dir.path().join("empty.txt"), "").unwrap();
    let out = dir.path().join("out");

    larder(&config)
        .arg("batch")
        .arg(format!("{}/*.txt", dir.path().display()))
        .arg("--output-dir")
        .arg(&out)
        .args(["--summary", "--continue-on-error", "-j", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 3 files"))
        .stdout(predicate::str::contains("3 successful"));

    assert!(out.join("receipt.json").exists());
    assert!(out.join("second.json").exists());
    assert!(out.join("empty.json").exists());

    let summary = fs::read_to_string(out.join("summary.csv")).unwrap();
    assert!(summary.starts_with("filename,status,tier,items"));
    assert!(summary.contains("empty.txt,success,rule-based,0,"));
    assert!(summary.contains("second.txt,success,rule-based,1,"));
}

#[test]
fn test_batch_stops_on_error() {
    let (dir, _receipt, config) = workspace();
    fs::write(dir.path().join("latin1.txt"), [0x4d, 0x69, 0x6c, 0x6b, 0xe9, 0xff, 0x0a]).unwrap();

    larder(&config)
        .arg("batch")
        .arg(format!("{}/*.txt", dir.path().display()))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Processing failed"));
}

#[test]
fn test_batch_continues_past_unreadable_file() {
    let (dir, _receipt, config) = workspace();
    fs::write(dir.path().join("latin1.txt"), [0xe9, 0xff, 0x0a]).unwrap();
    fs::write(dir.path().join("blank.txt"), "   \n").unwrap();
    let out = dir.path().join("out");

    larder(&config)
        .arg("batch")
        .arg(format!("{}/*.txt", dir.path().display()))
        .arg("--output-dir")
        .arg(&out)
        .args(["--summary", "--continue-on-error"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 successful, 1 failed"));

    let summary = fs::read_to_string(out.join("summary.csv")).unwrap();
    assert!(summary.contains("blank.txt,success,rule-based,0,"));
    assert!(summary.contains("latin1.txt,error"));
}

#[test]
fn test_evaluate_samples() {
    let (_dir, _receipt, config) = workspace();

    let output = larder(&config)
        .args(["evaluate", "--json"])
        .arg(fixture("samples.json"))
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["samples"], 2);
    assert_eq!(value["expected_items"], 6);
    assert_eq!(value["matched_items"], 6);
    assert_eq!(value["category_correct"], 5);

    larder(&config)
        .arg("evaluate")
        .arg(fixture("samples.json"))
        .args(["--min-category-accuracy", "0.99"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Category accuracy"));
}

#[test]
fn test_config_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("nested").join("config.json");

    larder(&config)
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created configuration file"));

    larder(&config)
        .args(["config", "set", "extraction.min_line_length", "5"])
        .assert()
        .success();

    larder(&config)
        .args(["config", "get", "extraction.min_line_length"])
        .assert()
        .success()
        .stdout(predicate::str::contains("5"));

    larder(&config)
        .args(["config", "set", "expiry.default_storage", "garage"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid value"));

    larder(&config)
        .args(["config", "set", "extraction.no_such_key", "1"])
        .assert()
        .failure();

    larder(&config)
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}
