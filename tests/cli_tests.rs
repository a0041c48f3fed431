// CLI integration tests: classify, report and place subcommands

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const WINNING_ROW: &str = r#"{
    "metric": {"id": "signup", "name": "Signups", "type": "binomial"},
    "baseline": {"users": 1000, "value": 100},
    "variation": {"expected": 0.10, "ci": [0.01, 0.19], "pValue": 0.03, "users": 1000, "value": 110},
    "engine": "frequentist",
    "variationName": "Short form"
}"#;

const CORRECTED_ROW: &str = r#"{
    "metric": {"id": "signup", "name": "Signups", "type": "binomial"},
    "baseline": {"users": 1000, "value": 100},
    "variation": {"expected": 0.10, "ci": [0.01, 0.19], "pValue": 0.03, "pValueAdjusted": 0.08, "users": 1000, "value": 110},
    "engine": "frequentist",
    "correction": "benjamini-hochberg"
}"#;

fn write(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, contents).unwrap();
    path
}

// ============================================================================
// classify
// ============================================================================

#[test]
fn test_classify_text_output() {
    let tmp = TempDir::new().unwrap();
    let input = write(tmp.path(), "row.json", WINNING_ROW);

    let mut cmd = Command::cargo_bin("abverdict").unwrap();
    cmd.arg("classify").arg("--input").arg(&input);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Signups (binomial)"))
        .stdout(predicate::str::contains("Status: Won"))
        .stdout(predicate::str::contains("P-Value: 0.030"))
        .stdout(predicate::str::contains("95% Confidence Interval:"));
}

#[test]
fn test_classify_json_output() {
    let tmp = TempDir::new().unwrap();
    let input = write(tmp.path(), "row.json", CORRECTED_ROW);

    let mut cmd = Command::cargo_bin("abverdict").unwrap();
    cmd.arg("--format").arg("json").arg("classify").arg("-i").arg(&input);

    let output = cmd.assert().success().get_output().stdout.clone();
    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();

    assert_eq!(json["verdict"]["significant"], false);
    assert_eq!(json["verdict"]["significantUnadjusted"], true);
    assert_eq!(json["verdict"]["resultsStatus"], "inconclusive");
    assert_eq!(json["tooltip"]["status_badge"]["label"], "Not significant");
}

#[test]
fn test_classify_missing_file_fails() {
    let mut cmd = Command::cargo_bin("abverdict").unwrap();
    cmd.arg("classify").arg("--input").arg("/nonexistent/row.json");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("failed to read"));
}

#[test]
fn test_classify_with_strict_config() {
    let tmp = TempDir::new().unwrap();
    let input = write(tmp.path(), "row.json", WINNING_ROW);
    let config = write(
        tmp.path(),
        "abverdict.toml",
        "[classifier]\nmin_users = 5000\n",
    );

    let mut cmd = Command::cargo_bin("abverdict").unwrap();
    cmd.arg("--config")
        .arg(&config)
        .arg("--format")
        .arg("json")
        .arg("classify")
        .arg("-i")
        .arg(&input);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"enoughData\": false"));
}

#[test]
fn test_invalid_config_rejected() {
    let tmp = TempDir::new().unwrap();
    let input = write(tmp.path(), "row.json", WINNING_ROW);
    let config = write(
        tmp.path(),
        "abverdict.toml",
        "[classifier]\nchance_to_win_threshold = 0.2\n",
    );

    let mut cmd = Command::cargo_bin("abverdict").unwrap();
    cmd.arg("--config").arg(&config).arg("classify").arg("-i").arg(&input);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("chance_to_win_threshold"));
}

// ============================================================================
// report
// ============================================================================

const EXPERIMENT: &str = r#"{
    "id": "exp_1",
    "name": "Pricing page",
    "phases": [{"name": "Main"}],
    "variations": [{"id": "v0", "name": "Control"}, {"id": "v1", "name": "Annual first"}],
    "metrics": [
        {"id": "purchase", "name": "Purchases", "type": "binomial"},
        {"id": "refunds", "name": "Refunds", "type": "count", "inverse": true}
    ],
    "guardrails": ["refunds"]
}"#;

const SNAPSHOT: &str = r#"{
    "snapshot": {
        "id": "snp_1",
        "experiment": "exp_1",
        "phase": 0,
        "analyses": [{
            "settings": {"statsEngine": "bayesian"},
            "results": [{
                "name": "All",
                "variations": [
                    {"users": 3000, "metrics": {
                        "purchase": {"value": 300},
                        "refunds": {"value": 20}
                    }},
                    {"users": 3000, "metrics": {
                        "purchase": {"expected": 0.15, "ci": [0.05, 0.25], "chanceToWin": 0.99, "value": 345},
                        "refunds": {"expected": 0.02, "ci": [-0.1, 0.14], "chanceToWin": 0.4, "value": 21}
                    }}
                ]
            }]
        }]
    }
}"#;

#[test]
fn test_report_text_output() {
    let tmp = TempDir::new().unwrap();
    let experiment = write(tmp.path(), "exp.json", EXPERIMENT);
    write(
        tmp.path(),
        "snapshots/experiment/exp_1/snapshot/0.json",
        SNAPSHOT,
    );

    let mut cmd = Command::cargo_bin("abverdict").unwrap();
    cmd.arg("report")
        .arg("--experiment")
        .arg(&experiment)
        .arg("--snapshots")
        .arg(tmp.path().join("snapshots"));

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Purchases"))
        .stdout(predicate::str::contains("Annual first"))
        .stdout(predicate::str::contains("Won"))
        .stdout(predicate::str::contains("Refunds (guardrail)"))
        .stdout(predicate::str::contains("Not significant"));
}

#[test]
fn test_report_json_output() {
    let tmp = TempDir::new().unwrap();
    let experiment = write(tmp.path(), "exp.json", EXPERIMENT);
    write(
        tmp.path(),
        "snapshots/experiment/exp_1/snapshot/0.json",
        SNAPSHOT,
    );

    let mut cmd = Command::cargo_bin("abverdict").unwrap();
    cmd.arg("report")
        .arg("-e")
        .arg(&experiment)
        .arg("-s")
        .arg(tmp.path().join("snapshots"))
        .arg("--format")
        .arg("json");

    let output = cmd.assert().success().get_output().stdout.clone();
    let rows: serde_json::Value = serde_json::from_slice(&output).unwrap();
    let rows = rows.as_array().unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["metricId"], "purchase");
    assert_eq!(rows[0]["verdict"]["resultsStatus"], "won");
    assert_eq!(rows[1]["kind"], "guardrail");
}

#[test]
fn test_report_missing_snapshot() {
    let tmp = TempDir::new().unwrap();
    let experiment = write(tmp.path(), "exp.json", EXPERIMENT);

    let mut cmd = Command::cargo_bin("abverdict").unwrap();
    cmd.arg("report")
        .arg("-e")
        .arg(&experiment)
        .arg("-s")
        .arg(tmp.path())
        .arg("--dimension")
        .arg("browser");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("/experiment/exp_1/snapshot/0/browser"));
}

#[test]
fn test_report_rejects_dimension_outside_snapshot_dir() {
    let tmp = TempDir::new().unwrap();
    let experiment = write(tmp.path(), "exp.json", EXPERIMENT);
    write(tmp.path(), "leak.json", SNAPSHOT);

    let mut cmd = Command::cargo_bin("abverdict").unwrap();
    cmd.arg("report")
        .arg("-e")
        .arg(&experiment)
        .arg("-s")
        .arg(tmp.path().join("snapshots"))
        .arg("--dimension")
        .arg("../../../../leak");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("invalid snapshot path segment"));
}

// ============================================================================
// place
// ============================================================================

#[test]
fn test_place_json_output() {
    let mut cmd = Command::cargo_bin("abverdict").unwrap();
    cmd.args([
        "place",
        "--x",
        "600",
        "--y",
        "200",
        "--layout",
        "left",
        "--viewport-width",
        "1280",
        "--format",
        "json",
    ]);

    let output = cmd.assert().success().get_output().stdout.clone();
    let placement: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(placement["arrowOffset"], 97.0);
    assert_eq!(placement["top"], 200.0);
    assert_eq!(placement["verticalAlign"], "top");
}

#[test]
fn test_place_narrow_viewport_text() {
    let mut cmd = Command::cargo_bin("abverdict").unwrap();
    cmd.args([
        "place",
        "--x",
        "100",
        "--y",
        "50",
        "--layout",
        "right",
        "--align",
        "bottom",
        "--viewport-width",
        "300",
    ]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("width: 300"))
        .stdout(predicate::str::contains("arrow: 3%"))
        .stdout(predicate::str::contains("transform-origin: 3% 100%"));
}
