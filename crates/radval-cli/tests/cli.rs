//! End-to-end tests for the `radval` binary, local backend only.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const REPORTS: &str = "\
patient_id,report_text,structured_laterality,structured_quadrant,structured_finding,structured_microcalcifications,structured_size_mm
P001,\"Right breast, upper outer quadrant, irregular mass measuring 14 mm. No suspicious microcalcifications.\",right,upper outer,mass,False,14
P002,\"Left breast, retroareolar region, benign calcifications noted, no suspicious finding, no size measured.\",left,retroareolar,no suspicious finding,False,
P003,\"Left breast, lower inner quadrant, mass measuring 20 mm.\",right,lower inner,mass,False,12
";

/// A temp dir holding a default config file and the report CSV.
struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("config.json"), "{}").unwrap();
        fs::write(dir.path().join("reports.csv"), REPORTS).unwrap();
        Self { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn radval(&self) -> Command {
        let mut cmd = Command::cargo_bin("radval").unwrap();
        cmd.arg("-c")
            .arg(self.path("config.json"))
            .env_remove("BEDROCK_REGION")
            .env_remove("BEDROCK_MODEL_ID")
            .env_remove("RADVAL_BEDROCK_ENDPOINT")
            .env_remove("AWS_BEARER_TOKEN_BEDROCK");
        cmd
    }
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

#[test]
fn validate_writes_csv_to_stdout() {
    let ws = Workspace::new();

    ws.radval()
        .arg("validate")
        .arg(ws.path("reports.csv"))
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "patient_id,extracted_laterality,extracted_quadrant,extracted_finding",
        ))
        .stdout(predicate::str::contains(
            "P001,right,upper outer,mass,false,14.0,0,,",
        ))
        .stdout(predicate::str::contains(
            "P003,left,lower inner,mass,,20.0,2,laterality: right vs left; size_mm: 12.0 vs 20.0,",
        ))
        .stderr(predicate::str::contains("Validated 3 rows"));
}

#[test]
fn validate_writes_json_file() {
    let ws = Workspace::new();
    let out = ws.path("out.json");

    ws.radval()
        .args(["validate", "-f", "json", "-o"])
        .arg(&out)
        .arg(ws.path("reports.csv"))
        .assert()
        .success();

    let rows: serde_json::Value = serde_json::from_str(&read(&out)).unwrap();
    assert_eq!(rows.as_array().unwrap().len(), 3);
    assert_eq!(rows[1]["extracted_finding"], "no suspicious finding");
    assert_eq!(rows[1]["extracted_size_mm"], serde_json::Value::Null);
    assert_eq!(rows[1]["mismatch_count"], 0);
    assert_eq!(rows[2]["mismatch_count"], 2);
}

#[test]
fn tolerance_flag_widens_size_match() {
    let ws = Workspace::new();

    ws.radval()
        .args(["validate", "--tolerance", "8"])
        .arg(ws.path("reports.csv"))
        .assert()
        .success()
        .stdout(predicate::str::contains("P003,left,lower inner,mass,,20.0,1,laterality: right vs left,"));
}

#[test]
fn negative_tolerance_is_rejected() {
    let ws = Workspace::new();

    ws.radval()
        .args(["validate", "--tolerance=-1"])
        .arg(ws.path("reports.csv"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("tolerance"));
}

#[test]
fn fail_on_mismatch_exits_non_zero() {
    let ws = Workspace::new();

    ws.radval()
        .args(["validate", "--fail-on-mismatch"])
        .arg(ws.path("reports.csv"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("1 of 3 rows mismatched"));
}

#[test]
fn missing_columns_are_reported() {
    let ws = Workspace::new();
    fs::write(ws.path("bad.csv"), "patient_id,report_text\nP1,Left breast\n").unwrap();

    ws.radval()
        .arg("validate")
        .arg(ws.path("bad.csv"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing required columns"))
        .stderr(predicate::str::contains("structured_laterality"));
}

#[test]
fn validate_accepts_glob_pattern() {
    let ws = Workspace::new();
    fs::write(ws.path("more.csv"), REPORTS).unwrap();
    let pattern = ws.dir.path().join("*.csv");

    ws.radval()
        .arg("validate")
        .arg(pattern.to_str().unwrap())
        .assert()
        .success()
        .stderr(predicate::str::contains("Validated 6 rows"));
}

#[test]
fn no_matching_input_fails() {
    let ws = Workspace::new();

    ws.radval()
        .arg("validate")
        .arg(ws.path("absent-*.csv").to_str().unwrap())
        .assert()
        .failure()
        .stderr(predicate::str::contains("No input files found"));
}

#[test]
fn extract_prints_record_json() {
    let ws = Workspace::new();

    let output = ws
        .radval()
        .args([
            "extract",
            "Right breast, upper outer quadrant, irregular mass measuring 14 mm. No suspicious microcalcifications.",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let record: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        record,
        serde_json::json!({
            "laterality": "right",
            "quadrant": "upper outer",
            "finding": "mass",
            "microcalcifications": false,
            "size_mm": 14.0
        })
    );
}

#[test]
fn extract_reads_file() {
    let ws = Workspace::new();
    fs::write(ws.path("report.txt"), "Left breast, retroareolar region, no suspicious finding.").unwrap();

    ws.radval()
        .arg("extract")
        .arg("--file")
        .arg(ws.path("report.txt"))
        .assert()
        .success()
        .stdout(predicate::str::contains("\"finding\": \"no suspicious finding\""))
        .stdout(predicate::str::contains("\"size_mm\": null"));
}

#[test]
fn config_init_then_set_and_get() {
    let ws = Workspace::new();
    let config = ws.path("nested/radval.json");
    let config_arg = config.to_str().unwrap();

    Command::cargo_bin("radval")
        .unwrap()
        .args(["-c", config_arg, "config", "init"])
        .assert()
        .success();
    assert!(config.exists());

    Command::cargo_bin("radval")
        .unwrap()
        .args(["-c", config_arg, "config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    Command::cargo_bin("radval")
        .unwrap()
        .args(["-c", config_arg, "config", "set", "validation.size_tolerance_mm", "2.5"])
        .assert()
        .success();

    Command::cargo_bin("radval")
        .unwrap()
        .args(["-c", config_arg, "config", "get", "validation.size_tolerance_mm"])
        .assert()
        .success()
        .stdout("2.5\n");

    Command::cargo_bin("radval")
        .unwrap()
        .args(["-c", config_arg, "config", "set", "validation.tolerance", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration key not found"));
}

#[test]
fn config_file_tolerance_is_used() {
    let ws = Workspace::new();
    fs::write(
        ws.path("config.json"),
        r#"{"validation": {"size_tolerance_mm": 8.0}}"#,
    )
    .unwrap();

    ws.radval()
        .arg("validate")
        .arg(ws.path("reports.csv"))
        .assert()
        .success()
        .stdout(predicate::str::contains("P003,left,lower inner,mass,,20.0,1,"));
}
