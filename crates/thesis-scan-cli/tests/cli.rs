use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Command isolated from the user's config and data directories.
fn thesis_scan(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("thesis-scan").unwrap();
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("XDG_DATA_HOME", home.join("data"))
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn help_lists_commands() {
    let home = TempDir::new().unwrap();

    thesis_scan(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("extract"))
        .stdout(predicate::str::contains("record"))
        .stdout(predicate::str::contains("models"));
}

#[test]
fn unknown_mode_is_rejected() {
    let home = TempDir::new().unwrap();

    thesis_scan(home.path())
        .args(["extract", "cover", "page.png"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn extract_reports_missing_input() {
    let home = TempDir::new().unwrap();
    let missing = home.path().join("missing.png");

    thesis_scan(home.path())
        .arg("extract")
        .arg("abstract")
        .arg(&missing)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn extract_without_models_suggests_download() {
    let home = TempDir::new().unwrap();
    let page = home.path().join("page.png");
    fs::write(&page, b"not really a png").unwrap();
    let empty_models = home.path().join("models");
    fs::create_dir_all(&empty_models).unwrap();

    thesis_scan(home.path())
        .arg("extract")
        .arg("keywords")
        .arg(&page)
        .arg("--model-dir")
        .arg(&empty_models)
        .assert()
        .failure()
        .stderr(predicate::str::contains("OCR models not found"))
        .stderr(predicate::str::contains("thesis-scan models download"));
}

#[test]
fn record_requires_pages() {
    let home = TempDir::new().unwrap();

    thesis_scan(home.path())
        .arg("record")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No pages given"));
}

#[test]
fn config_init_then_get_and_set() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("scan.json");

    thesis_scan(home.path())
        .arg("--config")
        .arg(&config)
        .args(["config", "init", "--preset", "high-fidelity"])
        .assert()
        .success();
    assert!(config.exists());

    thesis_scan(home.path())
        .arg("--config")
        .arg(&config)
        .args(["config", "get", "ocr.preset"])
        .assert()
        .success()
        .stdout(predicate::str::contains("high-fidelity"));

    thesis_scan(home.path())
        .arg("--config")
        .arg(&config)
        .args(["config", "set", "normalizer.max_width", "640"])
        .assert()
        .success();

    thesis_scan(home.path())
        .arg("--config")
        .arg(&config)
        .args(["config", "get", "normalizer.max_width"])
        .assert()
        .success()
        .stdout(predicate::str::diff("640\n"));
}

#[test]
fn config_set_rejects_unknown_key() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("scan.json");

    thesis_scan(home.path())
        .arg("--config")
        .arg(&config)
        .args(["config", "set", "ocr.threshold", "0.5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration key not found"));
    assert!(!config.exists());
}

#[test]
fn init_refuses_to_overwrite() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("scan.json");
    fs::write(&config, "{}").unwrap();

    thesis_scan(home.path())
        .arg("--config")
        .arg(&config)
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
}

#[test]
fn models_status_reports_missing_files() {
    let home = TempDir::new().unwrap();

    thesis_scan(home.path())
        .args(["models", "status", "-v", "mobile"])
        .assert()
        .success()
        .stdout(predicate::str::contains("latin_rec.onnx"))
        .stdout(predicate::str::contains("missing"));
}

#[test]
fn models_download_requires_base_url() {
    let home = TempDir::new().unwrap();

    thesis_scan(home.path())
        .args(["models", "download", "-v", "mobile"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No model download URL configured"));
}

#[test]
fn models_list_shows_variants() {
    let home = TempDir::new().unwrap();

    thesis_scan(home.path())
        .args(["models", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("mobile"))
        .stdout(predicate::str::contains("server"));
}
