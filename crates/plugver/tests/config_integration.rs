//! Configuration integration tests.
//!
//! These tests verify config discovery, format parsing, and precedence
//! end to end. The `[files]` section is the observable effect: moving the
//! plugin manifest changes what `plugver-validate` reads.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const PLUGIN: &str = r#"{"name":"moved","version":"0.3.0","description":"d","author":{"name":"a"}}"#;

#[allow(deprecated)]
fn cmd(bin: &str, dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin(bin).unwrap();
    cmd.env("PLUGVER_LOG_DIR", dir.join(".logs"))
        .args(["-C", dir.to_str().unwrap()]);
    cmd
}

fn validate(dir: &Path) -> Command {
    cmd("plugver-validate", dir)
}

/// A directory whose plugin manifest lives at `meta/plugin.json`.
fn moved_manifest() -> TempDir {
    let tmp = TempDir::new().unwrap();
    fs::create_dir_all(tmp.path().join("meta")).unwrap();
    fs::write(tmp.path().join("meta/plugin.json"), PLUGIN).unwrap();
    tmp
}

// =============================================================================
// Config File Discovery
// =============================================================================

#[test]
fn default_paths_apply_without_config() {
    let tmp = moved_manifest();
    validate(tmp.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error reading plugin.json:"));
}

#[test]
fn discovers_dotfile_config() {
    let tmp = moved_manifest();
    fs::write(
        tmp.path().join(".plugver.toml"),
        "[files]\nplugin_manifest = \"meta/plugin.json\"\n",
    )
    .unwrap();

    validate(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("moved v0.3.0 is valid"));
}

#[test]
fn discovers_config_in_parent_directory() {
    let tmp = moved_manifest();
    fs::write(
        tmp.path().join("plugver.toml"),
        "[files]\nplugin_manifest = \"../meta/plugin.json\"\n",
    )
    .unwrap();
    let nested = tmp.path().join("nested");
    fs::create_dir_all(&nested).unwrap();

    validate(&nested).assert().success();
}

#[test]
fn explicit_config_flag_is_used() {
    let tmp = moved_manifest();
    let elsewhere = TempDir::new().unwrap();
    let config = elsewhere.path().join("custom.toml");
    fs::write(&config, "[files]\nplugin_manifest = \"meta/plugin.json\"\n").unwrap();

    validate(tmp.path())
        .args(["--config", config.to_str().unwrap()])
        .assert()
        .success();
}

// =============================================================================
// Config Formats
// =============================================================================

#[test]
fn parses_yaml_config() {
    let tmp = moved_manifest();
    fs::write(
        tmp.path().join(".plugver.yaml"),
        "log_level: debug\nfiles:\n  plugin_manifest: meta/plugin.json\n",
    )
    .unwrap();

    validate(tmp.path()).assert().success();
}

#[test]
fn parses_json_config() {
    let tmp = moved_manifest();
    fs::write(
        tmp.path().join(".plugver.json"),
        r#"{"files": {"plugin_manifest": "meta/plugin.json"}}"#,
    )
    .unwrap();

    validate(tmp.path()).assert().success();
}

// =============================================================================
// Error Handling
// =============================================================================

#[test]
fn invalid_toml_config_shows_error() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join(".plugver.toml"), "log_level = [broken").unwrap();

    validate(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load configuration"));
}

#[test]
fn invalid_log_level_shows_error() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join(".plugver.toml"), r#"log_level = "loud""#).unwrap();

    cmd("plugver-release", tmp.path())
        .arg("patch")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load configuration"));
}

// =============================================================================
// Boundary Detection
// =============================================================================

#[test]
fn git_boundary_stops_config_search() {
    let tmp = moved_manifest();
    fs::write(
        tmp.path().join(".plugver.toml"),
        "[files]\nplugin_manifest = \"meta/plugin.json\"\n",
    )
    .unwrap();
    let repo = tmp.path().join("repo");
    fs::create_dir_all(repo.join(".git")).unwrap();

    validate(&repo)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error reading plugin.json:"));
}

// =============================================================================
// Release paths
// =============================================================================

#[test]
fn release_uses_configured_paths() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("package.json"), r#"{"version":"0.9.9"}"#).unwrap();
    fs::create_dir_all(tmp.path().join("meta")).unwrap();
    fs::write(tmp.path().join("meta/plugin.json"), PLUGIN).unwrap();
    fs::write(tmp.path().join("HISTORY.md"), "# History\n\nNotes.\n").unwrap();
    fs::write(
        tmp.path().join(".plugver.toml"),
        "[files]\nplugin_manifest = \"meta/plugin.json\"\nchangelog = \"HISTORY.md\"\n",
    )
    .unwrap();

    cmd("plugver-release", tmp.path())
        .arg("minor")
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated meta/plugin.json"))
        .stdout(predicate::str::contains("Updated HISTORY.md"))
        .stdout(predicate::str::contains("Edit HISTORY.md"));

    let plugin = fs::read_to_string(tmp.path().join("meta/plugin.json")).unwrap();
    assert!(plugin.contains(r#""version": "0.10.0""#));
    let history = fs::read_to_string(tmp.path().join("HISTORY.md")).unwrap();
    assert!(history.starts_with("# History\n\n## [0.10.0] - "));
    assert!(history.ends_with("Notes.\n"));
}
