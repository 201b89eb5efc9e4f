//! Integration tests for the galaxy-importer binary
//!
//! Tests argument handling and the JSON written to stdout by the
//! `version`, `readme` and `import` commands.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn galaxy_importer(args: &[&str], config_dir: &Path) -> Output {
    // an empty config file keeps the host's configuration out of the tests
    let config = config_dir.join("galaxy-importer.cfg");
    fs::write(&config, "[galaxy-importer]\nrun_ansible_lint = false\n").unwrap();

    Command::new(env!("CARGO_BIN_EXE_galaxy-importer"))
        .arg("--config")
        .arg(&config)
        .args(args)
        .output()
        .expect("failed to run galaxy-importer")
}

#[test]
fn test_version_json() {
    let temp = TempDir::new().unwrap();
    let output = galaxy_importer(&["version", "--json"], temp.path());
    assert!(output.status.success());

    let info: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let version = info["version"].as_str().unwrap();
    assert!(semver::Version::parse(version).is_ok());
}

#[test]
fn test_readme_renders_html() {
    let temp = TempDir::new().unwrap();
    let readme = temp.path().join("README.md");
    fs::write(&readme, "# Title\n\n<script>alert(1)</script>\n").unwrap();

    let output = galaxy_importer(&["readme", readme.to_str().unwrap()], temp.path());
    assert!(output.status.success());

    let rendered: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(rendered["name"], "README.md");
    let html = rendered["html"].as_str().unwrap();
    assert!(html.contains("<h1>Title</h1>"));
    assert!(!html.contains("<script>"));
}

#[test]
fn test_import_missing_source() {
    let temp = TempDir::new().unwrap();
    let output = galaxy_importer(&["import", "/nonexistent/ns-name-1.0.0.tar.gz"], temp.path());
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Source not found"));
}

#[test]
fn test_import_directory_without_manifest() {
    let temp = TempDir::new().unwrap();
    let collection = temp.path().join("collection");
    fs::create_dir(&collection).unwrap();

    let output = galaxy_importer(&["import", collection.to_str().unwrap()], temp.path());
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Collection manifest not found"));
}

#[test]
fn test_missing_config_file() {
    let output = Command::new(env!("CARGO_BIN_EXE_galaxy-importer"))
        .args(["--config", "/nonexistent/galaxy-importer.cfg", "version"])
        .output()
        .expect("failed to run galaxy-importer");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Config file not found"));
}
