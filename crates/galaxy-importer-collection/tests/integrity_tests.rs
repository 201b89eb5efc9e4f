//! File integrity integration tests
//!
//! Tests FILES.json handling including:
//! - Digest verification of the file list itself
//! - Missing declared files
//! - Unaccounted files on disk

mod common;

use common::*;
use galaxy_importer_collection::{load_manifest, IntegrityChecker};
use galaxy_importer_core::types::ValidationPolicy;
use galaxy_importer_core::Error;
use std::fs;
use tempfile::TempDir;

fn check(root: &std::path::Path, check_checksums: bool) -> galaxy_importer_core::Result<usize> {
    let manifest = load_manifest(root, &ValidationPolicy::default())?;
    IntegrityChecker::new(check_checksums)
        .check(root, &manifest)
        .map(|files| files.files.len())
}

#[cfg(test)]
mod integrity {
    use super::*;

    #[test]
    fn test_valid_collection() {
        let root = TempDir::new().unwrap();
        CollectionBuilder::with_standard_content().build(root.path());

        let entries = check(root.path(), true).unwrap();
        assert!(entries > 5);
    }

    #[test]
    fn test_tampered_file_list() {
        let root = TempDir::new().unwrap();
        CollectionBuilder::new().build(root.path());
        let files_json = root.path().join("FILES.json");
        let mut content = fs::read_to_string(&files_json).unwrap();
        content.push('\n');
        fs::write(&files_json, content).unwrap();

        let err = check(root.path(), true).unwrap_err();
        assert!(matches!(
            err,
            Error::ArtifactFileChecksum { ref path, .. } if path == "FILES.json"
        ));
    }

    #[test]
    fn test_tampered_content_file() {
        let root = TempDir::new().unwrap();
        CollectionBuilder::with_standard_content().build(root.path());
        fs::write(root.path().join("roles/my_role/tasks/main.yml"), "- fail:\n").unwrap();

        match check(root.path(), true).unwrap_err() {
            Error::ArtifactFileChecksum {
                path,
                expected,
                actual,
            } => {
                assert_eq!(path, "roles/my_role/tasks/main.yml");
                assert_eq!(expected, sha256_hex(b"- debug: msg=hi\n"));
                assert_eq!(actual, sha256_hex(b"- fail:\n"));
            }
            other => panic!("unexpected error: {}", other),
        }
        assert!(check(root.path(), false).is_ok());
    }

    #[test]
    fn test_declared_file_missing() {
        let root = TempDir::new().unwrap();
        CollectionBuilder::with_standard_content().build(root.path());
        fs::remove_file(root.path().join("playbooks/site.yml")).unwrap();

        let err = check(root.path(), false).unwrap_err();
        assert!(matches!(
            err,
            Error::ArtifactFileNotFound { ref path } if path == "playbooks/site.yml"
        ));
    }

    #[test]
    fn test_file_list_missing() {
        let root = TempDir::new().unwrap();
        CollectionBuilder::new().build(root.path());
        fs::remove_file(root.path().join("FILES.json")).unwrap();

        let err = check(root.path(), true).unwrap_err();
        assert!(matches!(err, Error::ArtifactFileNotFound { .. }));
    }

    #[test]
    fn test_unaccounted_files_sorted() {
        let root = TempDir::new().unwrap();
        CollectionBuilder::new()
            .with_undeclared_file("debug.log", "trace")
            .with_undeclared_file("a.out", "\x7fELF")
            .with_undeclared_file("docs/alpha.md", "a")
            .build(root.path());

        match check(root.path(), true).unwrap_err() {
            Error::FileNotInFileManifest { paths } => {
                assert_eq!(paths, vec!["a.out", "debug.log", "docs/alpha.md"]);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_empty_directories_are_ignored() {
        let root = TempDir::new().unwrap();
        CollectionBuilder::new().build(root.path());
        fs::create_dir_all(root.path().join("plugins/filter")).unwrap();

        assert!(check(root.path(), true).is_ok());
    }
}
