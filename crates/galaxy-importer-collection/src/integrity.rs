//! File integrity checks against FILES.json
//!
//! Every `file` entry is located on disk and its SHA-256 digest recomputed
//! in fixed-size blocks. Afterwards the extracted tree is walked and any
//! file nobody declared is reported, so nothing can be smuggled into an
//! archive next to the signed inventory.

use crate::extract::resolve_below;
use galaxy_importer_core::types::{
    CollectionManifest, FileManifest, FileManifestEntry, CHECKSUM_SHA256, FILES_FILENAME,
    MANIFEST_FILENAME,
};
use galaxy_importer_core::{Error, Result};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Block size used when hashing files
pub const HASH_BLOCK_SIZE: usize = 64 * 1024;

/// SHA-256 of a file, read in [`HASH_BLOCK_SIZE`] blocks
pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; HASH_BLOCK_SIZE];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// Verifies an extracted collection against its file inventory
#[derive(Debug, Clone)]
pub struct IntegrityChecker {
    check_checksums: bool,
}

impl IntegrityChecker {
    pub fn new(check_checksums: bool) -> Self {
        Self { check_checksums }
    }

    /// Verify FILES.json, every declared file and the set of files on disk
    pub fn check(&self, root: &Path, manifest: &CollectionManifest) -> Result<FileManifest> {
        let pointer = &manifest.file_manifest_file;
        let files_path = entry_path(root, pointer, MANIFEST_FILENAME)?;
        if !files_path.is_file() {
            return Err(Error::artifact_file_not_found(pointer.rel_path()));
        }
        if self.check_checksums {
            self.check_entry_digest(&files_path, pointer)?;
        }

        let content = fs::read_to_string(&files_path)?;
        let file_manifest: FileManifest = serde_json::from_str(&content)
            .map_err(|e| Error::file_parser(pointer.rel_path(), e))?;

        self.check_files(root, &file_manifest)?;
        check_unaccounted_files(root, &file_manifest, pointer.rel_path())?;

        info!(
            "Verified {} file manifest entries",
            file_manifest.files.len()
        );
        Ok(file_manifest)
    }

    /// Check presence and digests of every `file` entry
    pub fn check_files(&self, root: &Path, file_manifest: &FileManifest) -> Result<()> {
        for entry in file_manifest.files.iter().filter(|e| e.is_file()) {
            let path = entry_path(root, entry, FILES_FILENAME)?;
            if !path.is_file() {
                return Err(Error::artifact_file_not_found(entry.rel_path()));
            }
            if self.check_checksums {
                self.check_entry_digest(&path, entry)?;
            }
        }
        Ok(())
    }

    fn check_entry_digest(&self, path: &Path, entry: &FileManifestEntry) -> Result<()> {
        let chksum_type = entry.chksum_type.as_deref().unwrap_or(CHECKSUM_SHA256);
        if chksum_type != CHECKSUM_SHA256 {
            return Err(Error::artifact_file_checksum(
                entry.rel_path(),
                format!("a {} digest", CHECKSUM_SHA256),
                format!("unsupported checksum type '{}'", chksum_type),
            ));
        }

        let expected = entry.chksum_sha256.as_deref().unwrap_or_default();
        let actual = sha256_file(path)?;
        debug!("Checksum {}: {}", entry.rel_path(), actual);

        if !actual.eq_ignore_ascii_case(expected) {
            return Err(Error::artifact_file_checksum(
                entry.rel_path(),
                expected,
                actual,
            ));
        }
        Ok(())
    }
}

/// On-disk location of an inventory entry; names that are absolute or
/// resolve outside the collection are rejected before anything is read
fn entry_path(root: &Path, entry: &FileManifestEntry, document: &str) -> Result<PathBuf> {
    resolve_below(root, Path::new(entry.rel_path()))
        .map(|rel| root.join(rel))
        .ok_or_else(|| {
            Error::file_parser(
                document,
                format!("entry '{}' is outside the collection", entry.name),
            )
        })
}

/// Fail with the sorted list of files on disk that the inventory does not
/// declare
pub fn check_unaccounted_files(
    root: &Path,
    file_manifest: &FileManifest,
    files_name: &str,
) -> Result<()> {
    let mut declared: BTreeSet<String> = file_manifest
        .files
        .iter()
        .map(|e| e.rel_path().to_string())
        .collect();
    declared.insert(MANIFEST_FILENAME.to_string());
    declared.insert(files_name.to_string());
    declared.insert(FILES_FILENAME.to_string());

    let mut unaccounted = Vec::new();
    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| Error::importer(format!("Failed to walk collection: {}", e)))?;
        if entry.file_type().is_dir() {
            continue;
        }
        let Ok(rel) = entry.path().strip_prefix(root) else {
            continue;
        };
        let rel = rel.to_string_lossy().replace('\\', "/");
        if !declared.contains(&rel) {
            unaccounted.push(rel);
        }
    }

    if unaccounted.is_empty() {
        Ok(())
    } else {
        unaccounted.sort();
        Err(Error::FileNotInFileManifest { paths: unaccounted })
    }
}
