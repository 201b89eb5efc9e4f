//! MANIFEST.json and FILES.json documents

use super::metadata_types::{PackageMetadata, ValidationPolicy};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// File name of the collection manifest
pub const MANIFEST_FILENAME: &str = "MANIFEST.json";

/// Default file name of the file-list document
pub const FILES_FILENAME: &str = "FILES.json";

/// Digest algorithm supported for file-list entries
pub const CHECKSUM_SHA256: &str = "sha256";

/// Kind of a file-list entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    File,
    Dir,
    Symlink,
}

impl std::fmt::Display for FileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileType::File => write!(f, "file"),
            FileType::Dir => write!(f, "dir"),
            FileType::Symlink => write!(f, "symlink"),
        }
    }
}

/// One entry of FILES.json, or the `file_manifest_file` pointer in
/// MANIFEST.json
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileManifestEntry {
    /// Path relative to the collection root (`.` for the root itself)
    pub name: String,

    /// Entry type
    pub ftype: FileType,

    /// Digest algorithm, null for non-file entries
    #[serde(default)]
    pub chksum_type: Option<String>,

    /// Hex SHA-256 digest, null for non-file entries
    #[serde(default)]
    pub chksum_sha256: Option<String>,

    /// Document format version
    #[serde(default = "default_format")]
    pub format: u32,
}

impl FileManifestEntry {
    /// Whether this entry carries content that has to be hashed
    pub fn is_file(&self) -> bool {
        self.ftype == FileType::File
    }

    /// Normalized relative path (`./a/b` and `a/b` compare equal)
    pub fn rel_path(&self) -> &str {
        let trimmed = self.name.trim_start_matches("./");
        if trimmed.is_empty() {
            "."
        } else {
            trimmed
        }
    }
}

/// FILES.json, the authoritative inventory of the archive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileManifest {
    /// Every file, directory and symlink in the archive
    pub files: Vec<FileManifestEntry>,

    /// Document format version
    #[serde(default = "default_format")]
    pub format: u32,
}

/// MANIFEST.json
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionManifest {
    /// Validated collection metadata
    pub collection_info: PackageMetadata,

    /// Pointer to the file-list document and its digest
    pub file_manifest_file: FileManifestEntry,

    /// Document format version
    pub format: u32,
}

impl CollectionManifest {
    /// Build a manifest from a parsed MANIFEST.json document
    pub fn from_value(value: &Value, policy: &ValidationPolicy) -> Result<Self> {
        let collection_info = value
            .get("collection_info")
            .ok_or_else(|| Error::manifest_validation("'collection_info' is required"))?;
        let collection_info = PackageMetadata::validate(collection_info, policy)?;

        let file_manifest_file = match value.get("file_manifest_file") {
            Some(raw) => serde_json::from_value(raw.clone()).map_err(|e| {
                Error::manifest_validation(format!("Invalid 'file_manifest_file': {}", e))
            })?,
            None => return Err(Error::manifest_validation("'file_manifest_file' is required")),
        };

        let format = value
            .get("format")
            .and_then(Value::as_u64)
            .map_or(Ok(default_format()), u32::try_from)
            .map_err(|_| Error::manifest_validation("'format' is out of range"))?;

        Ok(Self {
            collection_info,
            file_manifest_file,
            format,
        })
    }
}

fn default_format() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn manifest_json() -> Value {
        json!({
            "collection_info": {
                "namespace": "my_namespace",
                "name": "my_collection",
                "version": "2.0.2",
                "authors": ["developer1"],
                "readme": "README.md",
                "license": ["MIT"],
                "repository": "https://example.com/repo"
            },
            "file_manifest_file": {
                "name": "FILES.json",
                "ftype": "file",
                "chksum_type": "sha256",
                "chksum_sha256": "0123",
                "format": 1
            },
            "format": 1
        })
    }

    #[test]
    fn test_from_value() {
        let manifest =
            CollectionManifest::from_value(&manifest_json(), &ValidationPolicy::default())
                .unwrap();
        assert_eq!(manifest.collection_info.name(), "my_collection");
        assert_eq!(manifest.file_manifest_file.name, FILES_FILENAME);
        assert_eq!(manifest.file_manifest_file.ftype, FileType::File);
        assert_eq!(manifest.format, 1);
    }

    #[test]
    fn test_missing_file_manifest_file() {
        let mut raw = manifest_json();
        raw.as_object_mut().unwrap().remove("file_manifest_file");
        let err =
            CollectionManifest::from_value(&raw, &ValidationPolicy::default()).unwrap_err();
        assert!(err.to_string().contains("'file_manifest_file' is required"));
    }

    #[test]
    fn test_file_list_parse() {
        let files: FileManifest = serde_json::from_value(json!({
            "files": [
                {"name": ".", "ftype": "dir", "chksum_type": null, "chksum_sha256": null, "format": 1},
                {"name": "README.md", "ftype": "file", "chksum_type": "sha256", "chksum_sha256": "ab", "format": 1},
                {"name": "docs/link", "ftype": "symlink"}
            ],
            "format": 1
        }))
        .unwrap();
        assert_eq!(files.files.len(), 3);
        assert!(!files.files[0].is_file());
        assert!(files.files[1].is_file());
        assert_eq!(files.files[2].ftype, FileType::Symlink);
        assert_eq!(files.files[2].chksum_sha256, None);
    }

    #[test]
    fn test_rel_path_normalization() {
        let entry = FileManifestEntry {
            name: "./plugins/modules/a.py".to_string(),
            ftype: FileType::File,
            chksum_type: None,
            chksum_sha256: None,
            format: 1,
        };
        assert_eq!(entry.rel_path(), "plugins/modules/a.py");
    }

    #[test]
    fn test_unknown_ftype_rejected() {
        let result: std::result::Result<FileManifestEntry, _> =
            serde_json::from_value(json!({"name": "x", "ftype": "fifo"}));
        assert!(result.is_err());
    }
}
