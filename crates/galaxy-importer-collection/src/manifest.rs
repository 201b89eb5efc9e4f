//! Collection manifest loading
//!
//! Reads `MANIFEST.json` from the collection root and validates its
//! `collection_info` block into [`PackageMetadata`]. Also checks that an
//! archive named `<namespace>-<name>-<version>.tar.gz` agrees with the
//! manifest it carries.
//!
//! ```json
//! {
//!   "collection_info": { "namespace": "my_namespace", "name": "my_collection", ... },
//!   "file_manifest_file": { "name": "FILES.json", "ftype": "file", ... },
//!   "format": 1
//! }
//! ```

use galaxy_importer_core::types::{
    CollectionManifest, PackageMetadata, ValidationPolicy, MANIFEST_FILENAME,
};
use galaxy_importer_core::names::is_valid_name;
use galaxy_importer_core::{Error, Result};
use semver::Version;
use serde_json::Value;
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Load and validate `MANIFEST.json` from an extracted collection
pub fn load_manifest(root: &Path, policy: &ValidationPolicy) -> Result<CollectionManifest> {
    let path = root.join(MANIFEST_FILENAME);
    if !path.is_file() {
        return Err(Error::manifest_not_found(MANIFEST_FILENAME));
    }

    debug!("Loading manifest from: {}", path.display());
    let content = fs::read_to_string(&path)?;
    let raw: Value = serde_json::from_str(&content)
        .map_err(|e| Error::file_parser(MANIFEST_FILENAME, e))?;

    let manifest = CollectionManifest::from_value(&raw, policy)?;
    info!(
        "Loaded manifest for {} {}",
        manifest.collection_info.fqcn(),
        manifest.collection_info.version()
    );
    Ok(manifest)
}

/// Identity encoded in a collection archive file name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionFilename {
    pub namespace: String,
    pub name: String,
    pub version: String,
}

impl CollectionFilename {
    /// Parse `<namespace>-<name>-<version>.tar.gz`; `None` unless both
    /// names are valid collection names and the version is semver
    pub fn parse(filename: &str) -> Option<Self> {
        let stem = filename.strip_suffix(".tar.gz")?;
        let mut parts = stem.splitn(3, '-');
        let namespace = parts.next()?;
        let name = parts.next()?;
        let version = parts.next()?;
        if !is_valid_name(namespace) || !is_valid_name(name) {
            return None;
        }
        Version::parse(version).ok()?;
        Some(Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
            version: version.to_string(),
        })
    }

    /// Parse the file name component of an archive path
    pub fn from_path(path: &Path) -> Option<Self> {
        path.file_name()
            .and_then(|n| n.to_str())
            .and_then(Self::parse)
    }

    /// Fail when the file name disagrees with the manifest
    pub fn check_against(&self, metadata: &PackageMetadata) -> Result<()> {
        let mut mismatches = Vec::new();
        for (field, from_name, declared) in [
            ("namespace", &self.namespace, metadata.namespace()),
            ("name", &self.name, metadata.name()),
            ("version", &self.version, metadata.version()),
        ] {
            if from_name != declared {
                mismatches.push(format!(
                    "Filename {} '{}' did not match metadata '{}'",
                    field, from_name, declared
                ));
            }
        }

        if mismatches.is_empty() {
            Ok(())
        } else {
            Err(Error::manifest_violations(mismatches))
        }
    }
}

impl fmt::Display for CollectionFilename {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}.tar.gz", self.namespace, self.name, self.version)
    }
}
