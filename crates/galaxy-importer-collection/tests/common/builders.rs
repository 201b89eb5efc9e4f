//! Collection builders for creating test fixtures
//!
//! [`CollectionBuilder`] writes a collection tree to disk together with a
//! FILES.json whose digests match and a MANIFEST.json pointing at it.

#![allow(dead_code)]

use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

pub const TEST_NAMESPACE: &str = "my_namespace";
pub const TEST_NAME: &str = "my_collection";
pub const TEST_VERSION: &str = "2.0.2";
pub const TEST_REQUIRES_ANSIBLE: &str = ">=2.14";

pub fn sha256_hex(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

/// Builder for collection trees
pub struct CollectionBuilder {
    collection_info: Map<String, Value>,
    files: BTreeMap<String, Vec<u8>>,
    undeclared: BTreeSet<String>,
    digest_overrides: BTreeMap<String, String>,
}

impl CollectionBuilder {
    /// Minimal valid collection: metadata, readme and runtime descriptor
    pub fn new() -> Self {
        let collection_info = json!({
            "namespace": TEST_NAMESPACE,
            "name": TEST_NAME,
            "version": TEST_VERSION,
            "authors": ["developer1"],
            "readme": "README.md",
            "license": ["MIT"],
            "tags": ["database"],
            "description": "A test collection",
            "repository": "https://example.com/my_collection",
            "dependencies": {}
        });
        let Value::Object(collection_info) = collection_info else {
            unreachable!()
        };

        Self {
            collection_info,
            files: BTreeMap::new(),
            undeclared: BTreeSet::new(),
            digest_overrides: BTreeMap::new(),
        }
        .with_file("README.md", "# My collection\n")
        .with_file(
            "meta/runtime.yml",
            &format!("requires_ansible: '{}'\n", TEST_REQUIRES_ANSIBLE),
        )
    }

    /// A collection with one module, one role and one playbook
    pub fn with_standard_content() -> Self {
        Self::new()
            .with_file(
                "plugins/modules/my_module.py",
                "DOCUMENTATION = '''\nshort_description: Does things\n'''\n",
            )
            .with_file("roles/my_role/tasks/main.yml", "- debug: msg=hi\n")
            .with_file(
                "roles/my_role/meta/main.yml",
                "galaxy_info:\n  description: Installs things\n",
            )
            .with_file("roles/my_role/README.md", "# My role\n")
            .with_file("playbooks/site.yml", "- hosts: all\n")
    }

    pub fn with_file(mut self, rel: &str, content: &str) -> Self {
        self.files.insert(rel.to_string(), content.as_bytes().to_vec());
        self
    }

    pub fn without_file(mut self, rel: &str) -> Self {
        self.files.remove(rel);
        self
    }

    /// Write a file that FILES.json does not declare
    pub fn with_undeclared_file(mut self, rel: &str, content: &str) -> Self {
        self.undeclared.insert(rel.to_string());
        self.with_file(rel, content)
    }

    /// Record a wrong digest for `rel` in FILES.json
    pub fn with_wrong_digest(mut self, rel: &str) -> Self {
        self.digest_overrides
            .insert(rel.to_string(), sha256_hex(b"something else"));
        self
    }

    pub fn with_info(mut self, key: &str, value: Value) -> Self {
        self.collection_info.insert(key.to_string(), value);
        self
    }

    pub fn without_info(mut self, key: &str) -> Self {
        self.collection_info.remove(key);
        self
    }

    /// FILES.json document for the declared files
    pub fn file_manifest(&self) -> Value {
        let declared: Vec<&String> = self
            .files
            .keys()
            .filter(|rel| !self.undeclared.contains(*rel))
            .collect();

        let mut dirs = BTreeSet::new();
        for rel in &declared {
            let mut parent = Path::new(rel.as_str()).parent();
            while let Some(dir) = parent.filter(|p| !p.as_os_str().is_empty()) {
                dirs.insert(dir.to_string_lossy().into_owned());
                parent = dir.parent();
            }
        }

        let mut entries = vec![json!({
            "name": ".", "ftype": "dir", "chksum_type": null, "chksum_sha256": null, "format": 1
        })];
        for dir in dirs {
            entries.push(json!({
                "name": dir, "ftype": "dir", "chksum_type": null, "chksum_sha256": null, "format": 1
            }));
        }
        for rel in declared {
            let digest = self
                .digest_overrides
                .get(rel)
                .cloned()
                .unwrap_or_else(|| sha256_hex(&self.files[rel]));
            entries.push(json!({
                "name": rel, "ftype": "file", "chksum_type": "sha256",
                "chksum_sha256": digest, "format": 1
            }));
        }

        json!({ "files": entries, "format": 1 })
    }

    /// Write the tree into `root` and return it
    pub fn build(&self, root: &Path) -> PathBuf {
        for (rel, content) in &self.files {
            let path = root.join(rel);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(path, content).unwrap();
        }

        let files_json = serde_json::to_vec_pretty(&self.file_manifest()).unwrap();
        fs::write(root.join("FILES.json"), &files_json).unwrap();

        let manifest = json!({
            "collection_info": Value::Object(self.collection_info.clone()),
            "file_manifest_file": {
                "name": "FILES.json",
                "ftype": "file",
                "chksum_type": "sha256",
                "chksum_sha256": sha256_hex(&files_json),
                "format": 1
            },
            "format": 1
        });
        fs::write(
            root.join("MANIFEST.json"),
            serde_json::to_vec_pretty(&manifest).unwrap(),
        )
        .unwrap();

        root.to_path_buf()
    }

    /// Standard archive file name for this collection
    pub fn archive_name(&self) -> String {
        let field = |key: &str| {
            self.collection_info
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        format!("{}-{}-{}.tar.gz", field("namespace"), field("name"), field("version"))
    }
}

impl Default for CollectionBuilder {
    fn default() -> Self {
        Self::new()
    }
}
