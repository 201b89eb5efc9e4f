//! Importer configuration
//!
//! [`ImporterConfig`] is built once at the top of the pipeline and passed
//! by reference into every component that needs a policy flag.

mod loader;

pub use loader::{ConfigLoader, CONFIG_ENV_VAR, CONFIG_SECTION, ENV_PREFIX};

use crate::error::{Error, Result};
use crate::types::ValidationPolicy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::debug;

/// Resolved importer settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImporterConfig {
    /// Default log level for the binary
    pub log_level_main: String,

    /// Render readmes and collect doc strings
    pub generate_docs: bool,

    /// Run `ansible-lint` over the collection
    pub run_ansible_lint: bool,

    /// Seconds before the linter is killed
    pub ansible_lint_timeout: u64,

    /// Require at least one tag from the controlled vocabulary
    pub check_required_tags: bool,

    /// Verify FILES.json digests
    pub check_checksums: bool,

    /// Reject collection versions below 1.0.0
    pub require_v1_or_greater: bool,

    /// Parent of the scratch directory, system temp dir when unset
    pub tmp_root_dir: Option<PathBuf>,

    /// Maximum number of members in an archive
    pub max_archive_members: usize,

    /// Maximum total unpacked size of an archive in bytes
    pub max_unpacked_bytes: u64,

    /// Maximum size of an archive downloaded from a URL in bytes
    pub max_download_bytes: u64,
}

impl Default for ImporterConfig {
    fn default() -> Self {
        Self {
            log_level_main: "INFO".to_string(),
            generate_docs: true,
            run_ansible_lint: true,
            ansible_lint_timeout: 120,
            check_required_tags: false,
            check_checksums: true,
            require_v1_or_greater: false,
            tmp_root_dir: None,
            max_archive_members: 100_000,
            max_unpacked_bytes: 2_000_000_000,
            max_download_bytes: 500_000_000,
        }
    }
}

impl ImporterConfig {
    /// Every recognized key
    pub const KEYS: [&'static str; 11] = [
        "log_level_main",
        "generate_docs",
        "run_ansible_lint",
        "ansible_lint_timeout",
        "check_required_tags",
        "check_checksums",
        "require_v1_or_greater",
        "tmp_root_dir",
        "max_archive_members",
        "max_unpacked_bytes",
        "max_download_bytes",
    ];

    /// Load using the standard search locations and environment
    pub fn load() -> Result<Self> {
        ConfigLoader::new().load()
    }

    /// Build from flat key/value settings, starting from the defaults
    pub fn from_settings(settings: &BTreeMap<String, String>) -> Result<Self> {
        let mut config = Self::default();

        for (key, value) in settings {
            match key.as_str() {
                "log_level_main" => config.log_level_main = value.to_uppercase(),
                "generate_docs" => config.generate_docs = parse_bool(key, value)?,
                "run_ansible_lint" => config.run_ansible_lint = parse_bool(key, value)?,
                "ansible_lint_timeout" => config.ansible_lint_timeout = parse_number(key, value)?,
                "check_required_tags" => config.check_required_tags = parse_bool(key, value)?,
                "check_checksums" => config.check_checksums = parse_bool(key, value)?,
                "require_v1_or_greater" => {
                    config.require_v1_or_greater = parse_bool(key, value)?
                }
                "tmp_root_dir" => {
                    config.tmp_root_dir = (!value.is_empty()).then(|| PathBuf::from(value))
                }
                "max_archive_members" => config.max_archive_members = parse_number(key, value)?,
                "max_unpacked_bytes" => config.max_unpacked_bytes = parse_number(key, value)?,
                "max_download_bytes" => config.max_download_bytes = parse_number(key, value)?,
                other => debug!("Ignoring unknown config key: {}", other),
            }
        }

        Ok(config)
    }

    /// Metadata validation policy derived from these settings
    pub fn validation_policy(&self) -> ValidationPolicy {
        ValidationPolicy {
            check_required_tags: self.check_required_tags,
            require_v1_or_greater: self.require_v1_or_greater,
        }
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(Error::invalid_config(format!(
            "'{}' must be a boolean, found '{}'",
            key, value
        ))),
    }
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| {
        Error::invalid_config(format!(
            "'{}' must be a non-negative integer, found '{}'",
            key, value
        ))
    })
}
