//! `meta/runtime.yml` handling
//!
//! Only `requires_ansible` matters to the importer. Routing tables and
//! action groups are left to Ansible itself.

use galaxy_importer_core::{Error, Result};
use regex::Regex;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;

/// Runtime descriptor, relative to the collection root
pub const RUNTIME_FILE: &str = "meta/runtime.yml";

/// Maximum length of `requires_ansible`
pub const MAX_LENGTH_REQUIRES_ANSIBLE: usize = 255;

static SPECIFIER_CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(~=|===|==|!=|<=|>=|<|>)\s*v?[0-9]+(\.[0-9]+)*(\.\*)?((a|b|rc)[0-9]+)?(\.post[0-9]+)?(\.dev[0-9]+)?$",
    )
    .expect("specifier regex is valid")
});

/// Parsed runtime descriptor
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RuntimeMetadata {
    /// Ansible core versions the collection supports, e.g. `>=2.14.0`
    pub requires_ansible: Option<String>,
}

/// Whether `spec` is a valid PEP 440 style version specifier set
pub fn is_valid_specifier(spec: &str) -> bool {
    let spec = spec.trim();
    !spec.is_empty()
        && spec.split(',').all(|clause| {
            let clause = clause.trim();
            if !SPECIFIER_CLAUSE.is_match(clause) {
                return false;
            }
            // compatible release needs at least two components and no wildcard
            match clause.strip_prefix("~=") {
                Some(version) => version.contains('.') && !version.ends_with(".*"),
                None => true,
            }
        })
}

/// Load and validate `meta/runtime.yml`
pub fn load_runtime(root: &Path) -> Result<RuntimeMetadata> {
    let path = root.join(RUNTIME_FILE);
    if !path.is_file() {
        return Err(Error::runtime_file(format!(
            "'{}' is required",
            RUNTIME_FILE
        )));
    }

    let content = fs::read_to_string(&path)?;
    let runtime: Option<RuntimeMetadata> = serde_yaml_ng::from_str(&content).map_err(|e| {
        Error::runtime_file(format!("Error parsing '{}': {}", RUNTIME_FILE, e))
    })?;
    let runtime = runtime.unwrap_or(RuntimeMetadata {
        requires_ansible: None,
    });

    let Some(requires) = runtime.requires_ansible.as_deref() else {
        return Err(Error::runtime_file(format!(
            "'requires_ansible' in '{}' is required",
            RUNTIME_FILE
        )));
    };

    if requires.len() > MAX_LENGTH_REQUIRES_ANSIBLE {
        return Err(Error::runtime_file(format!(
            "'requires_ansible' must not be greater than {} characters",
            MAX_LENGTH_REQUIRES_ANSIBLE
        )));
    }

    if !is_valid_specifier(requires) {
        return Err(Error::runtime_file(format!(
            "'requires_ansible' is not a valid version specifier: '{}'",
            requires
        )));
    }

    debug!("requires_ansible: {}", requires);
    Ok(runtime)
}
