//! Bundled SPDX license list

use rust_embed::RustEmbed;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::warn;

/// Maximum length of a license identifier
pub const MAX_LENGTH_LICENSE: usize = 32;

#[derive(RustEmbed)]
#[folder = "$CARGO_MANIFEST_DIR/../../embedded/data/"]
#[prefix = ""]
struct EmbeddedData;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LicenseList {
    licenses: Vec<LicenseEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LicenseEntry {
    license_id: String,
    is_deprecated_license_id: bool,
}

/// Status of a license identifier against the SPDX list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LicenseStatus {
    Valid,
    Deprecated,
    Unknown,
}

static LICENSES: LazyLock<HashMap<String, bool>> = LazyLock::new(load_licenses);

fn load_licenses() -> HashMap<String, bool> {
    let Some(file) = EmbeddedData::get("spdx_licenses.json") else {
        warn!("Bundled SPDX license list is missing, every license will be rejected");
        return HashMap::new();
    };

    match serde_json::from_slice::<LicenseList>(&file.data) {
        Ok(list) => list
            .licenses
            .into_iter()
            .map(|l| (l.license_id, l.is_deprecated_license_id))
            .collect(),
        Err(e) => {
            warn!("Failed to parse bundled SPDX license list: {}", e);
            HashMap::new()
        }
    }
}

/// Look up a license identifier (case-sensitive, as SPDX ids are)
pub fn license_status(id: &str) -> LicenseStatus {
    if id.len() > MAX_LENGTH_LICENSE {
        return LicenseStatus::Unknown;
    }
    match LICENSES.get(id) {
        Some(false) => LicenseStatus::Valid,
        Some(true) => LicenseStatus::Deprecated,
        None => LicenseStatus::Unknown,
    }
}
