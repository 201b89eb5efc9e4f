//! INI configuration loader with precedence
//!
//! Settings are resolved with the following precedence (low to high):
//! 1. Embedded defaults (built into binary)
//! 2. The first existing config file: `$GALAXY_IMPORTER_CONFIG`,
//!    `~/galaxy-importer.cfg`, `/etc/galaxy-importer/galaxy-importer.cfg`
//! 3. Environment variables (`GALAXY_IMPORTER_<KEY>`)
//! 4. CLI flags (handled by caller)

use super::ImporterConfig;
use crate::error::{Error, Result};
use ini::Ini;
use rust_embed::RustEmbed;
use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Section holding importer settings in every config file
pub const CONFIG_SECTION: &str = "galaxy-importer";

/// Environment variable naming an additional config file
pub const CONFIG_ENV_VAR: &str = "GALAXY_IMPORTER_CONFIG";

/// Prefix of per-key environment overrides
pub const ENV_PREFIX: &str = "GALAXY_IMPORTER_";

const SYSTEM_CONFIG_PATH: &str = "/etc/galaxy-importer/galaxy-importer.cfg";
const USER_CONFIG_FILENAME: &str = "galaxy-importer.cfg";

/// Embedded configuration files
#[derive(RustEmbed)]
#[folder = "$CARGO_MANIFEST_DIR/../../embedded/config/"]
#[prefix = ""]
struct EmbeddedConfigs;

/// Resolves an [`ImporterConfig`] from defaults, a config file and the
/// environment
pub struct ConfigLoader {
    /// Candidate config files, first existing one wins
    search_paths: Vec<PathBuf>,

    /// Whether to apply `GALAXY_IMPORTER_<KEY>` overrides
    use_env: bool,
}

impl ConfigLoader {
    /// Loader with the standard search locations
    pub fn new() -> Self {
        let mut search_paths = Vec::new();
        if let Ok(path) = env::var(CONFIG_ENV_VAR) {
            search_paths.push(PathBuf::from(path));
        }
        if let Some(home) = dirs::home_dir() {
            search_paths.push(home.join(USER_CONFIG_FILENAME));
        }
        search_paths.push(PathBuf::from(SYSTEM_CONFIG_PATH));

        Self {
            search_paths,
            use_env: true,
        }
    }

    /// Loader with explicit search locations and no environment overrides
    pub fn with_search_paths(search_paths: Vec<PathBuf>) -> Self {
        Self {
            search_paths,
            use_env: false,
        }
    }

    /// Loader for one explicit config file, environment overrides still apply
    pub fn with_file(path: impl Into<PathBuf>) -> Self {
        Self {
            search_paths: vec![path.into()],
            use_env: true,
        }
    }

    /// Candidate config files in search order
    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Resolve the configuration
    pub fn load(&self) -> Result<ImporterConfig> {
        let mut settings = Self::load_embedded_defaults()?;

        if let Some(path) = self.search_paths.iter().find(|p| p.is_file()) {
            debug!("Loading config file: {}", path.display());
            settings.extend(Self::load_file(path)?);
        } else {
            debug!("No config file found, using defaults");
        }

        if self.use_env {
            Self::apply_env_overrides(&mut settings);
        }

        ImporterConfig::from_settings(&settings)
    }

    fn load_embedded_defaults() -> Result<BTreeMap<String, String>> {
        let file = EmbeddedConfigs::get("galaxy-importer.cfg")
            .ok_or_else(|| Error::invalid_config("Embedded default config not found"))?;
        let content = std::str::from_utf8(&file.data)
            .map_err(|_| Error::invalid_config("Invalid UTF-8 in embedded default config"))?;
        let ini = Ini::load_from_str(content).map_err(|e| {
            Error::invalid_config(format!("Failed to parse embedded default config: {}", e))
        })?;
        Ok(section_settings(&ini))
    }

    fn load_file(path: &Path) -> Result<BTreeMap<String, String>> {
        let ini = Ini::load_from_file(path).map_err(|e| {
            Error::invalid_config(format!("Failed to parse {}: {}", path.display(), e))
        })?;
        Ok(section_settings(&ini))
    }

    fn apply_env_overrides(settings: &mut BTreeMap<String, String>) {
        for key in ImporterConfig::KEYS {
            let var = format!("{}{}", ENV_PREFIX, key.to_uppercase());
            if let Ok(value) = env::var(&var) {
                debug!("Config override from {}", var);
                settings.insert(key.to_string(), value);
            }
        }
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn section_settings(ini: &Ini) -> BTreeMap<String, String> {
    ini.section(Some(CONFIG_SECTION))
        .map(|props| {
            props
                .iter()
                .map(|(k, v)| (k.to_lowercase(), v.trim().to_string()))
                .collect()
        })
        .unwrap_or_default()
}
