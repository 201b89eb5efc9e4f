//! Version information for the galaxy-importer CLI

use serde::{Deserialize, Serialize};

/// Version information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionInfo {
    /// Semantic version
    pub version: String,

    /// Git commit SHA (short)
    pub commit: Option<String>,

    /// Target triple
    pub target: Option<String>,
}

impl VersionInfo {
    pub fn current() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            commit: option_env!("GIT_SHA").map(String::from),
            target: option_env!("TARGET").map(String::from),
        }
    }

    pub fn display(&self) -> String {
        let mut parts = vec![format!("galaxy-importer {}", self.version)];
        if let Some(commit) = &self.commit {
            parts.push(format!("({})", commit));
        }
        if let Some(target) = &self.target {
            parts.push(target.clone());
        }
        parts.join(" ")
    }
}

impl std::fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_with_all_fields() {
        let info = VersionInfo {
            version: "1.2.3".to_string(),
            commit: Some("abc1234".to_string()),
            target: Some("x86_64-unknown-linux-gnu".to_string()),
        };
        assert_eq!(
            info.display(),
            "galaxy-importer 1.2.3 (abc1234) x86_64-unknown-linux-gnu"
        );
    }

    #[test]
    fn test_display_without_optional_fields() {
        let info = VersionInfo {
            version: "0.1.0".to_string(),
            commit: None,
            target: None,
        };
        assert_eq!(format!("{}", info), "galaxy-importer 0.1.0");
    }

    #[test]
    fn test_current_version_is_semver() {
        let info = VersionInfo::current();
        assert!(
            semver::Version::parse(&info.version).is_ok(),
            "version should be valid semver, got: {}",
            info.version
        );
    }
}
