//! Naming rules and version range parsing shared by the validators

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Maximum length of a namespace or collection name
pub const MAX_LENGTH_NAME: usize = 64;

/// Maximum length of a single tag
pub const MAX_LENGTH_TAG: usize = 64;

/// Maximum number of tags per collection
pub const MAX_TAGS: usize = 20;

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9_]*$").expect("valid name regex"));

static CONTENT_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z_][a-z0-9_]*$").expect("valid content name regex"));

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9_]+$").expect("valid tag regex"));

/// Check a namespace or collection name: lowercase letters, digits and
/// underscores, starting with a letter, without `__`
pub fn is_valid_name(name: &str) -> bool {
    name.len() <= MAX_LENGTH_NAME && NAME_RE.is_match(name) && !name.contains("__")
}

/// Check a content base name (module, role, playbook, ...)
///
/// A leading underscore is allowed (deprecated plugins use it).
pub fn is_valid_content_name(name: &str) -> bool {
    CONTENT_NAME_RE.is_match(name) && !name.contains("__")
}

/// Check a single collection tag
pub fn is_valid_tag(tag: &str) -> bool {
    tag.len() <= MAX_LENGTH_TAG && TAG_RE.is_match(tag)
}

/// A dependency version range such as `>=1.0.0,<2.0.0`, `*` or `^1.2`
///
/// Clauses are comma separated. Each clause is `*` or an operator
/// (`=`, `==`, `!=`, `>`, `>=`, `<`, `<=`, `^`, `~`, or none) followed by a
/// version. `!=` requires a full semantic version; the other operators accept
/// partial versions (`1`, `1.2`) and trailing wildcards (`1.*`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRange {
    raw: String,
    clauses: Vec<String>,
}

impl VersionRange {
    /// Parse and validate a version range
    pub fn parse(raw: &str) -> Result<Self, String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err("version range is empty".to_string());
        }

        let mut clauses = Vec::new();
        for clause in trimmed.split(',') {
            let clause = clause.trim();
            Self::check_clause(clause)?;
            clauses.push(clause.to_string());
        }

        Ok(Self {
            raw: trimmed.to_string(),
            clauses,
        })
    }

    /// The individual comma separated clauses
    pub fn clauses(&self) -> &[String] {
        &self.clauses
    }

    /// The range as written
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    fn check_clause(clause: &str) -> Result<(), String> {
        if clause == "*" {
            return Ok(());
        }
        if clause.is_empty() {
            return Err("empty clause".to_string());
        }

        if let Some(version) = clause.strip_prefix("!=") {
            return semver::Version::parse(version.trim())
                .map(|_| ())
                .map_err(|e| format!("'{}': {}", clause, e));
        }

        let normalized = match clause.strip_prefix("==") {
            Some(version) => format!("={}", version.trim()),
            None => clause.to_string(),
        };

        semver::Comparator::parse(&normalized)
            .map(|_| ())
            .map_err(|e| format!("'{}': {}", clause, e))
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
