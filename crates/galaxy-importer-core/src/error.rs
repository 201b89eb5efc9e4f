//! Error types for galaxy-importer-core
//!
//! Every failure the import pipeline can raise is a variant of [`Error`], so
//! callers can catch "any importer failure" with a single match arm.

use thiserror::Error;

/// Result type alias using galaxy-importer-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Importer error taxonomy
#[derive(Error, Debug)]
pub enum Error {
    /// MANIFEST.json field or schema violations
    #[error("Invalid collection metadata. {message}")]
    ManifestValidation { message: String },

    /// MANIFEST.json is missing from the collection root
    #[error("Collection manifest not found: {path}")]
    ManifestNotFound { path: String },

    /// A file listed in FILES.json is not present on disk
    #[error("File {path} listed in FILES.json not found in collection")]
    ArtifactFileNotFound { path: String },

    /// Recorded and recomputed digests differ
    #[error("File {path} checksum mismatch: expected {expected}, actual {actual}")]
    ArtifactFileChecksum {
        path: String,
        expected: String,
        actual: String,
    },

    /// Files present in the archive but not declared in FILES.json
    #[error("Files in the artifact but not the file manifest: {}", paths.join(", "))]
    FileNotInFileManifest { paths: Vec<String> },

    /// Required structural pieces of a content unit are missing
    #[error("{message}")]
    ContentFind { message: String },

    /// A descriptor file could not be read or parsed
    #[error("Error parsing {path}: {message}")]
    FileParser { path: String, message: String },

    /// A derived content name does not match the content name pattern
    #[error("{category} name '{name}' is invalid, names must contain only lowercase letters, digits and underscores, must not start with a digit and must not contain '__'")]
    ContentName { category: String, name: String },

    /// Required content (e.g. a role readme) could not be loaded
    #[error("{message}")]
    ContentLoad { message: String },

    /// meta/runtime.yml problems
    #[error("{message}")]
    RuntimeFile { message: String },

    /// An external tool runner could not be started or waited on
    #[error("{message}")]
    AnsibleTest { message: String },

    /// An archive member would land outside the extraction directory
    #[error("Unsafe archive member '{member}': {reason}")]
    UnsafeArchiveMember { member: String, reason: String },

    /// Documentation generation requested but no readme was found
    #[error("No collection readme found (looked for {looked_for})")]
    ReadmeNotFound { looked_for: String },

    /// Schema validation error
    #[error("Schema validation failed:\n{errors}")]
    SchemaValidation { errors: String },

    /// Schema not found
    #[error("Schema not found: {name}")]
    SchemaNotFound { name: String },

    /// Invalid importer configuration
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Generic importer failure
    #[error("{message}")]
    Importer { message: String },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a manifest validation error from a single message
    pub fn manifest_validation(message: impl Into<String>) -> Self {
        Self::ManifestValidation {
            message: message.into(),
        }
    }

    /// Create a manifest validation error from every collected violation
    pub fn manifest_violations(violations: Vec<String>) -> Self {
        Self::ManifestValidation {
            message: violations.join("\n"),
        }
    }

    /// Create a manifest not found error
    pub fn manifest_not_found(path: impl Into<String>) -> Self {
        Self::ManifestNotFound { path: path.into() }
    }

    /// Create an artifact file not found error
    pub fn artifact_file_not_found(path: impl Into<String>) -> Self {
        Self::ArtifactFileNotFound { path: path.into() }
    }

    /// Create a checksum mismatch error
    pub fn artifact_file_checksum(
        path: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::ArtifactFileChecksum {
            path: path.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create a content find error
    pub fn content_find(message: impl Into<String>) -> Self {
        Self::ContentFind {
            message: message.into(),
        }
    }

    /// Create a file parser error
    pub fn file_parser(path: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::FileParser {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Create a content name error
    pub fn content_name(category: impl std::fmt::Display, name: impl Into<String>) -> Self {
        Self::ContentName {
            category: category.to_string(),
            name: name.into(),
        }
    }

    /// Create a content load error
    pub fn content_load(message: impl Into<String>) -> Self {
        Self::ContentLoad {
            message: message.into(),
        }
    }

    /// Create a runtime file error
    pub fn runtime_file(message: impl Into<String>) -> Self {
        Self::RuntimeFile {
            message: message.into(),
        }
    }

    /// Create an external tool runner error
    pub fn ansible_test(message: impl Into<String>) -> Self {
        Self::AnsibleTest {
            message: message.into(),
        }
    }

    /// Create an unsafe archive member error
    pub fn unsafe_member(member: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnsafeArchiveMember {
            member: member.into(),
            reason: reason.into(),
        }
    }

    /// Create a schema validation error from a list of errors
    pub fn schema_validation(errors: Vec<String>) -> Self {
        Self::SchemaValidation {
            errors: errors.join("\n"),
        }
    }

    /// Create a schema not found error
    pub fn schema_not_found(name: impl Into<String>) -> Self {
        Self::SchemaNotFound { name: name.into() }
    }

    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a generic importer error
    pub fn importer(message: impl Into<String>) -> Self {
        Self::Importer {
            message: message.into(),
        }
    }

    /// Whether this error comes from archive structure, manifest or
    /// integrity checks
    pub fn is_validation_failure(&self) -> bool {
        matches!(
            self,
            Self::ManifestValidation { .. }
                | Self::ManifestNotFound { .. }
                | Self::ArtifactFileNotFound { .. }
                | Self::ArtifactFileChecksum { .. }
                | Self::FileNotInFileManifest { .. }
                | Self::UnsafeArchiveMember { .. }
        )
    }
}
