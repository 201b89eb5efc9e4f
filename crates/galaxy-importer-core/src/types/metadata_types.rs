//! Collection metadata (`collection_info` in MANIFEST.json)

use crate::error::{Error, Result};
use crate::names::{self, VersionRange, MAX_TAGS};
use crate::spdx::{self, LicenseStatus};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Maximum length of an author entry
pub const MAX_LENGTH_AUTHOR: usize = 64;

/// Maximum length of the version string
pub const MAX_LENGTH_VERSION: usize = 128;

/// Maximum length of URL fields
pub const MAX_LENGTH_URL: usize = 2000;

/// Controlled tag vocabulary used when required tags are enforced
pub const REQUIRED_TAG_LIST: &[&str] = &[
    "application",
    "cloud",
    "database",
    "eda",
    "infrastructure",
    "linux",
    "monitoring",
    "networking",
    "security",
    "storage",
    "tools",
    "windows",
];

const REQUIRED_FIELDS: &[&str] = &[
    "namespace",
    "name",
    "version",
    "authors",
    "readme",
    "repository",
];

const NULLABLE_STRING_FIELDS: &[&str] = &[
    "description",
    "repository",
    "documentation",
    "homepage",
    "issues",
    "license_file",
];

const URL_FIELDS: &[&str] = &["repository", "documentation", "homepage", "issues"];

/// Policy flags that change how strict metadata validation is
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationPolicy {
    /// Require at least one tag from [`REQUIRED_TAG_LIST`]
    pub check_required_tags: bool,

    /// Reject versions below 1.0.0
    pub require_v1_or_greater: bool,
}

/// Validated collection metadata
///
/// Only obtainable through [`PackageMetadata::validate`]; fields are read
/// through accessors so a constructed value stays valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageMetadata {
    namespace: String,
    name: String,
    version: String,
    authors: Vec<String>,
    readme: String,
    tags: Vec<String>,
    description: Option<String>,
    license: Vec<String>,
    license_file: Option<String>,
    dependencies: BTreeMap<String, String>,
    repository: Option<String>,
    documentation: Option<String>,
    homepage: Option<String>,
    issues: Option<String>,
}

impl PackageMetadata {
    /// Validate a raw `collection_info` object
    ///
    /// Every rule runs; all violations are reported together in one
    /// [`Error::ManifestValidation`], first failing rule first.
    pub fn validate(raw: &Value, policy: &ValidationPolicy) -> Result<Self> {
        let Some(obj) = raw.as_object() else {
            return Err(Error::manifest_validation(
                "'collection_info' must be an object",
            ));
        };

        let mut v = Violations::default();

        for field in REQUIRED_FIELDS {
            if is_missing(obj.get(*field)) {
                v.push(format!("'{}' is required", field));
            }
        }

        for field in NULLABLE_STRING_FIELDS {
            if let Some(value) = obj.get(*field) {
                if !value.is_null() && !value.is_string() {
                    v.push(format!("'{}' must be a string", field));
                }
            }
        }

        for field in URL_FIELDS {
            if let Some(url) = obj.get(*field).and_then(Value::as_str) {
                if url.len() > MAX_LENGTH_URL {
                    v.push(format!(
                        "'{}' must not be greater than {} characters",
                        field, MAX_LENGTH_URL
                    ));
                }
            }
        }

        let namespace = string_field(obj, "namespace", &mut v);
        let name = string_field(obj, "name", &mut v);
        for (field, value) in [("namespace", &namespace), ("name", &name)] {
            if let Some(value) = value {
                if !names::is_valid_name(value) {
                    v.push(format!("'{}' has invalid format: '{}'", field, value));
                }
            }
        }

        let version = string_field(obj, "version", &mut v);
        if let Some(version) = &version {
            check_version(version, policy, &mut v);
        }

        let authors = string_list_field(obj, "authors", &mut v);
        for author in &authors {
            if author.len() > MAX_LENGTH_AUTHOR {
                v.push(format!(
                    "Each author in 'authors' must not be greater than {} characters",
                    MAX_LENGTH_AUTHOR
                ));
            }
        }

        let readme = string_field(obj, "readme", &mut v);

        let tags = string_list_field(obj, "tags", &mut v);
        check_tags(&tags, policy, &mut v);

        let license = string_list_field(obj, "license", &mut v);
        let license_file = obj
            .get("license_file")
            .and_then(Value::as_str)
            .map(str::to_string);
        check_license(&license, license_file.as_deref(), &mut v);

        let dependencies = dependency_field(obj, &mut v);
        check_dependencies(
            &dependencies,
            namespace.as_deref(),
            name.as_deref(),
            &mut v,
        );

        v.finish()?;

        Ok(Self {
            namespace: namespace.unwrap_or_default(),
            name: name.unwrap_or_default(),
            version: version.unwrap_or_default(),
            authors,
            readme: readme.unwrap_or_default(),
            tags,
            description: optional_string(obj, "description"),
            license,
            license_file,
            dependencies,
            repository: optional_string(obj, "repository"),
            documentation: optional_string(obj, "documentation"),
            homepage: optional_string(obj, "homepage"),
            issues: optional_string(obj, "issues"),
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn authors(&self) -> &[String] {
        &self.authors
    }

    /// Readme file name relative to the collection root
    pub fn readme(&self) -> &str {
        &self.readme
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn license(&self) -> &[String] {
        &self.license
    }

    pub fn license_file(&self) -> Option<&str> {
        self.license_file.as_deref()
    }

    /// `namespace.name` -> version range
    pub fn dependencies(&self) -> &BTreeMap<String, String> {
        &self.dependencies
    }

    pub fn repository(&self) -> Option<&str> {
        self.repository.as_deref()
    }

    pub fn documentation(&self) -> Option<&str> {
        self.documentation.as_deref()
    }

    pub fn homepage(&self) -> Option<&str> {
        self.homepage.as_deref()
    }

    pub fn issues(&self) -> Option<&str> {
        self.issues.as_deref()
    }

    /// `namespace.name`
    pub fn fqcn(&self) -> String {
        format!("{}.{}", self.namespace, self.name)
    }
}

impl<'de> Deserialize<'de> for PackageMetadata {
    /// Deserializing runs the full validation with the default policy
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = Value::deserialize(deserializer)?;
        Self::validate(&raw, &ValidationPolicy::default()).map_err(serde::de::Error::custom)
    }
}

#[derive(Default)]
struct Violations(Vec<String>);

impl Violations {
    fn push(&mut self, message: String) {
        self.0.push(message);
    }

    fn finish(self) -> Result<()> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(Error::manifest_violations(self.0))
        }
    }
}

fn is_missing(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Array(a)) => a.is_empty(),
        Some(_) => false,
    }
}

fn optional_string(obj: &Map<String, Value>, field: &str) -> Option<String> {
    obj.get(field).and_then(Value::as_str).map(str::to_string)
}

fn string_field(obj: &Map<String, Value>, field: &str, v: &mut Violations) -> Option<String> {
    match obj.get(field) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.is_empty() => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            v.push(format!("'{}' must be a string", field));
            None
        }
    }
}

fn string_list_field(obj: &Map<String, Value>, field: &str, v: &mut Violations) -> Vec<String> {
    match obj.get(field) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                match item.as_str() {
                    Some(s) => out.push(s.to_string()),
                    None => {
                        v.push(format!("Expecting '{}' to be a list of strings", field));
                        return Vec::new();
                    }
                }
            }
            out
        }
        Some(_) => {
            v.push(format!("Expecting '{}' to be a list of strings", field));
            Vec::new()
        }
    }
}

fn dependency_field(obj: &Map<String, Value>, v: &mut Violations) -> BTreeMap<String, String> {
    match obj.get("dependencies") {
        None | Some(Value::Null) => BTreeMap::new(),
        Some(Value::Object(map)) => {
            let mut out = BTreeMap::new();
            for (key, value) in map {
                match value.as_str() {
                    Some(range) => {
                        out.insert(key.clone(), range.to_string());
                    }
                    None => v.push(format!(
                        "Expecting version range for dependency '{}' to be a string",
                        key
                    )),
                }
            }
            out
        }
        Some(_) => {
            v.push("Expecting 'dependencies' to be a dictionary".to_string());
            BTreeMap::new()
        }
    }
}

fn check_version(version: &str, policy: &ValidationPolicy, v: &mut Violations) {
    if version.len() > MAX_LENGTH_VERSION {
        v.push(format!(
            "'version' must not be greater than {} characters",
            MAX_LENGTH_VERSION
        ));
        return;
    }
    match semver::Version::parse(version) {
        Ok(parsed) => {
            if policy.require_v1_or_greater && parsed.major < 1 {
                v.push(format!(
                    "Config is enabled that requires version to be 1.0.0 or greater, instead found '{}'.",
                    version
                ));
            }
        }
        Err(_) => v.push(format!(
            "Expecting 'version' to be in semantic version format, instead found '{}'.",
            version
        )),
    }
}

fn check_tags(tags: &[String], policy: &ValidationPolicy, v: &mut Violations) {
    if tags.len() > MAX_TAGS {
        v.push(format!(
            "Expecting no more than {} tags in metadata, found {}",
            MAX_TAGS,
            tags.len()
        ));
    }
    for tag in tags {
        if !names::is_valid_tag(tag) {
            v.push(format!("'tag' has invalid format: '{}'", tag));
        }
    }
    if policy.check_required_tags
        && !tags.iter().any(|t| REQUIRED_TAG_LIST.contains(&t.as_str()))
    {
        v.push(format!(
            "At least one tag required from tag list: {}",
            REQUIRED_TAG_LIST.join(", ")
        ));
    }
}

fn check_license(license: &[String], license_file: Option<&str>, v: &mut Violations) {
    let license_file = license_file.filter(|f| !f.is_empty());

    match (license.is_empty(), license_file) {
        (true, None) => {
            v.push(format!(
                "Valid values for 'license' or 'license_file' are required. \
                 But 'license' ({:?}) and 'license_file' (null) were invalid.",
                license
            ));
            return;
        }
        (false, Some(_)) => {
            v.push("The 'license' and 'license_file' keys are mutually exclusive".to_string());
            return;
        }
        _ => {}
    }

    let invalid: Vec<&str> = license
        .iter()
        .filter(|id| spdx::license_status(id) != LicenseStatus::Valid)
        .map(String::as_str)
        .collect();
    if !invalid.is_empty() {
        v.push(format!(
            "Expecting 'license' to be a list of valid SPDX license identifiers, \
             instead found invalid license identifiers: '{}' in 'license' value {:?}. \
             For more info, visit https://spdx.org",
            invalid.join(", "),
            license
        ));
    }
}

fn check_dependencies(
    dependencies: &BTreeMap<String, String>,
    namespace: Option<&str>,
    name: Option<&str>,
    v: &mut Violations,
) {
    let own = match (namespace, name) {
        (Some(ns), Some(n)) => Some(format!("{}.{}", ns, n)),
        _ => None,
    };

    for (dep, range) in dependencies {
        let parts: Vec<&str> = dep.split('.').collect();
        let well_formed = parts.len() == 2 && parts.iter().all(|p| names::is_valid_name(p));
        if !well_formed {
            v.push(format!(
                "Expecting dependency to be in the format of 'namespace.name', instead found '{}'.",
                dep
            ));
            continue;
        }

        if own.as_deref() == Some(dep.as_str()) {
            v.push(format!("Cannot have self dependency: '{}'", dep));
            continue;
        }

        if let Err(e) = VersionRange::parse(range) {
            v.push(format!(
                "Dependency '{}' has an invalid version range '{}': {}",
                dep, range, e
            ));
        }
    }
}
