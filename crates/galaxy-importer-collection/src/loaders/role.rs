//! Roles

use super::{validated_name, ContentLoader, LoadContext};
use crate::docs::{locate_readme, normalize_argument_specs, render_file};
use galaxy_importer_core::types::{ContentRecord, DiscoveredContent};
use galaxy_importer_core::{Error, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Role metadata files, first existing one wins
pub const ROLE_META_FILES: &[&str] = &["meta/main.yml", "meta/main.yaml", "meta.yml", "meta.yaml"];

/// Role argument spec files, first existing one wins
pub const ARGUMENT_SPEC_FILES: &[&str] = &["meta/argument_specs.yml", "meta/argument_specs.yaml"];

/// Loads role metadata, readme and argument specs
pub struct RoleLoader;

impl RoleLoader {
    fn read_yaml(&self, ctx: &LoadContext<'_>, path: &Path) -> Result<Value> {
        let rel = path
            .strip_prefix(ctx.root)
            .unwrap_or(path)
            .display()
            .to_string();
        let content = fs::read_to_string(path).map_err(|e| Error::file_parser(&rel, e))?;
        let value: Option<Value> =
            serde_yaml_ng::from_str(&content).map_err(|e| Error::file_parser(&rel, e))?;
        Ok(value.unwrap_or(Value::Null))
    }

    fn first_existing(dir: &Path, candidates: &[&str]) -> Option<std::path::PathBuf> {
        candidates
            .iter()
            .map(|c| dir.join(c))
            .find(|p| p.is_file())
    }
}

impl ContentLoader for RoleLoader {
    fn name(&self) -> &'static str {
        "role"
    }

    fn load(&self, content: &DiscoveredContent, ctx: &LoadContext<'_>) -> Result<ContentRecord> {
        let name = validated_name(content)?;
        let dir = ctx.path_of(content);
        let mut record = ContentRecord::new(name, content.category);

        match Self::first_existing(&dir, ROLE_META_FILES) {
            Some(meta_path) => {
                let meta = self.read_yaml(ctx, &meta_path)?;
                record.description = meta
                    .pointer("/galaxy_info/description")
                    .and_then(Value::as_str)
                    .map(str::to_string);
                if record.description.is_none() {
                    warn!("No description found in metadata for role '{}'", record.name);
                }
            }
            None => warn!("No metadata file found for role '{}'", record.name),
        }

        let readme = locate_readme(&dir, None).ok_or_else(|| {
            Error::content_load(format!("No role readme found for role '{}'", record.name))
        })?;
        if ctx.render_docs {
            let readme_name = readme
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            record.readme = Some(render_file(&readme, readme_name)?);
        }

        if let Some(spec_path) = Self::first_existing(&dir, ARGUMENT_SPEC_FILES) {
            debug!("Loading argument specs for role '{}'", record.name);
            let specs = self.read_yaml(ctx, &spec_path)?;
            if !specs.is_null() {
                record.doc_strings = Some(normalize_argument_specs(&specs));
            }
        }

        Ok(record)
    }
}
