//! Patterns: bundles of playbooks, templates and a descriptor

use super::{validated_name, ContentLoader, LoadContext};
use crate::docs::render_file;
use crate::finder::{find_pattern_readme, pattern_playbooks, PATTERN_META_FILE};
use galaxy_importer_core::schema::PATTERN_SCHEMA;
use galaxy_importer_core::types::{ContentRecord, DiscoveredContent};
use galaxy_importer_core::{Error, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Validates the pattern descriptor and its primary playbook
pub struct PatternLoader;

impl PatternLoader {
    /// With several playbooks exactly one job template must be `primary`
    /// and point at one of them
    pub fn check_primary_playbook(
        pattern: &str,
        descriptor: &Value,
        playbooks: &[String],
    ) -> Result<()> {
        if playbooks.len() <= 1 {
            return Ok(());
        }

        let templates = descriptor
            .pointer("/aap_resources/controller_job_templates")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        let primary: Vec<&str> = templates
            .iter()
            .filter(|t| t.get("primary").and_then(Value::as_bool) == Some(true))
            .filter_map(|t| t.get("playbook").and_then(Value::as_str))
            .collect();

        let &[playbook] = primary.as_slice() else {
            return Err(Error::content_find(format!(
                "Pattern '{}' has multiple playbooks; exactly one job template must be marked primary, found {}",
                pattern,
                primary.len()
            )));
        };

        let file_name = Path::new(playbook)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(playbook);
        if !playbooks.iter().any(|p| p == file_name) {
            return Err(Error::content_find(format!(
                "Pattern '{}' primary playbook '{}' not found in playbooks/",
                pattern, playbook
            )));
        }
        Ok(())
    }
}

impl ContentLoader for PatternLoader {
    fn name(&self) -> &'static str {
        "pattern"
    }

    fn load(&self, content: &DiscoveredContent, ctx: &LoadContext<'_>) -> Result<ContentRecord> {
        let name = validated_name(content)?;
        let dir = ctx.path_of(content);

        let meta_rel = content.rel_path.join(PATTERN_META_FILE).display().to_string();
        let text = fs::read_to_string(dir.join(PATTERN_META_FILE))
            .map_err(|e| Error::file_parser(&meta_rel, e))?;
        let descriptor: Value =
            serde_json::from_str(&text).map_err(|e| Error::file_parser(&meta_rel, e))?;

        debug!("Validating {} against the {} schema", meta_rel, PATTERN_SCHEMA);
        ctx.schemas.validate(&descriptor, PATTERN_SCHEMA)?;

        Self::check_primary_playbook(&name, &descriptor, &pattern_playbooks(&dir))?;

        let mut record = ContentRecord::new(name, content.category);
        record.description = descriptor
            .get("description")
            .and_then(Value::as_str)
            .map(str::to_string);

        if ctx.render_docs {
            if let Some(readme) = find_pattern_readme(&dir) {
                let readme_name = readme
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                record.readme = Some(render_file(&readme, readme_name)?);
            }
        }

        Ok(record)
    }
}
