//! Modules, plugin subtypes and extension plugins

use super::{validated_name, ContentLoader, LoadContext};
use crate::docs::normalize_doc_strings;
use galaxy_importer_core::types::{ContentRecord, DiscoveredContent};
use galaxy_importer_core::Result;
use serde_json::Value;
use tracing::debug;

/// Attaches externally generated doc strings to plugin content
pub struct PluginLoader;

impl ContentLoader for PluginLoader {
    fn name(&self) -> &'static str {
        "plugin"
    }

    fn load(&self, content: &DiscoveredContent, ctx: &LoadContext<'_>) -> Result<ContentRecord> {
        let name = validated_name(content)?;
        let mut record = ContentRecord::new(name, content.category);

        let fqcn = ctx.fqcn(content);
        match ctx.doc_strings.and_then(|index| index.get(content.category, &fqcn)) {
            Some(raw) => {
                record.description = raw
                    .pointer("/doc/short_description")
                    .and_then(Value::as_str)
                    .map(str::to_string);
                record.doc_strings = Some(normalize_doc_strings(raw));
            }
            None => debug!("No doc strings for {} {}", content.category, fqcn),
        }

        Ok(record)
    }
}
