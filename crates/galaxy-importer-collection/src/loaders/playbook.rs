//! Playbooks

use super::{validated_name, ContentLoader, LoadContext};
use galaxy_importer_core::types::{ContentRecord, DiscoveredContent};
use galaxy_importer_core::Result;

/// Playbooks carry nothing beyond their name
pub struct PlaybookLoader;

impl ContentLoader for PlaybookLoader {
    fn name(&self) -> &'static str {
        "playbook"
    }

    fn load(&self, content: &DiscoveredContent, _ctx: &LoadContext<'_>) -> Result<ContentRecord> {
        Ok(ContentRecord::new(validated_name(content)?, content.category))
    }
}
