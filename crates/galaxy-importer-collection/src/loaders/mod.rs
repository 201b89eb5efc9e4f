//! Content loaders
//!
//! Each content kind has one [`ContentLoader`] turning a
//! [`DiscoveredContent`] into a [`ContentRecord`]. [`loader_for`] is the
//! dispatch table from category to loader.

mod pattern;
mod playbook;
mod plugin;
mod role;

pub use pattern::PatternLoader;
pub use playbook::PlaybookLoader;
pub use plugin::PluginLoader;
pub use role::RoleLoader;

use crate::docs::DocStringIndex;
use galaxy_importer_core::names::is_valid_content_name;
use galaxy_importer_core::types::{
    ContentCategory, ContentKind, ContentRecord, DiscoveredContent, PackageMetadata,
};
use galaxy_importer_core::{Error, Result, SchemaValidator};
use std::path::{Path, PathBuf};

/// Shared, read-only inputs for every loader
pub struct LoadContext<'a> {
    /// Extracted collection root
    pub root: &'a Path,

    /// Validated collection metadata
    pub metadata: &'a PackageMetadata,

    /// Externally generated doc strings, when available
    pub doc_strings: Option<&'a DocStringIndex>,

    /// Validator holding the bundled descriptor schemas
    pub schemas: &'a SchemaValidator,

    /// Render readmes into the records
    pub render_docs: bool,
}

impl LoadContext<'_> {
    /// Absolute path of a content unit
    pub fn path_of(&self, content: &DiscoveredContent) -> PathBuf {
        self.root.join(&content.rel_path)
    }

    /// Fully qualified name used to look up doc strings
    pub fn fqcn(&self, content: &DiscoveredContent) -> String {
        format!("{}.{}", self.metadata.fqcn(), content.path_name())
    }
}

/// Turns one discovered content unit into a normalized record
pub trait ContentLoader: Send + Sync {
    /// Loader name, for logging
    fn name(&self) -> &'static str;

    /// Load a content unit
    fn load(&self, content: &DiscoveredContent, ctx: &LoadContext<'_>) -> Result<ContentRecord>;
}

/// Loader responsible for a category
pub fn loader_for(category: ContentCategory) -> &'static dyn ContentLoader {
    match category.kind() {
        ContentKind::Plugin | ContentKind::Extension => &PluginLoader,
        ContentKind::Role => &RoleLoader,
        ContentKind::Playbook => &PlaybookLoader,
        ContentKind::Pattern => &PatternLoader,
    }
}

/// Derived dotted name, after checking the base name against the content
/// name rule
pub fn validated_name(content: &DiscoveredContent) -> Result<String> {
    let base = content.base_name();
    if !is_valid_content_name(&base) {
        return Err(Error::content_name(content.category, base));
    }
    Ok(content.path_name())
}
