//! Content categories, discovery results and normalized content records

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

/// Every kind of content a collection can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentCategory {
    Module,
    Role,
    Playbook,
    // plugin subtypes, `plugins/<type>/`
    Action,
    Become,
    Cache,
    Callback,
    Cliconf,
    Connection,
    DocFragments,
    Filter,
    Httpapi,
    Inventory,
    Lookup,
    ModuleUtils,
    Netconf,
    Shell,
    Strategy,
    Terminal,
    Test,
    Vars,
    // extension subtypes, declared in meta/extensions.yml
    EventSource,
    EventFilter,
    Pattern,
}

/// How a category's content is laid out on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// A `.py`/`.ps1` file under `plugins/<type>/`
    Plugin,
    /// A directory under `roles/`
    Role,
    /// A playbook file directly in `playbooks/`
    Playbook,
    /// A `.py` file under an extension directory
    Extension,
    /// A directory under `extensions/patterns/`
    Pattern,
}

impl ContentCategory {
    /// Module first, then the plugin subtypes in discovery order
    pub const PLUGIN_CATEGORIES: [ContentCategory; 19] = [
        ContentCategory::Module,
        ContentCategory::Action,
        ContentCategory::Become,
        ContentCategory::Cache,
        ContentCategory::Callback,
        ContentCategory::Cliconf,
        ContentCategory::Connection,
        ContentCategory::DocFragments,
        ContentCategory::Filter,
        ContentCategory::Httpapi,
        ContentCategory::Inventory,
        ContentCategory::Lookup,
        ContentCategory::ModuleUtils,
        ContentCategory::Netconf,
        ContentCategory::Shell,
        ContentCategory::Strategy,
        ContentCategory::Terminal,
        ContentCategory::Test,
        ContentCategory::Vars,
    ];

    /// Extension directories that are supported and exposed, relative to
    /// `extensions/`
    pub const EXTENSION_ALLOWLIST: [(&'static str, ContentCategory); 2] = [
        ("eda/plugins/event_source", ContentCategory::EventSource),
        ("eda/plugins/event_filter", ContentCategory::EventFilter),
    ];

    /// Snake case name as used in result documents
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentCategory::Module => "module",
            ContentCategory::Role => "role",
            ContentCategory::Playbook => "playbook",
            ContentCategory::Action => "action",
            ContentCategory::Become => "become",
            ContentCategory::Cache => "cache",
            ContentCategory::Callback => "callback",
            ContentCategory::Cliconf => "cliconf",
            ContentCategory::Connection => "connection",
            ContentCategory::DocFragments => "doc_fragments",
            ContentCategory::Filter => "filter",
            ContentCategory::Httpapi => "httpapi",
            ContentCategory::Inventory => "inventory",
            ContentCategory::Lookup => "lookup",
            ContentCategory::ModuleUtils => "module_utils",
            ContentCategory::Netconf => "netconf",
            ContentCategory::Shell => "shell",
            ContentCategory::Strategy => "strategy",
            ContentCategory::Terminal => "terminal",
            ContentCategory::Test => "test",
            ContentCategory::Vars => "vars",
            ContentCategory::EventSource => "event_source",
            ContentCategory::EventFilter => "event_filter",
            ContentCategory::Pattern => "pattern",
        }
    }

    /// Layout family of this category
    pub fn kind(&self) -> ContentKind {
        match self {
            ContentCategory::Role => ContentKind::Role,
            ContentCategory::Playbook => ContentKind::Playbook,
            ContentCategory::Pattern => ContentKind::Pattern,
            ContentCategory::EventSource | ContentCategory::EventFilter => ContentKind::Extension,
            _ => ContentKind::Plugin,
        }
    }

    /// Directory, relative to the collection root, that this category's
    /// derived names are computed from
    pub fn root_dir(&self) -> PathBuf {
        match self {
            ContentCategory::Module => PathBuf::from("plugins/modules"),
            ContentCategory::Role => PathBuf::from("roles"),
            ContentCategory::Playbook => PathBuf::from("playbooks"),
            ContentCategory::Pattern => PathBuf::from("extensions/patterns"),
            ContentCategory::EventSource | ContentCategory::EventFilter => {
                let dir = Self::EXTENSION_ALLOWLIST
                    .iter()
                    .find(|(_, category)| category == self)
                    .map_or("", |(dir, _)| *dir);
                PathBuf::from("extensions").join(dir)
            }
            other => PathBuf::from("plugins").join(other.as_str()),
        }
    }

    /// Category for an allow-listed extension directory
    pub fn for_extension_dir(ext_dir: &str) -> Option<ContentCategory> {
        let ext_dir = ext_dir.trim_matches('/');
        Self::EXTENSION_ALLOWLIST
            .iter()
            .find(|(dir, _)| *dir == ext_dir)
            .map(|(_, category)| *category)
    }
}

impl std::fmt::Display for ContentCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A unit of content found by the content finder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredContent {
    /// Content category
    pub category: ContentCategory,

    /// Path relative to the collection root
    pub rel_path: PathBuf,
}

impl DiscoveredContent {
    pub fn new(category: ContentCategory, rel_path: impl Into<PathBuf>) -> Self {
        Self {
            category,
            rel_path: rel_path.into(),
        }
    }

    /// File stem for file content, directory basename for directories
    pub fn base_name(&self) -> String {
        let name = match self.category.kind() {
            ContentKind::Role | ContentKind::Pattern => self.rel_path.file_name(),
            _ => self.rel_path.file_stem(),
        };
        name.map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Dotted name: subdirectories below the category root plus the base
    /// name, e.g. `plugins/modules/a/b/mod.py` -> `a.b.mod`
    pub fn path_name(&self) -> String {
        let root = self.category.root_dir();
        let relative = self.rel_path.strip_prefix(&root).unwrap_or(&self.rel_path);

        let mut parts: Vec<String> = relative
            .parent()
            .map(|parent| {
                parent
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default();
        parts.push(self.base_name());
        parts.join(".")
    }
}

/// A rendered documentation file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedFile {
    /// File name relative to the directory it was found in
    pub name: String,

    /// Rendered HTML
    pub html: String,
}

/// Normalized content record produced by a loader
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentRecord {
    /// Derived dotted name
    pub name: String,

    /// Content category
    pub category: ContentCategory,

    /// Free text description
    pub description: Option<String>,

    /// Rendered readme, for roles and patterns
    pub readme: Option<RenderedFile>,

    /// Structured doc strings with options and return values as lists of
    /// named objects
    pub doc_strings: Option<Value>,
}

impl ContentRecord {
    pub fn new(name: impl Into<String>, category: ContentCategory) -> Self {
        Self {
            name: name.into(),
            category,
            description: None,
            readme: None,
            doc_strings: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_serialization() {
        assert_eq!(
            serde_json::to_value(ContentCategory::DocFragments).unwrap(),
            "doc_fragments"
        );
        assert_eq!(
            serde_json::to_value(ContentCategory::EventSource).unwrap(),
            "event_source"
        );
        for category in ContentCategory::PLUGIN_CATEGORIES {
            assert_eq!(
                serde_json::to_value(category).unwrap(),
                category.as_str(),
                "{:?}",
                category
            );
        }
    }

    #[test]
    fn test_root_dirs() {
        assert_eq!(
            ContentCategory::Module.root_dir(),
            PathBuf::from("plugins/modules")
        );
        assert_eq!(
            ContentCategory::ModuleUtils.root_dir(),
            PathBuf::from("plugins/module_utils")
        );
        assert_eq!(
            ContentCategory::EventSource.root_dir(),
            PathBuf::from("extensions/eda/plugins/event_source")
        );
        assert_eq!(ContentCategory::Role.root_dir(), PathBuf::from("roles"));
    }

    #[test]
    fn test_extension_dir_lookup() {
        assert_eq!(
            ContentCategory::for_extension_dir("eda/plugins/event_filter/"),
            Some(ContentCategory::EventFilter)
        );
        assert_eq!(ContentCategory::for_extension_dir("eda/rulebooks"), None);
    }

    #[test]
    fn test_path_name_flat() {
        let content =
            DiscoveredContent::new(ContentCategory::Module, "plugins/modules/my_module.py");
        assert_eq!(content.base_name(), "my_module");
        assert_eq!(content.path_name(), "my_module");
    }

    #[test]
    fn test_path_name_nested() {
        let content = DiscoveredContent::new(
            ContentCategory::Module,
            "plugins/modules/subdir1/subdir2/my_module_2.py",
        );
        assert_eq!(content.base_name(), "my_module_2");
        assert_eq!(content.path_name(), "subdir1.subdir2.my_module_2");
    }

    #[test]
    fn test_path_name_roles() {
        let content = DiscoveredContent::new(ContentCategory::Role, "roles/my_role");
        assert_eq!(content.path_name(), "my_role");

        let nested = DiscoveredContent::new(ContentCategory::Role, "roles/group/my_role");
        assert_eq!(nested.base_name(), "my_role");
        assert_eq!(nested.path_name(), "group.my_role");
    }

    #[test]
    fn test_path_name_extension() {
        let content = DiscoveredContent::new(
            ContentCategory::EventSource,
            "extensions/eda/plugins/event_source/alertmanager.py",
        );
        assert_eq!(content.path_name(), "alertmanager");
    }
}
