//! Content discovery
//!
//! [`ContentFinder::find`] returns a lazy [`ContentIter`] over the content
//! units of an extracted collection. Categories are searched in a fixed
//! order (plugins, roles, playbooks, extensions, patterns) and a category's
//! directory is only read once iteration reaches it. Within a directory,
//! entries are visited sorted by file name so discovery is deterministic.
//!
//! The iterator is single pass; call [`ContentFinder::find`] again to
//! re-walk the tree.

use galaxy_importer_core::types::{ContentCategory, DiscoveredContent};
use galaxy_importer_core::{Error, Result};
use serde::Deserialize;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Subdirectories that mark a directory under `roles/` as a role
pub const ROLE_MARKER_DIRS: &[&str] = &[
    "tasks", "vars", "handlers", "meta", "defaults", "files", "templates",
];

/// Extensions descriptor, relative to the collection root
pub const EXTENSIONS_FILE: &str = "meta/extensions.yml";

/// Directory extension content is declared relative to
pub const EXTENSIONS_DIR: &str = "extensions";

/// Directory holding one subdirectory per pattern
pub const PATTERNS_DIR: &str = "extensions/patterns";

/// Pattern descriptor, relative to the pattern directory
pub const PATTERN_META_FILE: &str = "meta/pattern.json";

const PLUGIN_EXTENSIONS: &[&str] = &["py", "ps1"];
const EXTENSION_PLUGIN_EXTENSIONS: &[&str] = &["py"];
const PLAYBOOK_EXTENSIONS: &[&str] = &["yml", "yaml"];

type ContentStream = Box<dyn Iterator<Item = Result<DiscoveredContent>>>;

/// One unit of discovery work
#[derive(Debug, Clone)]
enum SearchTask {
    /// `.py`/`.ps1` files under a plugin directory
    Plugins(ContentCategory, PathBuf, &'static [&'static str]),
    Roles,
    Playbooks,
    /// Read `meta/extensions.yml` and queue its allow-listed directories
    Extensions,
    Patterns,
}

/// Discovers content units under a collection root
#[derive(Debug, Clone)]
pub struct ContentFinder {
    root: PathBuf,
}

impl ContentFinder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Start a new walk
    pub fn find(&self) -> ContentIter {
        let mut tasks: VecDeque<SearchTask> = ContentCategory::PLUGIN_CATEGORIES
            .iter()
            .map(|category| {
                SearchTask::Plugins(*category, category.root_dir(), PLUGIN_EXTENSIONS)
            })
            .collect();
        tasks.extend([
            SearchTask::Roles,
            SearchTask::Playbooks,
            SearchTask::Extensions,
            SearchTask::Patterns,
        ]);

        ContentIter {
            root: self.root.clone(),
            tasks,
            current: None,
            failed: false,
        }
    }
}

/// Lazy sequence of discovered content
///
/// Yields `Err` at most once; iteration ends after the first error.
pub struct ContentIter {
    root: PathBuf,
    tasks: VecDeque<SearchTask>,
    current: Option<ContentStream>,
    failed: bool,
}

impl Iterator for ContentIter {
    type Item = Result<DiscoveredContent>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        loop {
            if let Some(stream) = self.current.as_mut() {
                match stream.next() {
                    Some(item) => {
                        if item.is_err() {
                            self.failed = true;
                        }
                        return Some(item);
                    }
                    None => self.current = None,
                }
            }

            let task = self.tasks.pop_front()?;
            match self.start(task) {
                Ok(stream) => self.current = Some(stream),
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

impl ContentIter {
    fn start(&mut self, task: SearchTask) -> Result<ContentStream> {
        debug!("Searching for content: {:?}", task);
        match task {
            SearchTask::Plugins(category, dir, extensions) => {
                Ok(plugin_stream(&self.root, category, &dir, extensions))
            }
            SearchTask::Roles => Ok(role_stream(&self.root)),
            SearchTask::Playbooks => playbook_stream(&self.root),
            SearchTask::Extensions => {
                // declared directories run next, ahead of patterns
                for task in extension_tasks(&self.root)?.into_iter().rev() {
                    self.tasks.push_front(task);
                }
                Ok(Box::new(std::iter::empty()))
            }
            SearchTask::Patterns => pattern_stream(&self.root),
        }
    }
}

fn relative(root: &Path, path: &Path) -> PathBuf {
    path.strip_prefix(root).unwrap_or(path).to_path_buf()
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| extensions.contains(&e))
}

fn walk_error(root: &Path, err: walkdir::Error) -> Error {
    let path = err
        .path()
        .map(|p| relative(root, p).display().to_string())
        .unwrap_or_default();
    Error::content_find(format!("Error reading {}: {}", path, err))
}

fn plugin_stream(
    root: &Path,
    category: ContentCategory,
    dir: &Path,
    extensions: &'static [&'static str],
) -> ContentStream {
    let dir = root.join(dir);
    if !dir.is_dir() {
        return Box::new(std::iter::empty());
    }

    let root = root.to_path_buf();
    let walk = WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.file_name() != "__pycache__");

    Box::new(walk.filter_map(move |entry| match entry {
        Err(e) => Some(Err(walk_error(&root, e))),
        Ok(entry) => {
            let path = entry.path();
            let wanted = entry.file_type().is_file()
                && entry.file_name() != "__init__.py"
                && has_extension(path, extensions);
            wanted.then(|| Ok(DiscoveredContent::new(category, relative(&root, path))))
        }
    }))
}

/// Whether `dir` has at least one role marker subdirectory
pub fn is_role_dir(dir: &Path) -> bool {
    ROLE_MARKER_DIRS.iter().any(|marker| dir.join(marker).is_dir())
}

/// Walks `roles/`, yielding each role directory without descending into it
struct RoleWalk {
    root: PathBuf,
    walk: walkdir::IntoIter,
}

impl Iterator for RoleWalk {
    type Item = Result<DiscoveredContent>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.walk.next()? {
                Ok(entry) => entry,
                Err(e) => return Some(Err(walk_error(&self.root, e))),
            };
            if entry.depth() == 0 || !entry.file_type().is_dir() {
                continue;
            }
            if is_role_dir(entry.path()) {
                self.walk.skip_current_dir();
                return Some(Ok(DiscoveredContent::new(
                    ContentCategory::Role,
                    relative(&self.root, entry.path()),
                )));
            }
        }
    }
}

fn role_stream(root: &Path) -> ContentStream {
    let dir = root.join(ContentCategory::Role.root_dir());
    if !dir.is_dir() {
        return Box::new(std::iter::empty());
    }
    Box::new(RoleWalk {
        root: root.to_path_buf(),
        walk: WalkDir::new(dir).sort_by_file_name().into_iter(),
    })
}

fn sorted_dir_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    paths.sort();
    Ok(paths)
}

fn playbook_stream(root: &Path) -> Result<ContentStream> {
    let dir = root.join(ContentCategory::Playbook.root_dir());
    if !dir.is_dir() {
        return Ok(Box::new(std::iter::empty()));
    }

    let found: Vec<_> = sorted_dir_entries(&dir)?
        .into_iter()
        .filter(|p| p.is_file() && has_extension(p, PLAYBOOK_EXTENSIONS))
        .map(|p| Ok(DiscoveredContent::new(ContentCategory::Playbook, relative(root, &p))))
        .collect();
    Ok(Box::new(found.into_iter()))
}

#[derive(Debug, Deserialize)]
struct ExtensionsDescriptor {
    #[serde(default)]
    extensions: Vec<ExtensionDeclaration>,
}

#[derive(Debug, Deserialize)]
struct ExtensionDeclaration {
    args: ExtensionArgs,
}

#[derive(Debug, Deserialize)]
struct ExtensionArgs {
    ext_dir: String,
}

/// Search tasks for the allow-listed directories in `meta/extensions.yml`
fn extension_tasks(root: &Path) -> Result<Vec<SearchTask>> {
    let path = root.join(EXTENSIONS_FILE);
    if !path.is_file() {
        return Ok(Vec::new());
    }

    let content =
        fs::read_to_string(&path).map_err(|e| Error::file_parser(EXTENSIONS_FILE, e))?;
    let descriptor: Option<ExtensionsDescriptor> =
        serde_yaml_ng::from_str(&content).map_err(|e| Error::file_parser(EXTENSIONS_FILE, e))?;

    let mut tasks = Vec::new();
    for declaration in descriptor.map(|d| d.extensions).unwrap_or_default() {
        let ext_dir = declaration.args.ext_dir;
        match ContentCategory::for_extension_dir(&ext_dir) {
            Some(category) => {
                debug!("Extension directory {} -> {}", ext_dir, category);
                tasks.push(SearchTask::Plugins(
                    category,
                    Path::new(EXTENSIONS_DIR).join(ext_dir.trim_matches('/')),
                    EXTENSION_PLUGIN_EXTENSIONS,
                ));
            }
            None => warn!(
                "Extension directory '{}' is not supported, skipping its content",
                ext_dir
            ),
        }
    }
    Ok(tasks)
}

fn pattern_stream(root: &Path) -> Result<ContentStream> {
    let dir = root.join(PATTERNS_DIR);
    if !dir.is_dir() {
        return Ok(Box::new(std::iter::empty()));
    }

    let root = root.to_path_buf();
    let dirs: Vec<PathBuf> = sorted_dir_entries(&dir)?
        .into_iter()
        .filter(|p| p.is_dir())
        .collect();

    Ok(Box::new(dirs.into_iter().map(move |pattern_dir| {
        check_pattern_layout(&root, &pattern_dir)?;
        Ok(DiscoveredContent::new(
            ContentCategory::Pattern,
            relative(&root, &pattern_dir),
        ))
    })))
}

/// Case-insensitive `readme.md` directly in `dir`
pub fn find_pattern_readme(dir: &Path) -> Option<PathBuf> {
    fs::read_dir(dir).ok()?.flatten().map(|e| e.path()).find(|p| {
        p.is_file()
            && p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.eq_ignore_ascii_case("readme.md"))
    })
}

/// Playbook files directly in a pattern's `playbooks/`, sorted
pub fn pattern_playbooks(pattern_dir: &Path) -> Vec<String> {
    let Ok(entries) = sorted_dir_entries(&pattern_dir.join("playbooks")) else {
        return Vec::new();
    };
    entries
        .into_iter()
        .filter(|p| p.is_file() && has_extension(p, PLAYBOOK_EXTENSIONS))
        .filter_map(|p| p.file_name().and_then(|n| n.to_str()).map(str::to_string))
        .collect()
}

fn check_pattern_layout(root: &Path, pattern_dir: &Path) -> Result<()> {
    let rel = relative(root, pattern_dir).display().to_string();

    if find_pattern_readme(pattern_dir).is_none() {
        return Err(Error::content_find(format!(
            "Pattern {} is missing a README.md",
            rel
        )));
    }
    if !pattern_dir.join(PATTERN_META_FILE).is_file() {
        return Err(Error::content_find(format!(
            "Pattern {} is missing {}",
            rel, PATTERN_META_FILE
        )));
    }
    if pattern_playbooks(pattern_dir).is_empty() {
        return Err(Error::content_find(format!(
            "Pattern {} must contain at least one playbook in playbooks/",
            rel
        )));
    }
    let templates = pattern_dir.join("templates");
    if templates.exists() && !templates.is_dir() {
        return Err(Error::content_find(format!(
            "Pattern {} has a templates entry that is not a directory",
            rel
        )));
    }
    Ok(())
}
