//! Readme rendering and doc string handling
//!
//! Markdown is rendered with pulldown-cmark; raw HTML in the source is
//! escaped rather than passed through. Other text files are wrapped in a
//! `<pre>` block.
//!
//! Doc strings come from an external documentation tool as a JSON document
//! keyed by category and fully qualified content name:
//!
//! ```json
//! { "module": { "my_namespace.my_collection.my_module": { "doc": {...}, "return": {...} } } }
//! ```

use galaxy_importer_core::types::{ContentCategory, PackageMetadata, RenderedFile};
use galaxy_importer_core::{Error, Result};
use pulldown_cmark::{html, Event, Options, Parser};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Readme names tried, in order, when no name is declared
pub const README_CANDIDATES: &[&str] = &["README.md", "README.rst", "README.txt", "README"];

/// Directory holding extra collection documentation
pub const DOCS_DIR: &str = "docs";

/// Escape text for inclusion in HTML
pub fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Render markdown to HTML with raw HTML escaped
pub fn render_markdown(text: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(text, options).map(|event| match event {
        Event::Html(raw) => Event::Text(raw),
        other => other,
    });

    let mut out = String::with_capacity(text.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("md"))
}

/// Render a documentation file; `name` is what the result reports
pub fn render_file(path: &Path, name: impl Into<String>) -> Result<RenderedFile> {
    let text = fs::read_to_string(path)?;
    let html = if is_markdown(path) {
        render_markdown(&text)
    } else {
        format!("<pre>{}</pre>", html_escape(&text))
    };
    Ok(RenderedFile {
        name: name.into(),
        html,
    })
}

/// Find a readme in `dir`: the preferred name first, then
/// [`README_CANDIDATES`], matching names case-insensitively
pub fn locate_readme(dir: &Path, preferred: Option<&str>) -> Option<PathBuf> {
    if let Some(preferred) = preferred.filter(|p| !p.is_empty()) {
        let path = dir.join(preferred);
        if path.is_file() {
            return Some(path);
        }
    }

    let mut names: Vec<String> = fs::read_dir(dir)
        .ok()?
        .flatten()
        .filter(|e| e.path().is_file())
        .filter_map(|e| e.file_name().to_str().map(str::to_string))
        .collect();
    names.sort();

    README_CANDIDATES.iter().find_map(|candidate| {
        names
            .iter()
            .find(|n| n.eq_ignore_ascii_case(candidate))
            .map(|n| dir.join(n))
    })
}

/// Collection level documentation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectionDocs {
    /// Rendered collection readme, `None` when none was found
    pub readme: Option<RenderedFile>,

    /// Rendered markdown files from `docs/`, sorted by name
    pub documentation_files: Vec<RenderedFile>,

    /// Readme names that were looked for
    pub looked_for: String,
}

/// Render the collection readme and the markdown files in `docs/`
pub fn collect_collection_docs(root: &Path, metadata: &PackageMetadata) -> Result<CollectionDocs> {
    let readme = match locate_readme(root, Some(metadata.readme())) {
        Some(path) => {
            let name = path
                .strip_prefix(root)
                .unwrap_or(&path)
                .display()
                .to_string();
            debug!("Rendering collection readme {}", name);
            Some(render_file(&path, name)?)
        }
        None => None,
    };

    let mut documentation_files = Vec::new();
    let docs_dir = root.join(DOCS_DIR);
    if docs_dir.is_dir() {
        let mut paths: Vec<PathBuf> = fs::read_dir(&docs_dir)?
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.is_file() && is_markdown(p))
            .collect();
        paths.sort();
        for path in paths {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            documentation_files.push(render_file(&path, name)?);
        }
    }

    let looked_for = std::iter::once(metadata.readme())
        .chain(README_CANDIDATES.iter().copied())
        .filter(|n| !n.is_empty())
        .collect::<Vec<_>>()
        .join(", ");

    Ok(CollectionDocs {
        readme,
        documentation_files,
        looked_for,
    })
}

/// Doc strings per category, keyed by fully qualified content name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocStringIndex {
    entries: BTreeMap<String, BTreeMap<String, Value>>,
}

impl DocStringIndex {
    /// Load an index from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let value: Value = serde_json::from_str(&content)
            .map_err(|e| Error::file_parser(path.display().to_string(), e))?;
        Self::from_value(&value)
    }

    /// Build an index from `{category: {fqcn: doc}}`
    pub fn from_value(value: &Value) -> Result<Self> {
        let Some(categories) = value.as_object() else {
            return Err(Error::importer("Doc strings must be a JSON object"));
        };

        let mut entries = BTreeMap::new();
        for (category, contents) in categories {
            let Some(contents) = contents.as_object() else {
                warn!("Ignoring doc strings for '{}': not an object", category);
                continue;
            };
            let by_name = contents
                .iter()
                .map(|(fqcn, doc)| (fqcn.clone(), doc.clone()))
                .collect();
            entries.insert(category.clone(), by_name);
        }
        Ok(Self { entries })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.values().all(BTreeMap::is_empty)
    }

    /// Raw doc strings for one content unit
    pub fn get(&self, category: ContentCategory, fqcn: &str) -> Option<&Value> {
        self.entries.get(category.as_str())?.get(fqcn)
    }
}

/// Convert `doc.options` and `return` mappings into lists of named objects
/// ordered by name, recursing through `suboptions` and `contains`
pub fn normalize_doc_strings(raw: &Value) -> Value {
    let mut out = raw.clone();
    if let Some(doc) = out.get_mut("doc") {
        if let Some(options) = doc.get_mut("options") {
            *options = named_list(options, "suboptions");
        }
    }
    if let Some(returns) = out.get_mut("return") {
        *returns = named_list(returns, "contains");
    }
    out
}

/// Same conversion for role argument specs: every entry point's `options`
pub fn normalize_argument_specs(raw: &Value) -> Value {
    let mut out = raw.clone();
    if let Some(entry_points) = out.get_mut("argument_specs").and_then(Value::as_object_mut) {
        for entry_point in entry_points.values_mut() {
            if let Some(options) = entry_point.get_mut("options") {
                *options = named_list(options, "suboptions");
            }
        }
    }
    out
}

fn named_list(value: &Value, nested_key: &str) -> Value {
    let Some(map) = value.as_object() else {
        return value.clone();
    };

    let mut entries: Vec<(&String, &Value)> = map.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));

    let list = entries
        .into_iter()
        .map(|(name, spec)| {
            let mut item = Map::new();
            item.insert("name".to_string(), Value::String(name.clone()));
            if let Some(fields) = spec.as_object() {
                for (key, field) in fields {
                    let field = if key == nested_key {
                        named_list(field, nested_key)
                    } else {
                        field.clone()
                    };
                    item.insert(key.clone(), field);
                }
            }
            Value::Object(item)
        })
        .collect();
    Value::Array(list)
}

#[cfg(test)]
mod tests {
    use super::*;
    use galaxy_importer_core::types::ValidationPolicy;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_render_markdown() {
        let html = render_markdown("# Title\n\nSome *text*.");
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<em>text</em>"));
    }

    #[test]
    fn test_raw_html_escaped() {
        let html = render_markdown("<script>alert(1)</script>\n");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_render_plain_text() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("README.rst");
        fs::write(&path, "Title\n=====\n<b>").unwrap();
        let rendered = render_file(&path, "README.rst").unwrap();
        assert_eq!(rendered.html, "<pre>Title\n=====\n&lt;b&gt;</pre>");
    }

    #[test]
    fn test_locate_readme() {
        let temp = TempDir::new().unwrap();
        assert_eq!(locate_readme(temp.path(), None), None);

        fs::write(temp.path().join("readme.md"), "x").unwrap();
        assert_eq!(
            locate_readme(temp.path(), None),
            Some(temp.path().join("readme.md"))
        );

        fs::write(temp.path().join("OVERVIEW.md"), "x").unwrap();
        assert_eq!(
            locate_readme(temp.path(), Some("OVERVIEW.md")),
            Some(temp.path().join("OVERVIEW.md"))
        );
    }

    #[test]
    fn test_collect_collection_docs() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("README.md"), "# Collection").unwrap();
        fs::create_dir_all(temp.path().join("docs")).unwrap();
        fs::write(temp.path().join("docs/b.md"), "b").unwrap();
        fs::write(temp.path().join("docs/a.md"), "a").unwrap();
        fs::write(temp.path().join("docs/skip.txt"), "no").unwrap();

        let metadata = PackageMetadata::validate(
            &json!({
                "namespace": "ns", "name": "coll", "version": "1.0.0",
                "authors": ["me"], "readme": "README.md", "license": ["MIT"],
                "repository": "https://example.com"
            }),
            &ValidationPolicy::default(),
        )
        .unwrap();

        let docs = collect_collection_docs(temp.path(), &metadata).unwrap();
        let readme = docs.readme.unwrap();
        assert_eq!(readme.name, "README.md");
        assert!(readme.html.contains("<h1>Collection</h1>"));
        let names: Vec<_> = docs.documentation_files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a.md", "b.md"]);
    }

    #[test]
    fn test_doc_string_index() {
        let index = DocStringIndex::from_value(&json!({
            "module": {"ns.coll.my_module": {"doc": {"short_description": "Do it"}}},
            "lookup": "broken"
        }))
        .unwrap();
        assert!(index.get(ContentCategory::Module, "ns.coll.my_module").is_some());
        assert!(index.get(ContentCategory::Module, "ns.coll.other").is_none());
        assert!(index.get(ContentCategory::Lookup, "ns.coll.x").is_none());
        assert!(!index.is_empty());
    }

    #[test]
    fn test_normalize_doc_strings() {
        let raw = json!({
            "doc": {
                "short_description": "Do it",
                "options": {
                    "state": {"type": "str"},
                    "config": {
                        "type": "dict",
                        "suboptions": {"z": {"type": "int"}, "a": {"type": "str"}}
                    }
                }
            },
            "return": {"changed": {"type": "bool", "contains": {"inner": {"type": "str"}}}}
        });

        let normalized = normalize_doc_strings(&raw);
        let options = normalized["doc"]["options"].as_array().unwrap();
        assert_eq!(options[0]["name"], "config");
        assert_eq!(options[1]["name"], "state");
        assert_eq!(options[0]["suboptions"][0]["name"], "a");
        assert_eq!(options[0]["suboptions"][1]["name"], "z");
        assert_eq!(normalized["return"][0]["name"], "changed");
        assert_eq!(normalized["return"][0]["contains"][0]["name"], "inner");
        assert_eq!(normalized["doc"]["short_description"], "Do it");
    }

    #[test]
    fn test_normalize_argument_specs() {
        let raw = json!({
            "argument_specs": {
                "main": {"options": {"b": {"type": "str"}, "a": {"type": "int"}}}
            }
        });
        let normalized = normalize_argument_specs(&raw);
        let options = normalized["argument_specs"]["main"]["options"]
            .as_array()
            .unwrap();
        assert_eq!(options[0]["name"], "a");
        assert_eq!(options[1]["name"], "b");
    }
}
