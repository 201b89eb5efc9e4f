//! The importable result document

use super::content_types::{ContentCategory, ContentRecord, RenderedFile};
use super::metadata_types::PackageMetadata;
use serde::Serialize;
use serde_json::Value;

/// Flat summary of one content unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentSummary {
    pub name: String,
    pub content_type: ContentCategory,
    pub description: Option<String>,
}

impl From<&ContentRecord> for ContentSummary {
    fn from(record: &ContentRecord) -> Self {
        Self {
            name: record.name.clone(),
            content_type: record.category,
            description: record.description.clone(),
        }
    }
}

/// Per-content documentation entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentDocs {
    pub content_name: String,
    pub content_type: ContentCategory,
    pub doc_strings: Option<Value>,
    pub readme_file: Option<String>,
    pub readme_html: Option<String>,
}

impl From<&ContentRecord> for ContentDocs {
    fn from(record: &ContentRecord) -> Self {
        Self {
            content_name: record.name.clone(),
            content_type: record.category,
            doc_strings: record.doc_strings.clone(),
            readme_file: record.readme.as_ref().map(|r| r.name.clone()),
            readme_html: record.readme.as_ref().map(|r| r.html.clone()),
        }
    }
}

/// Documentation bundle for the whole collection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocsBlob {
    /// Rendered collection readme
    pub collection_readme: RenderedFile,

    /// Rendered files from `docs/`
    pub documentation_files: Vec<RenderedFile>,

    /// Doc strings and readmes per content unit
    pub contents: Vec<ContentDocs>,
}

/// Result of importing one collection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportResult {
    /// Validated collection metadata, as declared in MANIFEST.json
    pub metadata: PackageMetadata,

    /// Documentation bundle, absent when docs generation is disabled
    pub docs_blob: Option<DocsBlob>,

    /// Content summaries in discovery order
    pub contents: Vec<ContentSummary>,

    /// `requires_ansible` from meta/runtime.yml
    pub requires_ansible: Option<String>,
}
