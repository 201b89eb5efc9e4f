//! Result assembly
//!
//! Pure aggregation of what earlier stages produced into one
//! [`ImportResult`]. No filesystem access happens here.

use crate::docs::CollectionDocs;
use galaxy_importer_core::types::{
    ContentDocs, ContentRecord, ContentSummary, DocsBlob, ImportResult, PackageMetadata,
};
use galaxy_importer_core::{Error, Result};

/// Builds the import result document
pub struct ResultAssembler;

impl ResultAssembler {
    /// Merge metadata, content records and docs
    ///
    /// `docs` is `None` when documentation generation is disabled. When it
    /// is enabled a collection readme is mandatory.
    pub fn assemble<I>(
        metadata: PackageMetadata,
        records: I,
        requires_ansible: Option<String>,
        docs: Option<CollectionDocs>,
    ) -> Result<ImportResult>
    where
        I: IntoIterator<Item = Result<ContentRecord>>,
    {
        let records = records.into_iter().collect::<Result<Vec<_>>>()?;
        let contents = records.iter().map(ContentSummary::from).collect();

        let docs_blob = match docs {
            None => None,
            Some(docs) => {
                let collection_readme = docs.readme.ok_or_else(|| Error::ReadmeNotFound {
                    looked_for: docs.looked_for.clone(),
                })?;
                Some(DocsBlob {
                    collection_readme,
                    documentation_files: docs.documentation_files,
                    contents: records.iter().map(ContentDocs::from).collect(),
                })
            }
        };

        Ok(ImportResult {
            metadata,
            docs_blob,
            contents,
            requires_ansible,
        })
    }
}
