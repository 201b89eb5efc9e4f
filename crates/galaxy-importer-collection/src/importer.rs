//! The import pipeline
//!
//! [`CollectionImporter`] drives every stage for one collection:
//! extraction, manifest validation, integrity checks, runtime descriptor,
//! linting, docs, content discovery and loading, and result assembly.
//! Extraction, validation and integrity failures abort the import; linter
//! problems are only logged.

use crate::assembler::ResultAssembler;
use crate::docs::{collect_collection_docs, DocStringIndex};
use crate::extract::{ArchiveExtractor, ExtractLimits};
use crate::finder::ContentFinder;
use crate::integrity::IntegrityChecker;
use crate::loaders::{loader_for, LoadContext};
use crate::manifest::{load_manifest, CollectionFilename};
use crate::runtime::load_runtime;
use crate::tools::run_linter;
use galaxy_importer_core::types::ImportResult;
use galaxy_importer_core::{Error, ImporterConfig, Result, SchemaValidator};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tempfile::TempDir;
use tracing::{debug, info};

/// Per-import inputs that are not configuration
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Externally generated doc strings for plugins
    pub doc_strings: Option<DocStringIndex>,

    /// Identity the archive file name claims; checked against the manifest
    pub filename: Option<CollectionFilename>,
}

/// Imports collections with one configuration
pub struct CollectionImporter {
    config: ImporterConfig,
    schemas: SchemaValidator,
}

impl CollectionImporter {
    pub fn new(config: &ImporterConfig) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
            schemas: SchemaValidator::new()?,
        })
    }

    pub fn config(&self) -> &ImporterConfig {
        &self.config
    }

    /// Create the scratch directory an archive is extracted into
    pub fn scratch_dir(&self) -> Result<TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("galaxy-importer-");
        let dir = match &self.config.tmp_root_dir {
            Some(parent) => builder.tempdir_in(parent),
            None => builder.tempdir(),
        };
        dir.map_err(|e| Error::importer(format!("Failed to create scratch directory: {}", e)))
    }

    /// Import a `.tar.gz` collection archive
    ///
    /// When the file name has the `<namespace>-<name>-<version>.tar.gz`
    /// shape and `options.filename` is unset, the name is checked against
    /// the manifest.
    pub fn import_archive(&self, archive: &Path, options: &ImportOptions) -> Result<ImportResult> {
        info!("Importing collection archive {}", archive.display());
        let file = File::open(archive).map_err(|e| {
            Error::importer(format!("Failed to open archive {}: {}", archive.display(), e))
        })?;

        let mut options = options.clone();
        if options.filename.is_none() {
            options.filename = CollectionFilename::from_path(archive);
        }
        self.import_reader(file, &options)
    }

    /// Import a gzip-compressed tar stream
    pub fn import_reader<R: Read>(&self, reader: R, options: &ImportOptions) -> Result<ImportResult> {
        let scratch = self.scratch_dir()?;
        debug!("Scratch directory: {}", scratch.path().display());

        ArchiveExtractor::new(ExtractLimits::from(&self.config))
            .extract_from_reader(reader, scratch.path())?;

        self.import_directory(scratch.path(), options)
    }

    /// Import an already extracted collection
    pub fn import_directory(&self, root: &Path, options: &ImportOptions) -> Result<ImportResult> {
        info!("Getting collection metadata...");
        let manifest = load_manifest(root, &self.config.validation_policy())?;
        let metadata = &manifest.collection_info;

        if let Some(filename) = &options.filename {
            filename.check_against(metadata)?;
        }

        info!("Checking file integrity...");
        IntegrityChecker::new(self.config.check_checksums).check(root, &manifest)?;

        let runtime = load_runtime(root)?;

        run_linter(&self.config, root);

        let docs = if self.config.generate_docs {
            info!("Rendering collection documentation...");
            Some(collect_collection_docs(root, metadata)?)
        } else {
            None
        };

        info!("Finding content inside collection...");
        let ctx = LoadContext {
            root,
            metadata,
            doc_strings: options.doc_strings.as_ref(),
            schemas: &self.schemas,
            render_docs: self.config.generate_docs,
        };
        let records = ContentFinder::new(root).find().map(|found| {
            let content = found?;
            let loader = loader_for(content.category);
            info!("Loading {} {}", content.category, content.path_name());
            debug!("Using {} loader for {}", loader.name(), content.rel_path.display());
            loader.load(&content, &ctx)
        });

        let result = ResultAssembler::assemble(
            metadata.clone(),
            records,
            runtime.requires_ansible,
            docs,
        )?;

        info!(
            "Imported {} {} with {} content items",
            result.metadata.fqcn(),
            result.metadata.version(),
            result.contents.len()
        );
        Ok(result)
    }
}
