//! Collection import pipeline
//!
//! This crate handles:
//! - Safe extraction of collection archives
//! - MANIFEST.json and FILES.json validation
//! - Content discovery and per-type loading
//! - Documentation rendering
//! - Optional ansible-lint runs
//! - Assembly of the import result

pub mod assembler;
pub mod docs;
pub mod extract;
pub mod finder;
pub mod importer;
pub mod integrity;
pub mod loaders;
pub mod manifest;
pub mod runtime;
pub mod tools;

pub use assembler::ResultAssembler;
pub use docs::{CollectionDocs, DocStringIndex};
pub use extract::{extract_archive, ArchiveExtractor, ExtractLimits, ExtractionFilter};
pub use finder::ContentFinder;
pub use importer::{CollectionImporter, ImportOptions};
pub use integrity::IntegrityChecker;
pub use loaders::{loader_for, ContentLoader, LoadContext};
pub use manifest::{load_manifest, CollectionFilename};
pub use runtime::{load_runtime, RuntimeMetadata};
pub use tools::{run_linter, ExternalTool};
