//! # galaxy-importer-core
//!
//! Core library for galaxy-importer providing:
//! - The importer error taxonomy
//! - Configuration loading (galaxy-importer.cfg)
//! - JSON Schema validation of bundled descriptors
//! - Type definitions for collection metadata, content and import results
//! - Naming, tag, version range and SPDX license rules

pub mod config;
pub mod error;
pub mod names;
pub mod schema;
pub mod spdx;
pub mod types;

pub use config::{ConfigLoader, ImporterConfig};
pub use error::{Error, Result};
pub use schema::SchemaValidator;
