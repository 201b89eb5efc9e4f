//! Common test utilities for galaxy-importer-collection
//!
//! This module provides shared test infrastructure including:
//! - Collection tree builders with computed FILES.json digests
//! - Archive builders, including members a normal tar writer refuses

#![allow(dead_code)]
#![allow(unused_imports)]

pub mod archive;
pub mod builders;

pub use archive::*;
pub use builders::*;
