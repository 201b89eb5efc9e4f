//! Type definitions for collection metadata, content and import results

mod content_types;
mod manifest_types;
mod metadata_types;
mod result_types;

pub use content_types::*;
pub use manifest_types::*;
pub use metadata_types::*;
pub use result_types::*;
