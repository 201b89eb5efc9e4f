//! Command implementations

pub mod import;
pub mod readme;
pub mod version;
