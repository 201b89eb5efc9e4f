//! Readme command

use crate::cli::ReadmeArgs;
use anyhow::{Context, Result};
use galaxy_importer_collection::docs::render_file;

/// Render one README and print `{"name": ..., "html": ...}`
pub fn run(args: ReadmeArgs) -> Result<()> {
    let name = args.path.file_name().unwrap_or(args.path.as_str());
    let rendered = render_file(args.path.as_std_path(), name)
        .with_context(|| format!("Failed to render {}", args.path))?;
    println!("{}", serde_json::to_string(&rendered)?);
    Ok(())
}
