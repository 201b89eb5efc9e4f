//! Import command

use crate::cli::ImportArgs;
use crate::output;
use crate::source::{download, ImportSource};
use anyhow::{Context, Result};
use camino::Utf8Path;
use galaxy_importer_collection::{CollectionImporter, DocStringIndex, ImportOptions};
use galaxy_importer_core::types::ImportResult;
use galaxy_importer_core::ImporterConfig;
use std::fs;

pub async fn run(args: ImportArgs, mut config: ImporterConfig) -> Result<()> {
    if args.no_docs {
        config.generate_docs = false;
    }
    if args.no_lint {
        config.run_ansible_lint = false;
    }

    let mut options = ImportOptions::default();
    if let Some(path) = &args.doc_strings {
        let index = DocStringIndex::from_file(path.as_std_path())
            .with_context(|| format!("Failed to load doc strings from {}", path))?;
        options.doc_strings = Some(index);
    }

    let source = ImportSource::parse(&args.source)?;
    let importer = CollectionImporter::new(&config)?;

    let result = match source {
        ImportSource::Directory(dir) => importer.import_directory(dir.as_std_path(), &options),
        ImportSource::Archive(path) => importer.import_archive(path.as_std_path(), &options),
        ImportSource::Url(url) => {
            let download_dir = importer.scratch_dir()?;
            let dir = Utf8Path::from_path(download_dir.path())
                .context("Scratch directory path is not valid UTF-8")?;
            let archive = download(&url, dir, config.max_download_bytes).await?;
            importer.import_archive(archive.as_std_path(), &options)
        }
    }
    .with_context(|| format!("Failed to import {}", args.source))?;

    write_result(&result, args.output.as_deref(), args.pretty)?;
    output::success(&format!(
        "Imported {} {} ({} content items)",
        result.metadata.fqcn(),
        result.metadata.version(),
        result.contents.len()
    ));
    Ok(())
}

/// Print the result JSON or write it to `output`
fn write_result(result: &ImportResult, output: Option<&Utf8Path>, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };

    match output {
        Some(path) => {
            fs::write(path, format!("{}\n", json))
                .with_context(|| format!("Failed to write {}", path))?;
            output::info(&format!("Result written to {}", path));
        }
        None => println!("{}", json),
    }
    Ok(())
}
