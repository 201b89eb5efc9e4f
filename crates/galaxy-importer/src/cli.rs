//! CLI argument parsing with clap

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};

/// galaxy-importer - validate and import Ansible content collections
#[derive(Parser, Debug)]
#[command(name = "galaxy-importer")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a galaxy-importer.cfg file
    #[arg(short, long, global = true, env = "GALAXY_IMPORTER_CONFIG")]
    pub config: Option<Utf8PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Import a collection archive, directory or URL and print the result
    Import(ImportArgs),

    /// Render a README file to HTML
    Readme(ReadmeArgs),

    /// Show version information
    Version(VersionArgs),
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Collection `.tar.gz`, extracted directory or http(s) URL
    pub source: String,

    /// Write the result JSON to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<Utf8PathBuf>,

    /// JSON file of plugin doc strings keyed by category and FQCN
    #[arg(long)]
    pub doc_strings: Option<Utf8PathBuf>,

    /// Skip documentation rendering
    #[arg(long)]
    pub no_docs: bool,

    /// Skip ansible-lint
    #[arg(long)]
    pub no_lint: bool,

    /// Pretty-print the result JSON
    #[arg(long)]
    pub pretty: bool,
}

#[derive(Args, Debug)]
pub struct ReadmeArgs {
    /// README file to render
    pub path: Utf8PathBuf,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}
