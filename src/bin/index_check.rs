//! Validate search index files and print a per-section summary.
//!
//! Usage:
//!   index-check html/search
//!   index-check html/search/classes_4.js html/search/functions_0.js
//!
//! Every path is loaded fail-fast; the first malformed file stops the run
//! with a non-zero exit status.

use anyhow::{Context, Result};
use clap::Parser;
use docsearch::{IndexRepository, TableStats, init_logging};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "index-check")]
#[command(about = "Validate generated search index files")]
struct Cli {
    /// Search index files or directories.
    #[arg(required = true, value_name = "PATH")]
    paths: Vec<PathBuf>,
}

#[derive(Serialize)]
struct Summary<'a> {
    sections: BTreeMap<&'a str, TableStats>,
    total: TableStats,
}

fn main() {
    init_logging();
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let mut repo = IndexRepository::default();
    for path in &cli.paths {
        repo.load(path)
            .with_context(|| format!("checking search index {}", path.display()))?;
    }

    let mut total = TableStats::default();
    let mut sections = BTreeMap::new();
    for (name, table) in repo.sections() {
        let stats = table.stats();
        total.entries += stats.entries;
        total.targets += stats.targets;
        total.external_links += stats.external_links;
        total.internal_links += stats.internal_links;
        total.duplicate_keys += stats.duplicate_keys;
        sections.insert(name, stats);
    }

    let summary = Summary { sections, total };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
