//! Resolve a typed query against generated search indexes.
//!
//! Usage:
//!   doc-search --index html/search deque
//!   doc-search --mode substring --json errorinfo
//!   DOCSEARCH_INDEX=html/search doc-search --base-url https://docs.example.org/ DatabaseShard
//!
//! Without `--index` or `DOCSEARCH_INDEX` the binary walks up from the current
//! directory looking for a `search/searchdata.js`.

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use docsearch::config::parse_base_url;
use docsearch::{
    Hit, IndexRepository, LookupOptions, MatchMode, SearchConfig, group_hits_by_scope,
    init_logging, resolve_index_paths,
};
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "doc-search")]
#[command(about = "Look up symbols in generated documentation search indexes")]
struct Cli {
    /// Search index file or directory; repeatable.
    #[arg(long = "index", value_name = "PATH")]
    index: Vec<PathBuf>,
    /// Match mode: prefix (default) or substring.
    #[arg(long, value_parser = ["prefix", "substring"])]
    mode: Option<String>,
    /// Maximum number of results.
    #[arg(long)]
    limit: Option<usize>,
    /// Documentation root used to resolve internal links.
    #[arg(long = "base-url", value_name = "URL")]
    base_url: Option<String>,
    /// Emit a JSON array instead of grouped text.
    #[arg(long)]
    json: bool,
    /// Text typed into the search box.
    query: String,
}

#[derive(Serialize)]
struct JsonHit<'a> {
    #[serde(flatten)]
    hit: &'a Hit<'a>,
    name: String,
    link_kind: docsearch::LinkKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
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
    let config = SearchConfig::from_env()?;

    let mode = match cli.mode.as_deref() {
        Some(raw) => MatchMode::try_from(raw).map_err(|err| anyhow!(err))?,
        None => config.match_mode,
    };
    let base_url = match cli.base_url.as_deref() {
        Some(raw) => Some(parse_base_url(raw)?),
        None => config.base_url.clone(),
    };

    let mut repo = IndexRepository::default();
    for path in resolve_index_paths(&cli.index, &config)? {
        repo.load(&path)
            .with_context(|| format!("loading search index {}", path.display()))?;
    }

    let options = LookupOptions {
        mode,
        limit: cli.limit,
    };
    let hits = repo.lookup(&cli.query, &options);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if cli.json {
        let rows: Vec<JsonHit<'_>> = hits
            .iter()
            .map(|hit| JsonHit {
                hit,
                name: hit.target.plain_name(),
                link_kind: hit.target.link_kind(),
                url: resolved_url(hit, base_url.as_ref()),
            })
            .collect();
        serde_json::to_writer_pretty(&mut out, &rows)?;
        writeln!(out)?;
        return Ok(());
    }

    if hits.is_empty() {
        writeln!(out, "no matches for '{}'", cli.query.trim())?;
        return Ok(());
    }
    for group in group_hits_by_scope(&hits) {
        let scope = docsearch::index::decode_html_entities(group.scope_label);
        writeln!(out, "{}", if scope.is_empty() { "(global)" } else { scope.as_str() })?;
        for target in group.targets {
            let link = base_url
                .as_ref()
                .and_then(|root| target.resolve(root))
                .map(String::from)
                .unwrap_or_else(|| target.href.clone());
            writeln!(out, "  {}  {}", target.plain_name(), link)?;
        }
    }
    Ok(())
}

fn resolved_url(hit: &Hit<'_>, base_url: Option<&Url>) -> Option<String> {
    base_url
        .and_then(|root| hit.target.resolve(root))
        .map(String::from)
}
