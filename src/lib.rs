pub mod config;
pub mod error;
pub mod index;
pub mod source;

pub use config::SearchConfig;
pub use error::{IndexError, IndexResult};
pub use index::{
    Entry, Hit, IndexRepository, IndexTable, LinkKind, LookupOptions, MatchMode, ScopeGroup,
    TableStats, Target, group_by_scope, group_hits_by_scope,
};

use anyhow::{Result, bail};
use index::{SEARCH_DIR, SEARCH_SENTINEL};
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use tracing_subscriber::EnvFilter;

fn is_search_dir(candidate: &Path) -> bool {
    candidate.join(SEARCH_SENTINEL).is_file()
}

/// Accept either the `search/` directory itself or a generated HTML root
/// that contains one.
fn search_dir_from_hint(hint: &Path) -> Option<PathBuf> {
    if is_search_dir(hint) {
        return fs::canonicalize(hint).ok();
    }
    let nested = hint.join(SEARCH_DIR);
    if is_search_dir(&nested) {
        return fs::canonicalize(nested).ok();
    }
    None
}

fn search_upwards(start: &Path) -> Option<PathBuf> {
    let mut dir = fs::canonicalize(start).ok()?;
    loop {
        if let Some(found) = search_dir_from_hint(&dir) {
            return Some(found);
        }
        if !dir.pop() {
            break;
        }
    }
    None
}

/// Locate a generated search directory starting from `start` and walking up
/// through its parents. Checks `<dir>/searchdata.js`, then
/// `<dir>/search/searchdata.js`, at each level.
pub fn find_search_dir(start: &Path) -> Result<PathBuf> {
    if let Some(found) = search_upwards(start) {
        return Ok(found);
    }
    bail!(
        "Unable to locate a search index under {} or its parents. Pass --index or set {}.",
        start.display(),
        config::ENV_INDEX
    );
}

/// Decide which index paths to load: flags, then the environment, then a
/// search directory discovered from the current directory.
pub fn resolve_index_paths(cli_paths: &[PathBuf], config: &SearchConfig) -> Result<Vec<PathBuf>> {
    if !cli_paths.is_empty() {
        return Ok(cli_paths.to_vec());
    }
    if !config.index_paths.is_empty() {
        return Ok(config.index_paths.clone());
    }
    let cwd = env::current_dir()?;
    Ok(vec![find_search_dir(&cwd)?])
}

pub fn split_list(value: &str) -> Vec<String> {
    value
        .replace(',', " ")
        .split_whitespace()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Install the stderr log subscriber used by the binaries. `RUST_LOG`
/// overrides the `warn` default.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn finds_search_dir_from_html_root() {
        let temp = TempDir::new().unwrap();
        let search = temp.path().join("html").join(SEARCH_DIR);
        fs::create_dir_all(&search).unwrap();
        fs::write(search.join(SEARCH_SENTINEL), "var indexSectionsWithContent = [];\n").unwrap();

        let found = find_search_dir(&temp.path().join("html")).unwrap();
        assert_eq!(found, fs::canonicalize(&search).unwrap());
    }

    #[test]
    fn finds_search_dir_from_nested_child() {
        let temp = TempDir::new().unwrap();
        let search = temp.path().join(SEARCH_DIR);
        let child = temp.path().join("classes").join("deep");
        fs::create_dir_all(&search).unwrap();
        fs::create_dir_all(&child).unwrap();
        fs::write(search.join(SEARCH_SENTINEL), "").unwrap();

        let found = find_search_dir(&child).unwrap();
        assert_eq!(found, fs::canonicalize(&search).unwrap());
    }

    #[test]
    fn flags_override_env_paths() {
        let config = SearchConfig {
            index_paths: vec![PathBuf::from("from-env")],
            ..SearchConfig::default()
        };
        let flags = vec![PathBuf::from("from-flag")];
        assert_eq!(resolve_index_paths(&flags, &config).unwrap(), flags);
        assert_eq!(
            resolve_index_paths(&[], &config).unwrap(),
            vec![PathBuf::from("from-env")]
        );
    }

    #[test]
    fn split_list_accepts_commas_and_spaces() {
        assert_eq!(split_list("a, b  c,,"), vec!["a", "b", "c"]);
    }
}
