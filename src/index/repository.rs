//! Registry of search tables keyed by section.
//!
//! The generator splits its index into `<section>_<n>.js` files (for example
//! `classes_0.js` .. `classes_f.js`). The repository merges the files of one
//! section in load order and searches all sections together.

use crate::error::{IndexError, IndexResult};
use crate::index::model::Target;
use crate::index::table::{IndexTable, LookupOptions, ScopeGroup, group_by_scope};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Support scripts that live next to the data files but hold no entries.
const SUPPORT_SCRIPTS: &[&str] = &["search", "searchdata", "search_l10n"];

#[derive(Debug, Default, Clone)]
pub struct IndexRepository {
    sections: BTreeMap<String, IndexTable>,
}

/// One lookup result tagged with the section it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Hit<'a> {
    pub section: &'a str,
    #[serde(flatten)]
    pub target: &'a Target,
}

impl IndexRepository {
    /// Register a table; tables of the same section are appended in order.
    pub fn register(&mut self, section: &str, table: IndexTable) {
        let merged = match self.sections.remove(section) {
            Some(existing) => existing.merge(table),
            None => table,
        };
        self.sections.insert(section.to_string(), merged);
    }

    /// Load one data file and register it under the section named by the
    /// file. Returns the section name.
    pub fn load_file(&mut self, path: &Path) -> IndexResult<String> {
        let section = section_from_path(path);
        let table = IndexTable::load_path(path)?;
        self.register(&section, table);
        Ok(section)
    }

    /// Load every data file in a directory, in sorted file-name order.
    ///
    /// All files are parsed before any is registered so a malformed file
    /// leaves the repository untouched.
    pub fn load_dir(&mut self, dir: &Path) -> IndexResult<usize> {
        let files = data_files(dir)?;
        let mut loaded = Vec::with_capacity(files.len());
        for path in &files {
            loaded.push((section_from_path(path), IndexTable::load_path(path)?));
        }
        let count = loaded.len();
        for (section, table) in loaded {
            self.register(&section, table);
        }
        debug!(dir = %dir.display(), files = count, "loaded search index directory");
        Ok(count)
    }

    /// Load a file or a directory.
    pub fn load(&mut self, path: &Path) -> IndexResult<()> {
        if path.is_dir() {
            self.load_dir(path).map(|_| ())
        } else {
            self.load_file(path).map(|_| ())
        }
    }

    pub fn section(&self, name: &str) -> Option<&IndexTable> {
        self.sections.get(name)
    }

    /// Section names in stable order.
    pub fn sections(&self) -> impl Iterator<Item = (&str, &IndexTable)> {
        self.sections
            .iter()
            .map(|(name, table)| (name.as_str(), table))
    }

    pub fn is_empty(&self) -> bool {
        self.sections.values().all(IndexTable::is_empty)
    }

    /// Search every section; the limit applies to the combined result.
    pub fn lookup(&self, query: &str, options: &LookupOptions) -> Vec<Hit<'_>> {
        let mut hits = Vec::new();
        for (section, table) in &self.sections {
            let remaining = options.limit.map(|limit| limit.saturating_sub(hits.len()));
            if remaining == Some(0) {
                break;
            }
            let section_options = LookupOptions {
                mode: options.mode,
                limit: remaining,
            };
            hits.extend(
                table
                    .lookup_with(query, &section_options)
                    .into_iter()
                    .map(|target| Hit {
                        section: section.as_str(),
                        target,
                    }),
            );
        }
        hits
    }
}

/// Section name for a data file: `classes_4.js` -> `classes`.
pub fn section_from_path(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    match stem.rsplit_once('_') {
        Some((head, tail))
            if !head.is_empty()
                && (1..=2).contains(&tail.len())
                && tail.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')) =>
        {
            head.to_string()
        }
        _ => stem,
    }
}

fn data_files(dir: &Path) -> IndexResult<Vec<PathBuf>> {
    let io_err = |source| IndexError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if !path.is_file() {
            continue;
        }
        let is_data = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| matches!(ext, "js" | "json"));
        let is_support = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .is_some_and(|stem| SUPPORT_SCRIPTS.contains(&stem));
        if is_data && !is_support {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Group hits by scope label in first-seen order.
pub fn group_hits_by_scope<'a>(hits: &[Hit<'a>]) -> Vec<ScopeGroup<'a>> {
    group_by_scope(hits.iter().map(|hit| hit.target))
}
