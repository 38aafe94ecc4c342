//! Search index wiring.
//!
//! This module wraps the generator's search-data files (for example
//! `html/search/classes_4.js`) so callers can load a validated, read-only
//! snapshot and resolve typed queries to documentation links. Types here
//! mirror the tuple layout of the files; callers use `IndexTable` for one
//! file and `IndexRepository` when a whole `search/` directory is loaded.

pub mod key;
pub mod model;
pub mod repository;
pub mod table;

pub use key::{escape_key, normalize_prefix, normalize_query, split_serial, unescape_key};
pub use model::{Entry, LinkKind, Target, decode_html_entities};
pub use repository::{Hit, IndexRepository, group_hits_by_scope, section_from_path};
pub use table::{
    IndexTable, LookupOptions, MatchMode, ScopeGroup, TableStats, group_by_scope,
};

/// Directory, relative to the generated HTML root, that holds the index.
pub const SEARCH_DIR: &str = "search";

/// File the generator always writes next to the data files.
pub const SEARCH_SENTINEL: &str = "searchdata.js";
