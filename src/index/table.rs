//! Loaded search table with prefix and substring lookup.
//!
//! The table keeps entries in file order and derives a key-sorted permutation
//! so prefix queries are answered by binary search. Results are always
//! reported in file order, which is the order the generator intends them to
//! be displayed in. Nothing is mutated after load; a table can be shared
//! across threads freely.

use crate::error::{IndexError, IndexResult};
use crate::index::key::{normalize_prefix, normalize_query, unescape_key};
use crate::index::model::{Entry, LinkKind, Target};
use crate::source::{parse_search_json, parse_search_script};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tracing::{debug, trace, warn};

/// How a query is compared against keys.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Key starts with the query. Matches the generator's own search box.
    #[default]
    Prefix,
    /// Query appears anywhere in the decoded key.
    Substring,
}

impl MatchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchMode::Prefix => "prefix",
            MatchMode::Substring => "substring",
        }
    }
}

impl TryFrom<&str> for MatchMode {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "prefix" => Ok(MatchMode::Prefix),
            "substring" | "contains" => Ok(MatchMode::Substring),
            other => Err(format!(
                "unknown match mode '{other}' (expected prefix or substring)"
            )),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LookupOptions {
    pub mode: MatchMode,
    /// Maximum number of targets returned; `None` means unbounded.
    pub limit: Option<usize>,
}

/// Counts reported by `index-check`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TableStats {
    pub entries: usize,
    pub targets: usize,
    pub external_links: usize,
    pub internal_links: usize,
    pub duplicate_keys: usize,
}

#[derive(Debug, Clone, Default)]
pub struct IndexTable {
    entries: Vec<Entry>,
    decoded: Vec<String>,
    by_key: Vec<usize>,
}

impl IndexTable {
    /// Load a generator script (`var searchData = [...]`) or a bare literal.
    pub fn load(source: &str) -> IndexResult<Self> {
        let value = parse_search_script(source)?;
        Self::from_value(&value)
    }

    pub fn load_json(source: &str) -> IndexResult<Self> {
        let value = parse_search_json(source)?;
        Self::from_value(&value)
    }

    /// Load a file from disk; `.json` files are read as JSON, anything else
    /// as a generator script.
    pub fn load_path(path: &Path) -> IndexResult<Self> {
        let text = fs::read_to_string(path).map_err(|source| IndexError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let table = if is_json {
            Self::load_json(&text)?
        } else {
            Self::load(&text)?
        };
        debug!(
            path = %path.display(),
            entries = table.len(),
            "loaded search index"
        );
        Ok(table)
    }

    /// Build a table from an already parsed value. Fails on the first
    /// malformed row.
    pub fn from_value(value: &Value) -> IndexResult<Self> {
        let rows = value.as_array().ok_or_else(|| IndexError::MalformedData {
            entry: 0,
            reason: "search data is not an array of entries".to_string(),
        })?;
        let entries = rows
            .iter()
            .enumerate()
            .map(|(position, row)| Entry::from_value(position, row))
            .collect::<IndexResult<Vec<_>>>()?;
        Ok(Self::from_entries(entries))
    }

    fn from_entries(entries: Vec<Entry>) -> Self {
        let decoded = entries.iter().map(Entry::decoded_key).collect();
        let mut by_key: Vec<usize> = (0..entries.len()).collect();
        by_key.sort_by(|&a, &b| entries[a].key.cmp(&entries[b].key).then(a.cmp(&b)));
        let table = Self {
            entries,
            decoded,
            by_key,
        };
        let duplicates = table.duplicate_keys();
        if duplicates > 0 {
            warn!(duplicates, "search index contains duplicate keys");
        }
        table
    }

    /// Append another table's entries after this one's.
    pub fn merge(self, other: IndexTable) -> Self {
        let mut entries = self.entries;
        entries.extend(other.entries);
        Self::from_entries(entries)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// First entry whose key equals the normalized query.
    pub fn entry(&self, key: &str) -> Option<&Entry> {
        let key = normalize_query(key);
        let start = self
            .by_key
            .partition_point(|&idx| self.entries[idx].key.as_str() < key.as_str());
        self.by_key
            .get(start)
            .map(|&idx| &self.entries[idx])
            .filter(|entry| entry.key == key)
    }

    /// Prefix lookup with default options.
    pub fn lookup(&self, query: &str) -> Vec<&Target> {
        self.lookup_with(query, &LookupOptions::default())
    }

    pub fn lookup_with(&self, query: &str, options: &LookupOptions) -> Vec<&Target> {
        let normalized = match options.mode {
            MatchMode::Prefix => normalize_prefix(query),
            MatchMode::Substring => normalize_query(query),
        };
        if normalized.is_empty() {
            return Vec::new();
        }
        let matched = match options.mode {
            MatchMode::Prefix => {
                let mut matched = self.prefix_matches(&normalized);
                // A query already typed in key form is also tried verbatim.
                let raw = query.trim().to_lowercase();
                if raw != normalized {
                    matched.extend(self.prefix_matches(&raw));
                    matched.sort_unstable();
                    matched.dedup();
                }
                matched
            }
            MatchMode::Substring => self.substring_matches(&unescape_key(&normalized)),
        };
        trace!(
            query = %normalized,
            mode = options.mode.as_str(),
            entries = matched.len(),
            "lookup"
        );
        let targets = matched
            .into_iter()
            .flat_map(|idx| self.entries[idx].targets.iter());
        match options.limit {
            Some(limit) => targets.take(limit).collect(),
            None => targets.collect(),
        }
    }

    fn prefix_matches(&self, prefix: &str) -> Vec<usize> {
        let start = self
            .by_key
            .partition_point(|&idx| self.entries[idx].key.as_str() < prefix);
        let mut matched: Vec<usize> = self.by_key[start..]
            .iter()
            .copied()
            .take_while(|&idx| self.entries[idx].key.starts_with(prefix))
            .collect();
        matched.sort_unstable();
        matched
    }

    fn substring_matches(&self, needle: &str) -> Vec<usize> {
        self.decoded
            .iter()
            .enumerate()
            .filter(|(_, decoded)| decoded.contains(needle))
            .map(|(idx, _)| idx)
            .collect()
    }

    pub fn duplicate_keys(&self) -> usize {
        self.by_key
            .windows(2)
            .filter(|pair| self.entries[pair[0]].key == self.entries[pair[1]].key)
            .count()
    }

    pub fn stats(&self) -> TableStats {
        let mut stats = TableStats {
            entries: self.entries.len(),
            duplicate_keys: self.duplicate_keys(),
            ..TableStats::default()
        };
        for target in self.entries.iter().flat_map(|entry| &entry.targets) {
            stats.targets += 1;
            match target.link_kind() {
                LinkKind::External => stats.external_links += 1,
                LinkKind::Internal => stats.internal_links += 1,
            }
        }
        stats
    }

    /// Distinct scope labels in first-seen order.
    pub fn scopes(&self) -> Vec<&str> {
        let mut seen = BTreeSet::new();
        self.entries
            .iter()
            .flat_map(|entry| &entry.targets)
            .map(|target| target.scope_label.as_str())
            .filter(|scope| seen.insert(*scope))
            .collect()
    }
}

/// Targets sharing a scope label, as rendered by a result list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScopeGroup<'a> {
    pub scope_label: &'a str,
    pub targets: Vec<&'a Target>,
}

/// Group targets by scope label, keeping first-seen group order and the
/// original order inside each group.
pub fn group_by_scope<'a, I>(targets: I) -> Vec<ScopeGroup<'a>>
where
    I: IntoIterator<Item = &'a Target>,
{
    let mut groups: Vec<ScopeGroup<'a>> = Vec::new();
    for target in targets {
        match groups
            .iter_mut()
            .find(|group| group.scope_label == target.scope_label)
        {
            Some(group) => group.targets.push(target),
            None => groups.push(ScopeGroup {
                scope_label: &target.scope_label,
                targets: vec![target],
            }),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEQUE_FIXTURE: &str = r#"var searchData=
[
  ['default_5fsearcher_14089',['default_searcher',['http://en.cppreference.com/w/cpp/experimental/default_searcher.html',1,'std::experimental::default_searcher'],['http://en.cppreference.com/w/cpp/utility/functional/default_searcher.html',1,'std::default_searcher']]],
  ['deque_14102',['deque',['http://en.cppreference.com/w/cpp/container/deque.html',1,'std::pmr::deque'],['http://en.cppreference.com/w/cpp/container/deque.html',1,'std::deque&lt; T &gt;']]],
  ['deque_3c_20errorinfo_20_3e_14103',['deque&lt; ErrorInfo &gt;',['http://en.cppreference.com/w/cpp/container/deque.html',1,'std']]],
  ['debugsink_14077',['DebugSink',['../classripple_1_1DebugSink.html',1,'ripple']]]
];
"#;

    fn table() -> IndexTable {
        IndexTable::load(DEQUE_FIXTURE).expect("fixture loads")
    }

    #[test]
    fn prefix_lookup_returns_targets_in_table_order() {
        let table = table();
        let hits = table.lookup("deq");
        let scopes: Vec<_> = hits.iter().map(|t| t.scope_label.as_str()).collect();
        assert_eq!(scopes, vec!["std::pmr::deque", "std::deque&lt; T &gt;", "std"]);
    }

    #[test]
    fn prefixes_cut_inside_an_escape_still_match() {
        let table = table();
        for prefix in ["deque_", "deque_3", "deque_3c", "deque_3c_2", "DEQUE_3C_20ERRORINFO_"] {
            let scopes: Vec<_> = table
                .lookup(prefix)
                .iter()
                .map(|t| t.scope_label.as_str())
                .collect();
            assert_eq!(scopes, vec!["std"], "prefix {prefix}");
        }
        assert_eq!(table.lookup("default_").len(), 2);
        assert_eq!(table.lookup("default_5").len(), 2);
    }

    #[test]
    fn escaped_prefix_hits_come_back_in_table_order() {
        let table = IndexTable::load(r#"[["a_5fb", [["a_b", "a.html", "x"]]], ["a_5f", [["a_", "a2.html", "y"]]]]"#)
            .expect("fixture loads");
        let scopes: Vec<_> = table
            .lookup("a_5f")
            .iter()
            .map(|t| t.scope_label.as_str())
            .collect();
        assert_eq!(scopes, vec!["x", "y"]);
    }

    #[test]
    fn empty_and_unknown_queries_yield_nothing() {
        let table = table();
        assert!(table.lookup("").is_empty());
        assert!(table.lookup("   ").is_empty());
        assert!(table.lookup("notakey").is_empty());
    }

    #[test]
    fn exact_key_lookup_includes_entry_targets() {
        let table = table();
        for entry in table.entries() {
            let hits = table.lookup(&entry.key);
            let expected: Vec<&Target> = entry.targets.iter().collect();
            let found = hits
                .windows(expected.len())
                .any(|window| window == expected.as_slice());
            assert!(found, "lookup({}) missing its targets", entry.key);
        }
    }

    #[test]
    fn decoded_query_matches_escaped_key() {
        let table = table();
        let hits = table.lookup("deque< Error");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].plain_name(), "deque< ErrorInfo >");
    }

    #[test]
    fn no_match_spans_key_boundaries() {
        let table = table();
        assert!(table.lookup("dequedebug").is_empty());
    }

    #[test]
    fn substring_mode_searches_inside_keys() {
        let table = table();
        let options = LookupOptions {
            mode: MatchMode::Substring,
            limit: None,
        };
        assert!(table.lookup("errorinfo").is_empty());
        let hits = table.lookup_with("errorinfo", &options);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].scope_label, "std");
        // Escape digits never match as text.
        assert!(table.lookup_with("3c", &options).is_empty());
    }

    #[test]
    fn limit_caps_target_count() {
        let table = table();
        let options = LookupOptions {
            mode: MatchMode::Prefix,
            limit: Some(2),
        };
        assert_eq!(table.lookup_with("de", &options).len(), 2);
    }

    #[test]
    fn entry_resolves_exact_key() {
        let table = table();
        let entry = table.entry("Default_Searcher").expect("entry present");
        assert_eq!(entry.serial, Some(14089));
        assert_eq!(entry.targets.len(), 2);
        assert!(table.entry("default").is_none());
    }

    #[test]
    fn malformed_row_fails_whole_load() {
        let text = "var searchData=[['ok_1',['ok',['ok.html',1,'']]],['bad_2',['bad',[1,'std']]]];";
        let err = IndexTable::load(text).unwrap_err();
        match err {
            IndexError::MalformedData { entry, .. } => assert_eq!(entry, 1),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn non_array_document_is_malformed() {
        assert!(IndexTable::load_json(r#"{"deque": []}"#).unwrap_err().is_malformed());
    }

    #[test]
    fn duplicate_keys_are_kept_and_counted() {
        let text = "[['a_1',['a',['a.html',1,'x']]],['a_2',['A',['b.html',1,'y']]]]";
        let table = IndexTable::load(text).unwrap();
        assert_eq!(table.duplicate_keys(), 1);
        let hits = table.lookup("a");
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].href, "a.html");
    }

    #[test]
    fn stats_count_link_kinds() {
        let stats = table().stats();
        assert_eq!(stats.entries, 4);
        assert_eq!(stats.targets, 6);
        assert_eq!(stats.external_links, 5);
        assert_eq!(stats.internal_links, 1);
    }

    #[test]
    fn merge_appends_in_order() {
        let first = IndexTable::load("[['b_1',['b',['b.html',1,'']]]]").unwrap();
        let second = IndexTable::load("[['a_2',['a',['a.html',1,'']]]]").unwrap();
        let merged = first.merge(second);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.entries()[0].key, "b");
        assert_eq!(merged.lookup("a")[0].href, "a.html");
    }

    #[test]
    fn groups_by_scope_in_first_seen_order() {
        let table = table();
        let groups = group_by_scope(table.lookup("de"));
        let labels: Vec<_> = groups.iter().map(|g| g.scope_label).collect();
        assert_eq!(
            labels,
            vec![
                "std::experimental::default_searcher",
                "std::default_searcher",
                "std::pmr::deque",
                "std::deque&lt; T &gt;",
                "std",
                "ripple",
            ]
        );
    }

    #[test]
    fn scopes_are_distinct() {
        let text = "[['a_1',['a',['a.html',1,'x'],['b.html',1,'x']]],['b_2',['b',['c.html',1,'y']]]]";
        let table = IndexTable::load(text).unwrap();
        assert_eq!(table.scopes(), vec!["x", "y"]);
    }
}
