//! Environment-driven defaults for the binaries.
//!
//! Flags always win over the environment; the environment wins over the
//! built-in defaults. Values are read through a lookup function so callers
//! (and tests) can supply their own source instead of the process env.

use crate::index::MatchMode;
use crate::split_list;
use anyhow::{Result, anyhow};
use std::env;
use std::path::PathBuf;
use url::Url;

pub const ENV_INDEX: &str = "DOCSEARCH_INDEX";
pub const ENV_MATCH_MODE: &str = "DOCSEARCH_MATCH_MODE";
pub const ENV_BASE_URL: &str = "DOCSEARCH_BASE_URL";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchConfig {
    pub index_paths: Vec<PathBuf>,
    pub match_mode: MatchMode,
    pub base_url: Option<Url>,
}

impl SearchConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let index_paths = non_empty(ENV_INDEX)
            .map(|raw| split_list(&raw).into_iter().map(PathBuf::from).collect())
            .unwrap_or_default();

        let match_mode = match non_empty(ENV_MATCH_MODE) {
            Some(raw) => MatchMode::try_from(raw.as_str())
                .map_err(|err| anyhow!("{ENV_MATCH_MODE}: {err}"))?,
            None => MatchMode::default(),
        };

        let base_url = non_empty(ENV_BASE_URL)
            .map(|raw| parse_base_url(&raw))
            .transpose()
            .map_err(|err| anyhow!("{ENV_BASE_URL}: {err}"))?;

        Ok(Self {
            index_paths,
            match_mode,
            base_url,
        })
    }
}

/// Parse a documentation root, making sure it ends in `/` so relative links
/// join beneath it rather than replacing its last segment.
pub fn parse_base_url(raw: &str) -> Result<Url, crate::IndexError> {
    let trimmed = raw.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    Url::parse(&with_slash).map_err(|source| crate::IndexError::InvalidBaseUrl {
        url: trimmed.to_string(),
        source,
    })
}
