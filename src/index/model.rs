//! Entry and target types mirrored from the generator's tuple layout.

use crate::error::{IndexError, IndexResult};
use crate::index::key::{normalize_query, split_serial, unescape_key};
use serde::Serialize;
use serde_json::Value;
use url::Url;

/// Whether a link leaves the generated site.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    /// Absolute URL, e.g. a standard-library reference page.
    External,
    /// Relative link into the generated class/struct pages.
    Internal,
}

/// One documentation link attached to a search key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Target {
    pub display_name: String,
    pub href: String,
    pub scope_label: String,
    pub parent_frame: bool,
}

impl Target {
    pub fn link_kind(&self) -> LinkKind {
        let lower = self.href.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("//")
        {
            LinkKind::External
        } else {
            LinkKind::Internal
        }
    }

    /// Display name with HTML entities decoded (`deque&lt; T &gt;` -> `deque< T >`).
    pub fn plain_name(&self) -> String {
        decode_html_entities(&self.display_name)
    }

    pub fn plain_scope(&self) -> String {
        decode_html_entities(&self.scope_label)
    }

    /// Resolve the link against the documentation root.
    ///
    /// Generated links are relative to the `search/` directory, so a leading
    /// `../` is dropped before joining. External links are returned as-is.
    pub fn resolve(&self, docs_root: &Url) -> Option<Url> {
        match self.link_kind() {
            LinkKind::External => Url::parse(&self.href)
                .or_else(|_| docs_root.join(&self.href))
                .ok(),
            LinkKind::Internal => {
                let relative = self.href.strip_prefix("../").unwrap_or(&self.href);
                docs_root.join(relative).ok()
            }
        }
    }
}

/// One row of an index table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub key: String,
    pub serial: Option<u64>,
    pub targets: Vec<Target>,
}

impl Entry {
    pub fn display_name(&self) -> &str {
        self.targets
            .first()
            .map(|t| t.display_name.as_str())
            .unwrap_or_default()
    }

    /// The key decoded back to lowercase text.
    pub fn decoded_key(&self) -> String {
        unescape_key(&self.key)
    }

    /// Build an entry from one parsed row.
    ///
    /// Accepts the generator layout `[key, [name, [href, flag, scope], ...]]`
    /// and the flattened `[key, [[name, href, scope], ...]]` layout. `position`
    /// is the zero-based row number used in error messages.
    pub(crate) fn from_value(position: usize, row: &Value) -> IndexResult<Self> {
        let fields = row
            .as_array()
            .ok_or_else(|| IndexError::malformed(position, "entry is not an array"))?;
        let raw_key = match fields.first() {
            Some(Value::String(key)) if !key.trim().is_empty() => key.trim(),
            Some(Value::String(_)) | None | Some(Value::Null) => {
                return Err(IndexError::malformed(position, "entry has no key"));
            }
            Some(_) => return Err(IndexError::malformed(position, "entry key is not a string")),
        };
        let body = fields
            .get(1)
            .and_then(Value::as_array)
            .ok_or_else(|| IndexError::malformed(position, format!("entry '{raw_key}' has no target list")))?;
        if fields.len() > 2 {
            return Err(IndexError::malformed(
                position,
                format!("entry '{raw_key}' has {} fields, expected 2", fields.len()),
            ));
        }

        // Only generator rows carry a serial; flattened keys are used verbatim.
        let (key, serial, targets) = match body.first() {
            Some(Value::String(name)) => {
                let (key, serial) = split_serial(raw_key);
                let targets = generator_targets(position, raw_key, name, &body[1..])?;
                (key, serial, targets)
            }
            Some(Value::Array(_)) => (raw_key, None, flattened_targets(position, raw_key, body)?),
            Some(_) => {
                return Err(IndexError::malformed(
                    position,
                    format!("entry '{raw_key}' has an invalid display name"),
                ));
            }
            None => {
                return Err(IndexError::malformed(
                    position,
                    format!("entry '{raw_key}' has no targets"),
                ));
            }
        };
        if targets.is_empty() {
            return Err(IndexError::malformed(
                position,
                format!("entry '{raw_key}' has no targets"),
            ));
        }

        Ok(Entry {
            key: normalize_query(key),
            serial,
            targets,
        })
    }
}

fn generator_targets(
    position: usize,
    raw_key: &str,
    name: &str,
    links: &[Value],
) -> IndexResult<Vec<Target>> {
    let display_name = require_name(position, raw_key, name)?;
    links
        .iter()
        .enumerate()
        .map(|(idx, link)| -> IndexResult<Target> {
            let parts = link.as_array().ok_or_else(|| {
                IndexError::malformed(position, format!("target {idx} of '{raw_key}' is not an array"))
            })?;
            let href = require_href(position, raw_key, idx, parts.first())?;
            let parent_frame = parse_flag(position, raw_key, idx, parts.get(1))?;
            let scope_label = optional_text(position, raw_key, idx, parts.get(2))?;
            Ok(Target {
                display_name: display_name.clone(),
                href,
                scope_label,
                parent_frame,
            })
        })
        .collect()
}

fn flattened_targets(position: usize, raw_key: &str, links: &[Value]) -> IndexResult<Vec<Target>> {
    links
        .iter()
        .enumerate()
        .map(|(idx, link)| -> IndexResult<Target> {
            let parts = link.as_array().ok_or_else(|| {
                IndexError::malformed(position, format!("target {idx} of '{raw_key}' is not an array"))
            })?;
            let name = match parts.first() {
                Some(Value::String(name)) => name.as_str(),
                _ => {
                    return Err(IndexError::malformed(
                        position,
                        format!("target {idx} of '{raw_key}' has no display name"),
                    ));
                }
            };
            Ok(Target {
                display_name: require_name(position, raw_key, name)?,
                href: require_href(position, raw_key, idx, parts.get(1))?,
                scope_label: optional_text(position, raw_key, idx, parts.get(2))?,
                parent_frame: true,
            })
        })
        .collect()
}

fn require_name(position: usize, raw_key: &str, name: &str) -> IndexResult<String> {
    if name.trim().is_empty() {
        return Err(IndexError::malformed(
            position,
            format!("entry '{raw_key}' has an empty display name"),
        ));
    }
    Ok(name.to_string())
}

fn require_href(position: usize, raw_key: &str, idx: usize, value: Option<&Value>) -> IndexResult<String> {
    match value {
        Some(Value::String(href)) if !href.trim().is_empty() => Ok(href.clone()),
        _ => Err(IndexError::malformed(
            position,
            format!("target {idx} of '{raw_key}' is missing its link"),
        )),
    }
}

fn parse_flag(position: usize, raw_key: &str, idx: usize, value: Option<&Value>) -> IndexResult<bool> {
    match value {
        None | Some(Value::Null) => Ok(true),
        Some(Value::Bool(flag)) => Ok(*flag),
        Some(Value::Number(n)) => Ok(n.as_f64().is_some_and(|v| v != 0.0)),
        Some(_) => Err(IndexError::malformed(
            position,
            format!("target {idx} of '{raw_key}' has a non-numeric link flag"),
        )),
    }
}

fn optional_text(position: usize, raw_key: &str, idx: usize, value: Option<&Value>) -> IndexResult<String> {
    match value {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(text)) => Ok(text.clone()),
        Some(_) => Err(IndexError::malformed(
            position,
            format!("target {idx} of '{raw_key}' has a non-string scope label"),
        )),
    }
}

/// Decode the handful of entities the generator emits.
pub fn decode_html_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let decoded = rest.find(';').and_then(|semi| {
            let entity = &rest[1..semi];
            let c = match entity {
                "lt" => Some('<'),
                "gt" => Some('>'),
                "amp" => Some('&'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                    .and_then(char::from_u32),
            };
            c.map(|c| (c, semi))
        });
        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &rest[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
