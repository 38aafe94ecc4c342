//! Search-key escaping used by the documentation generator.
//!
//! Keys are lowercase; `[a-z0-9]` and non-ASCII characters are kept as-is,
//! every other byte becomes `_` followed by two lowercase hex digits
//! (`decay_t` -> `decay_5ft`, `deque< T >` -> `deque_3c_20t_20_3e`). Raw ids
//! in index files additionally carry a `_<serial>` suffix.

/// Escape arbitrary text into key form.
pub fn escape_key(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars().flat_map(char::to_lowercase) {
        push_escaped(&mut out, c);
    }
    out
}

/// Normalize a user query into key form.
///
/// Like [`escape_key`], except that an existing `_hh` escape is passed
/// through, so normalizing an already escaped key returns it unchanged.
pub fn normalize_query(query: &str) -> String {
    escape_lowered(&query.trim().to_lowercase())
}

fn escape_lowered(lowered: &str) -> String {
    let mut out = String::with_capacity(lowered.len());
    let mut chars = lowered.char_indices();
    while let Some((idx, c)) = chars.next() {
        if c == '_' && is_escape_at(lowered, idx) {
            out.push_str(&lowered[idx..idx + 3]);
            chars.next();
            chars.next();
            continue;
        }
        push_escaped(&mut out, c);
    }
    out
}

/// Decode a key back to text. Malformed escapes are kept verbatim.
pub fn unescape_key(key: &str) -> String {
    let mut bytes = Vec::with_capacity(key.len());
    let raw = key.as_bytes();
    let mut i = 0;
    while i < raw.len() {
        if raw[i] == b'_' && is_escape_at(key, i) {
            if let Ok(byte) = u8::from_str_radix(&key[i + 1..i + 3], 16) {
                bytes.push(byte);
                i += 3;
                continue;
            }
        }
        bytes.push(raw[i]);
        i += 1;
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Split the generator's `_<digits>` serial off a raw id.
///
/// Generator ids always end in a serial, so the final all-digit segment is
/// taken as one. Only call this for rows in the generator layout.
pub fn split_serial(raw_id: &str) -> (&str, Option<u64>) {
    let Some((head, tail)) = raw_id.rsplit_once('_') else {
        return (raw_id, None);
    };
    if head.is_empty() || tail.is_empty() || !tail.bytes().all(|b| b.is_ascii_digit()) {
        return (raw_id, None);
    }
    match tail.parse::<u64>() {
        Ok(serial) => (head, Some(serial)),
        Err(_) => (raw_id, None),
    }
}

/// Normalize a query typed into a prefix search.
///
/// Same as [`normalize_query`], but a trailing `_` or `_h` is kept as the
/// start of an escape instead of being escaped itself, so a query cut off
/// in the middle of an escape still prefixes the key.
pub fn normalize_prefix(query: &str) -> String {
    let lowered = query.trim().to_lowercase();
    let bytes = lowered.as_bytes();
    let len = bytes.len();
    let partial = if bytes.last() == Some(&b'_') {
        1
    } else if len >= 2
        && bytes[len - 2] == b'_'
        && matches!(bytes[len - 1], b'0'..=b'9' | b'a'..=b'f')
    {
        2
    } else {
        0
    };
    let (head, tail) = lowered.split_at(len - partial);
    let mut out = escape_lowered(head);
    out.push_str(tail);
    out
}

fn push_escaped(out: &mut String, c: char) {
    if c.is_ascii_lowercase() || c.is_ascii_digit() || !c.is_ascii() {
        out.push(c);
    } else {
        out.push_str(&format!("_{:02x}", c as u32));
    }
}

fn is_escape_at(text: &str, idx: usize) -> bool {
    let bytes = text.as_bytes();
    bytes.get(idx) == Some(&b'_')
        && bytes
            .get(idx + 1..idx + 3)
            .is_some_and(|pair| pair.iter().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')))
}
