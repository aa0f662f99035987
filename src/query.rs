//! Bracket-notation query string codec.
//!
//! The query portion of a URL decodes into a [`Query`]: a mapping from keys to
//! [`QueryValue`]s, where a value is a scalar string, a list of strings, or a
//! nested mapping.
//!
//! | Query string             | Decoded                     |
//! |--------------------------|-----------------------------|
//! | `format=grid`            | `{format: "grid"}`          |
//! | `a[b]=1&a[c][d]=2`       | `{a: {b: "1", c: {d: "2"}}}`|
//! | `tag[]=x&tag[]=y`        | `{tag: ["x", "y"]}`         |
//!
//! Decoding never fails. A key whose brackets cannot be parsed is stored as a
//! flat scalar under its full decoded key, and the remaining pairs are decoded
//! normally. Repeated non-array keys are last-write-wins.
//!
//! Encoding is the inverse. Keys are emitted in sorted order, structural
//! brackets stay literal, and everything else outside the RFC 3986 unreserved
//! set is percent-encoded.
//!
//! ```
//! use workflow_navigator::query::{decode, encode};
//!
//! let query = decode("?eventId=42&filter[status]=open&tag[]=a&tag[]=b");
//! assert_eq!(query.get_str("eventId"), Some("42"));
//! assert_eq!(encode(&query), "eventId=42&filter[status]=open&tag[]=a&tag[]=b");
//! ```

use crate::trace_log;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// A decoded query value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    /// Plain `key=value` entry.
    Scalar(String),
    /// Repeated `key[]=value` entries, in order of appearance.
    List(Vec<String>),
    /// `key[field]=...` entries. An empty field name has no bracket form
    /// (`key[]` is list syntax) and is skipped by [`encode`].
    Map(BTreeMap<String, QueryValue>),
}

impl QueryValue {
    /// The scalar string, if this is a scalar.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            QueryValue::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// The list items, if this is a list.
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            QueryValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// The nested mapping, if this is a mapping.
    pub fn as_map(&self) -> Option<&BTreeMap<String, QueryValue>> {
        match self {
            QueryValue::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Convert into a JSON value (strings, arrays of strings, objects).
    pub fn to_json(&self) -> Value {
        match self {
            QueryValue::Scalar(s) => Value::String(s.clone()),
            QueryValue::List(items) => {
                Value::Array(items.iter().cloned().map(Value::String).collect())
            }
            QueryValue::Map(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect::<Map<_, _>>(),
            ),
        }
    }

    /// Convert a JSON value into a query value.
    ///
    /// `null` has no query representation and yields `None`. Booleans and
    /// numbers are stringified, arrays become lists, objects become mappings.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Array(items) => Some(QueryValue::List(
                items.iter().filter_map(scalar_text).collect(),
            )),
            Value::Object(map) => Some(QueryValue::Map(
                map.iter()
                    .filter_map(|(k, v)| Some((k.clone(), QueryValue::from_json(v)?)))
                    .collect(),
            )),
            other => scalar_text(other).map(QueryValue::Scalar),
        }
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::Scalar(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        QueryValue::Scalar(value)
    }
}

impl From<Vec<String>> for QueryValue {
    fn from(value: Vec<String>) -> Self {
        QueryValue::List(value)
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        nested => Some(nested.to_string()),
    }
}

/// Whether a JSON value counts as "unset" when written into a query.
///
/// `null`, `false`, `0` and `""` are falsy. Arrays and objects never are.
///
/// ```
/// use serde_json::json;
/// use workflow_navigator::query::is_falsy;
///
/// assert!(is_falsy(&json!(false)));
/// assert!(is_falsy(&json!(0)));
/// assert!(is_falsy(&json!("")));
/// assert!(!is_falsy(&json!("false")));
/// ```
pub fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().map_or(false, |f| f == 0.0 || f.is_nan()),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Decoded query string.
///
/// Top-level keys are expected to be non-empty; an entry under `""` cannot be
/// written as `key=value` and is skipped by [`encode`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    entries: BTreeMap<String, QueryValue>,
}

impl Query {
    /// Create an empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a query string. Alias for [`decode`].
    pub fn parse(input: &str) -> Self {
        decode(input)
    }

    /// Get a value by top-level key.
    pub fn get(&self, key: &str) -> Option<&QueryValue> {
        self.entries.get(key)
    }

    /// Get a scalar value by top-level key.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.entries.get(key)?.as_str()
    }

    /// Get a scalar value and parse it as `T`.
    pub fn get_as<T>(&self, key: &str) -> Option<T>
    where
        T: std::str::FromStr,
    {
        self.get_str(key)?.parse().ok()
    }

    /// Insert or overwrite a top-level entry, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Option<QueryValue> {
        self.entries.insert(key.into(), value.into())
    }

    /// Set `key` from a loosely typed JSON value.
    ///
    /// Falsy values (see [`is_falsy`]) remove the key instead of storing a
    /// string like `"false"`.
    pub fn set_json(&mut self, key: impl Into<String>, value: &Value) {
        let key = key.into();
        if is_falsy(value) {
            self.entries.remove(&key);
            return;
        }
        match QueryValue::from_json(value) {
            Some(v) => {
                self.entries.insert(key, v);
            }
            None => {
                self.entries.remove(&key);
            }
        }
    }

    /// Remove a top-level entry.
    pub fn remove(&mut self, key: &str) -> Option<QueryValue> {
        self.entries.remove(key)
    }

    /// Return `true` if the key is present.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Iterate over top-level entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &QueryValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Return `true` if the query has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of top-level entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Encode without a leading `?`. Alias for [`encode`].
    pub fn to_query_string(&self) -> String {
        encode(self)
    }

    /// Encode with a leading `?`, or return an empty string for an empty query.
    pub fn to_search(&self) -> String {
        let encoded = encode(self);
        if encoded.is_empty() {
            encoded
        } else {
            format!("?{encoded}")
        }
    }

    /// The whole query as a JSON object.
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.entries
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode(self))
    }
}

impl<K, V> FromIterator<(K, V)> for Query
where
    K: Into<String>,
    V: Into<QueryValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

// ============================================================================
// Key parsing
// ============================================================================

/// A key that cannot be read as bracket notation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("malformed query key '{key}': {reason}")]
    MalformedKey { key: String, reason: &'static str },
}

/// One bracketed step of a query key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySegment {
    /// `[name]`
    Field(String),
    /// `[]`
    Push,
}

/// Split a raw (still percent-encoded) key into its base name and bracket path.
///
/// ```
/// use workflow_navigator::query::{parse_key, KeySegment};
///
/// let (base, path) = parse_key("filter[status][]").unwrap();
/// assert_eq!(base, "filter");
/// assert_eq!(path, vec![KeySegment::Field("status".into()), KeySegment::Push]);
///
/// assert!(parse_key("filter[status").is_err());
/// ```
pub fn parse_key(raw: &str) -> Result<(String, Vec<KeySegment>), QueryError> {
    let malformed = |reason| QueryError::MalformedKey {
        key: raw.to_string(),
        reason,
    };

    let Some(open) = raw.find('[') else {
        if raw.contains(']') {
            return Err(malformed("unexpected ']'"));
        }
        return Ok((percent_decode(raw), Vec::new()));
    };

    let base = &raw[..open];
    if base.is_empty() {
        return Err(malformed("empty base name"));
    }
    if base.contains(']') {
        return Err(malformed("unexpected ']'"));
    }

    let mut segments = Vec::new();
    let mut rest = &raw[open..];
    while !rest.is_empty() {
        let Some(body) = rest.strip_prefix('[') else {
            return Err(malformed("text after closing bracket"));
        };
        let Some(close) = body.find(']') else {
            return Err(malformed("unclosed bracket"));
        };
        let inner = &body[..close];
        if inner.contains('[') {
            return Err(malformed("nested bracket"));
        }
        if matches!(segments.last(), Some(KeySegment::Push)) {
            return Err(malformed("'[]' must be the last segment"));
        }
        segments.push(if inner.is_empty() {
            KeySegment::Push
        } else {
            KeySegment::Field(percent_decode(inner))
        });
        rest = &body[close + 1..];
    }

    Ok((percent_decode(base), segments))
}

// ============================================================================
// Decode / encode
// ============================================================================

/// Decode a query string (with or without a leading `?`).
pub fn decode(input: &str) -> Query {
    let input = input.strip_prefix('?').unwrap_or(input);
    let mut query = Query::new();

    for pair in input.split('&') {
        if pair.is_empty() {
            continue;
        }
        let (raw_key, raw_value) = pair.split_once('=').unwrap_or((pair, ""));
        if raw_key.is_empty() {
            continue;
        }
        let value = percent_decode(raw_value);

        match parse_key(raw_key) {
            Ok((base, path)) => assign(&mut query.entries, base, &path, value),
            Err(err) => {
                trace_log!("{}; storing as flat key", err);
                query
                    .entries
                    .insert(percent_decode(raw_key), QueryValue::Scalar(value));
            }
        }
    }

    query
}

fn assign(
    map: &mut BTreeMap<String, QueryValue>,
    key: String,
    path: &[KeySegment],
    value: String,
) {
    match path.split_first() {
        None => {
            map.insert(key, QueryValue::Scalar(value));
        }
        Some((KeySegment::Push, _)) => {
            if let Some(QueryValue::List(items)) = map.get_mut(&key) {
                items.push(value);
                return;
            }
            map.insert(key, QueryValue::List(vec![value]));
        }
        Some((KeySegment::Field(field), rest)) => {
            let entry = map
                .entry(key)
                .or_insert_with(|| QueryValue::Map(BTreeMap::new()));
            if !matches!(entry, QueryValue::Map(_)) {
                *entry = QueryValue::Map(BTreeMap::new());
            }
            if let QueryValue::Map(inner) = entry {
                assign(inner, field.clone(), rest, value);
            }
        }
    }
}

/// Encode a query without the leading `?`. An empty query encodes to `""`.
pub fn encode(query: &Query) -> String {
    let mut pairs = Vec::new();
    for (key, value) in &query.entries {
        if key.is_empty() {
            trace_log!("Skipping query entry with empty key");
            continue;
        }
        encode_value(&percent_encode(key), value, &mut pairs);
    }
    pairs.join("&")
}

fn encode_value(prefix: &str, value: &QueryValue, out: &mut Vec<String>) {
    match value {
        QueryValue::Scalar(s) => out.push(format!("{prefix}={}", percent_encode(s))),
        QueryValue::List(items) => {
            for item in items {
                out.push(format!("{prefix}[]={}", percent_encode(item)));
            }
        }
        QueryValue::Map(map) => {
            for (key, nested) in map {
                if key.is_empty() {
                    trace_log!("Skipping empty field under query key '{}'", prefix);
                    continue;
                }
                encode_value(&format!("{prefix}[{}]", percent_encode(key)), nested, out);
            }
        }
    }
}

// ============================================================================
// Percent encoding
// ============================================================================

/// Percent-encode everything outside the RFC 3986 unreserved set.
pub fn percent_encode(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                result.push(char::from(byte));
            }
            _ => result.push_str(&format!("%{byte:02X}")),
        }
    }
    result
}

/// Percent-decode a query component. `+` decodes to a space.
///
/// Invalid escapes are kept as written and invalid UTF-8 is replaced.
pub fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let hex = bytes
                    .get(i + 1..i + 3)
                    .filter(|h| h.iter().all(u8::is_ascii_hexdigit))
                    .and_then(|h| std::str::from_utf8(h).ok())
                    .and_then(|h| u8::from_str_radix(h, 16).ok());
                if let Some(byte) = hex {
                    out.push(byte);
                    i += 3;
                } else {
                    out.push(b'%');
                    i += 1;
                }
            }
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            other => {
                out.push(other);
                i += 1;
            }
        }
    }

    String::from_utf8_lossy(&out).into_owned()
}
