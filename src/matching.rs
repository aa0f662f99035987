//! Segment-based path patterns.
//!
//! A route path such as `/namespaces/:namespace/workflows/:workflowId` is
//! compiled once into a [`PathPattern`]: an ordered list of [`Segment`]s.
//!
//! - literal segments match the decoded path segment exactly
//! - `:name` captures one decoded segment
//! - a trailing `*` (captured as `pathMatch`) or `*name` captures the rest of
//!   the path, possibly empty, in its percent-encoded form: segments are
//!   re-encoded before joining with `/`, so an escaped `%2F` inside a segment
//!   never turns into a separator
//!
//! Patterns only ever match a *prefix* of the remaining segments; deciding
//! whether the rest belongs to a child route is the job of
//! [`resolve_match_stack`](crate::resolve::resolve_match_stack).

use crate::params::RouteParams;
use crate::query::percent_decode;
use std::borrow::Cow;
use thiserror::Error;

/// Parameter name used for an anonymous `*` wildcard.
pub const WILDCARD_PARAM: &str = "pathMatch";

/// Errors raised while compiling a path pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("wildcard must be the last segment in '{pattern}'")]
    WildcardNotLast { pattern: String },

    #[error("empty parameter name in '{pattern}'")]
    EmptyParamName { pattern: String },

    #[error("parameter ':{name}' appears twice in '{pattern}'")]
    DuplicateParam { pattern: String, name: String },
}

/// One compiled pattern segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Param(String),
    Wildcard(String),
}

/// Parameters and segment count consumed by a successful prefix match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixMatch {
    pub params: Vec<(String, String)>,
    pub consumed: usize,
}

/// A compiled route path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Compile a pattern. Leading and trailing slashes are ignored.
    ///
    /// ```
    /// use workflow_navigator::matching::{PathPattern, Segment};
    ///
    /// let pattern = PathPattern::parse("/namespace/*").unwrap();
    /// assert_eq!(
    ///     pattern.segments(),
    ///     &[Segment::Literal("namespace".into()), Segment::Wildcard("pathMatch".into())]
    /// );
    /// ```
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        let mut segments = Vec::new();
        let mut seen = Vec::new();

        for part in pattern.split('/').filter(|s| !s.is_empty()) {
            if matches!(segments.last(), Some(Segment::Wildcard(_))) {
                return Err(PatternError::WildcardNotLast {
                    pattern: pattern.to_string(),
                });
            }

            let segment = if let Some(name) = extract_param_name(part) {
                Segment::Param(name.to_string())
            } else if is_wildcard_segment(part) {
                let name = part.trim_start_matches('*');
                Segment::Wildcard(if name.is_empty() {
                    WILDCARD_PARAM.to_string()
                } else {
                    name.to_string()
                })
            } else {
                Segment::Literal(part.to_string())
            };

            if let Segment::Param(name) | Segment::Wildcard(name) = &segment {
                if name.is_empty() {
                    return Err(PatternError::EmptyParamName {
                        pattern: pattern.to_string(),
                    });
                }
                if seen.contains(name) {
                    return Err(PatternError::DuplicateParam {
                        pattern: pattern.to_string(),
                        name: name.clone(),
                    });
                }
                seen.push(name.clone());
            }
            segments.push(segment);
        }

        Ok(Self {
            raw: pattern.to_string(),
            segments,
        })
    }

    /// The pattern as written.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Compiled segments.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// `true` for the empty pattern (index and layout routes).
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Match the pattern against the start of `path` (decoded segments).
    ///
    /// ```
    /// use workflow_navigator::matching::{split_path, PathPattern};
    ///
    /// let pattern = PathPattern::parse("/namespaces/:namespace").unwrap();
    /// let m = pattern.match_prefix(&split_path("/namespaces/ns1/workflows")).unwrap();
    /// assert_eq!(m.params, vec![("namespace".to_string(), "ns1".to_string())]);
    /// assert_eq!(m.consumed, 2);
    /// ```
    pub fn match_prefix(&self, path: &[String]) -> Option<PrefixMatch> {
        if self.segments.len() > path.len()
            && !matches!(self.segments.last(), Some(Segment::Wildcard(_)))
        {
            return None;
        }

        let mut params = Vec::new();
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Literal(literal) => {
                    if path.get(i)? != literal {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    params.push((name.clone(), path.get(i)?.clone()));
                }
                Segment::Wildcard(name) => {
                    let suffix: Vec<String> = path[i..]
                        .iter()
                        .map(|segment| encode_path(segment, b""))
                        .collect();
                    params.push((name.clone(), suffix.join("/")));
                    return Some(PrefixMatch {
                        params,
                        consumed: path.len(),
                    });
                }
            }
        }

        Some(PrefixMatch {
            params,
            consumed: self.segments.len(),
        })
    }

    /// Build a concrete path (with leading slash) by filling parameters.
    ///
    /// Parameter values are percent-encoded. Wildcard values are already in
    /// path form, so their `/` separators and `%` escapes are emitted as-is
    /// and only characters that cannot appear in a path are escaped. A missing
    /// `:param` is returned as `Err(name)`; a missing wildcard fills as empty.
    ///
    /// ```
    /// use workflow_navigator::matching::PathPattern;
    /// use workflow_navigator::RouteParams;
    ///
    /// let pattern = PathPattern::parse("/namespaces/*").unwrap();
    /// let params: RouteParams = [("pathMatch", "a%2Fb/workflows")].into_iter().collect();
    /// assert_eq!(pattern.fill(&params).unwrap(), "/namespaces/a%2Fb/workflows");
    /// ```
    pub fn fill(&self, params: &RouteParams) -> Result<String, String> {
        let mut parts = Vec::with_capacity(self.segments.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(literal) => parts.push(literal.clone()),
                Segment::Param(name) => {
                    let value = params.get(name).ok_or_else(|| name.clone())?;
                    parts.push(encode_path(value, b""));
                }
                Segment::Wildcard(name) => {
                    let value = params.get(name).unwrap_or_default();
                    if !value.is_empty() {
                        parts.push(encode_path(value, b"/%"));
                    }
                }
            }
        }
        Ok(format!("/{}", parts.join("/")))
    }
}

/// Join a parent's full pattern and a child's relative pattern.
///
/// ```
/// use workflow_navigator::matching::join_patterns;
///
/// assert_eq!(join_patterns("/namespaces/:namespace", "workflows"), "/namespaces/:namespace/workflows");
/// assert_eq!(join_patterns("/", ""), "/");
/// ```
pub fn join_patterns(parent: &str, child: &str) -> String {
    let parent = parent.trim_matches('/');
    let child = child.trim_matches('/');
    match (parent.is_empty(), child.is_empty()) {
        (true, true) => "/".to_string(),
        (true, false) => format!("/{child}"),
        (false, true) => format!("/{parent}"),
        (false, false) => format!("/{parent}/{child}"),
    }
}

/// Normalize a path for consistent comparison.
///
/// Ensures a leading slash, no trailing slash (unless root) and no empty
/// segments. Returns `Cow` to avoid allocating for already-normal paths.
///
/// ```
/// use workflow_navigator::normalize_path;
///
/// assert_eq!(normalize_path("/namespaces"), "/namespaces");
/// assert_eq!(normalize_path("namespaces/"), "/namespaces");
/// assert_eq!(normalize_path("//namespaces//ns1"), "/namespaces/ns1");
/// assert_eq!(normalize_path(""), "/");
/// ```
#[must_use]
pub fn normalize_path(path: &str) -> Cow<'_, str> {
    if path == "/" {
        return Cow::Borrowed(path);
    }
    if path.starts_with('/') && !path.ends_with('/') && !path.contains("//") {
        return Cow::Borrowed(path);
    }

    let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if parts.is_empty() {
        Cow::Borrowed("/")
    } else {
        Cow::Owned(format!("/{}", parts.join("/")))
    }
}

/// Split a path into percent-decoded segments, dropping empty ones.
///
/// ```
/// use workflow_navigator::matching::split_path;
///
/// assert_eq!(split_path("/workflows/wf%201/"), vec!["workflows", "wf 1"]);
/// assert!(split_path("/").is_empty());
/// ```
pub fn split_path(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(decode_path_segment)
        .collect()
}

/// Extract the parameter name from a `:name` segment.
pub fn extract_param_name(segment: &str) -> Option<&str> {
    segment.strip_prefix(':')
}

/// Check if a pattern segment is a wildcard.
pub fn is_wildcard_segment(segment: &str) -> bool {
    segment.starts_with('*')
}

// Path segments are not form-encoded, so '+' stays literal here.
fn decode_path_segment(segment: &str) -> String {
    if segment.contains('+') {
        segment
            .split('+')
            .map(percent_decode)
            .collect::<Vec<_>>()
            .join("+")
    } else {
        percent_decode(segment)
    }
}

// `keep` lists extra bytes emitted literally on top of the path-safe set.
fn encode_path(value: &str, keep: &[u8]) -> String {
    let mut result = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                result.push(char::from(byte));
            }
            b'@' | b':' | b'!' | b'$' | b'\'' | b'(' | b')' | b'*' | b',' | b';' => {
                result.push(char::from(byte));
            }
            _ if keep.contains(&byte) => result.push(char::from(byte)),
            _ => result.push_str(&format!("%{byte:02X}")),
        }
    }
    result
}
