//! Path parameters captured while matching a route chain.
//!
//! [`RouteParams`] holds the decoded values of `:name` and `*` segments. Every
//! entry in a [`MatchStack`](crate::MatchStack) carries the parameters
//! accumulated from the root down to that level, so a child always sees its
//! parents' values.
//!
//! ```
//! use workflow_navigator::RouteParams;
//!
//! let params: RouteParams = [("namespace", "ns1"), ("runId", "run1")].into_iter().collect();
//! assert_eq!(params.get("namespace"), Some("ns1"));
//! assert_eq!(params.get_as::<u32>("runId"), None);
//! ```

use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Named path parameters, ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteParams {
    params: BTreeMap<String, String>,
}

impl RouteParams {
    /// Create empty route parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a parameter value by key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Get a parameter and parse it as a specific type.
    ///
    /// Returns `None` if the parameter doesn't exist or cannot be parsed.
    pub fn get_as<T>(&self, key: &str) -> Option<T>
    where
        T: std::str::FromStr,
    {
        self.params.get(key)?.parse().ok()
    }

    /// Insert or overwrite a parameter.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.insert(key.into(), value.into());
    }

    /// Remove a parameter, returning its previous value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.params.remove(key)
    }

    /// Return `true` if the given key is present.
    pub fn contains(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    /// Iterate over all `(key, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Return `true` if there are no parameters.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Return the number of parameters.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Merge parent parameters with child parameters.
    ///
    /// Child values win on collision.
    ///
    /// ```
    /// use workflow_navigator::RouteParams;
    ///
    /// let parent: RouteParams = [("namespace", "ns1"), ("tab", "summary")].into_iter().collect();
    /// let child: RouteParams = [("tab", "history")].into_iter().collect();
    ///
    /// let merged = RouteParams::merge(&parent, &child);
    /// assert_eq!(merged.get("namespace"), Some("ns1"));
    /// assert_eq!(merged.get("tab"), Some("history"));
    /// ```
    pub fn merge(parent: &RouteParams, child: &RouteParams) -> RouteParams {
        let mut merged = parent.clone();
        for (key, value) in child.iter() {
            merged.insert(key, value);
        }
        merged
    }

    /// Render the parameters as a JSON object of strings.
    ///
    /// Used as the implicit property set of a view slot that declares no
    /// props rule.
    pub fn to_json_map(&self) -> Map<String, Value> {
        self.params
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect()
    }
}

impl<K, V> FromIterator<(K, V)> for RouteParams
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            params: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let mut params = RouteParams::new();
        params.insert("workflowId", "wf1");
        assert_eq!(params.get("workflowId"), Some("wf1"));
        assert!(params.contains("workflowId"));
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_get_as() {
        let params: RouteParams = [("page", "3"), ("name", "x")].into_iter().collect();
        assert_eq!(params.get_as::<u32>("page"), Some(3));
        assert_eq!(params.get_as::<u32>("name"), None);
        assert_eq!(params.get_as::<u32>("missing"), None);
    }

    #[test]
    fn test_merge_child_wins() {
        let parent: RouteParams = [("a", "1"), ("b", "2")].into_iter().collect();
        let child: RouteParams = [("b", "3"), ("c", "4")].into_iter().collect();
        let merged = RouteParams::merge(&parent, &child);
        assert_eq!(merged.get("a"), Some("1"));
        assert_eq!(merged.get("b"), Some("3"));
        assert_eq!(merged.get("c"), Some("4"));
    }

    #[test]
    fn test_to_json_map() {
        let params: RouteParams = [("namespace", "ns1")].into_iter().collect();
        let map = params.to_json_map();
        assert_eq!(map.get("namespace"), Some(&Value::String("ns1".into())));
    }
}
