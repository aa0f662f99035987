//! Route resolution via Match Stack
//!
//! # Architecture
//!
//! The whole chain of matched routes is resolved once per navigation. The
//! result is a [`MatchStack`]: one [`MatchEntry`] per nesting level, root first.
//! Each level's views are mounted inside the views of the level above it.
//!
//! # Example
//!
//! Given routes:
//! ```text
//! /                                               (root layout)
//!   ""                                            (index → redirect)
//!   namespaces                                    (namespace list)
//! /namespaces/:namespace                          (namespace)
//!   workflows                                     (workflow list)
//! /namespaces/:namespace/workflows/:workflowId/:runId
//!   history                                       (history tab)
//! ```
//!
//! For path `/namespaces/ns1/workflows/wf1/run1/history`:
//! ```text
//! [0] Route("/namespaces/:namespace/workflows/:workflowId/:runId")  params={namespace, workflowId, runId}
//! [1] Route("history")                                              params={namespace, workflowId, runId}
//! ```
//!
//! `/namespaces/:namespace` is tried first and its `workflows` child matches a
//! prefix, but nothing accounts for `wf1/run1/history`, so the matcher
//! backtracks to the next root.
//!
//! # Ordering
//!
//! Candidates are tried strictly in declaration order and the first complete
//! match wins. There is no specificity scoring.

use crate::matching::{normalize_path, split_path};
use crate::params::RouteParams;
use crate::table::{RouteId, RouteTable};
use crate::{trace_log, warn_log};

// ============================================================================
// Match Stack
// ============================================================================

/// A single entry in the route match stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchEntry {
    /// The matched route at this level
    pub route: RouteId,
    /// Accumulated params (includes all params from parent levels + this level)
    pub params: RouteParams,
    /// Depth in the hierarchy (0 = root/top-level route)
    pub depth: usize,
}

/// The full resolved route chain for a path.
///
/// An empty stack means nothing matched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchStack {
    entries: Vec<MatchEntry>,
}

impl MatchStack {
    /// Create an empty match stack
    pub fn new() -> Self {
        Self::default()
    }

    /// Get entry at a specific depth
    pub fn at_depth(&self, depth: usize) -> Option<&MatchEntry> {
        self.entries.get(depth)
    }

    /// Get the root (depth 0) entry
    pub fn root(&self) -> Option<&MatchEntry> {
        self.entries.first()
    }

    /// Get the leaf (deepest) entry
    pub fn leaf(&self) -> Option<&MatchEntry> {
        self.entries.last()
    }

    /// Total number of matched levels
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty (no routes matched)
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get all entries as a slice
    pub fn entries(&self) -> &[MatchEntry] {
        &self.entries
    }

    /// Matched route ids, root first.
    pub fn route_ids(&self) -> impl Iterator<Item = RouteId> + '_ {
        self.entries.iter().map(|e| e.route)
    }

    /// Get the accumulated params at the deepest level
    pub fn params(&self) -> RouteParams {
        self.leaf().map(|e| e.params.clone()).unwrap_or_default()
    }

    /// Render the chain for log output, e.g. `"/ns/:namespace" → "workflows"`.
    pub fn describe(&self, table: &RouteTable) -> String {
        if self.entries.is_empty() {
            return "(empty)".to_string();
        }
        self.entries
            .iter()
            .map(|e| format!("\"{}\"", table.node(e.route).path()))
            .collect::<Vec<_>>()
            .join(" → ")
    }
}

// ============================================================================
// Resolution Algorithm
// ============================================================================

/// Maximum nesting depth to prevent runaway recursion
const MAX_DEPTH: usize = 16;

/// Resolve the full match stack for a path against the route table.
///
/// # Algorithm
///
/// 1. Normalize and split the path into decoded segments
/// 2. Try each top-level route, in order, against a prefix of the segments
/// 3. On match, consume segments and recurse into children
/// 4. When segments are exhausted, append the index route (empty-path child)
/// 5. Backtrack when a route's children cannot consume the rest
pub fn resolve_match_stack(table: &RouteTable, path: &str) -> MatchStack {
    let segments = split_path(&normalize_path(path));

    let mut stack = MatchStack::new();
    resolve_recursive(
        table,
        table.roots(),
        &segments,
        0,
        &RouteParams::new(),
        &mut stack,
    );

    trace_log!(
        "Resolved path '{}' → {} levels: [{}]",
        path,
        stack.len(),
        stack.describe(table)
    );

    stack
}

/// Recursive route matching with backtracking.
///
/// Returns `true` if a complete match was found.
fn resolve_recursive(
    table: &RouteTable,
    candidates: &[RouteId],
    remaining: &[String],
    depth: usize,
    inherited_params: &RouteParams,
    stack: &mut MatchStack,
) -> bool {
    if depth >= MAX_DEPTH {
        warn_log!(
            "Maximum route nesting depth ({}) exceeded. Check the route table.",
            MAX_DEPTH
        );
        return false;
    }

    for &id in candidates {
        let node = table.node(id);

        // Case 1: empty path (index or layout route)
        if node.pattern().is_empty() {
            if remaining.is_empty() {
                stack.entries.push(MatchEntry {
                    route: id,
                    params: inherited_params.clone(),
                    depth,
                });
                try_index_route(table, node.children(), depth + 1, inherited_params, stack);
                return true;
            }

            // Layout wrapping children
            if !node.children().is_empty() {
                stack.entries.push(MatchEntry {
                    route: id,
                    params: inherited_params.clone(),
                    depth,
                });
                if resolve_recursive(
                    table,
                    node.children(),
                    remaining,
                    depth + 1,
                    inherited_params,
                    stack,
                ) {
                    return true;
                }
                stack.entries.pop();
            }

            continue;
        }

        // Case 2: route has path segments
        let Some(matched) = node.pattern().match_prefix(remaining) else {
            continue;
        };

        let captured: RouteParams = matched.params.into_iter().collect();
        let params = RouteParams::merge(inherited_params, &captured);
        let after = &remaining[matched.consumed..];

        stack.entries.push(MatchEntry {
            route: id,
            params: params.clone(),
            depth,
        });

        if after.is_empty() {
            try_index_route(table, node.children(), depth + 1, &params, stack);
            return true;
        }

        if !node.children().is_empty()
            && resolve_recursive(table, node.children(), after, depth + 1, &params, stack)
        {
            return true;
        }

        // No child consumed the rest → backtrack
        stack.entries.pop();
    }

    false
}

/// Append the first empty-path child (recursively) once the path is consumed.
fn try_index_route(
    table: &RouteTable,
    children: &[RouteId],
    depth: usize,
    params: &RouteParams,
    stack: &mut MatchStack,
) {
    if depth >= MAX_DEPTH {
        return;
    }
    if let Some(&index) = children
        .iter()
        .find(|&&child| table.node(child).pattern().is_empty())
    {
        stack.entries.push(MatchEntry {
            route: index,
            params: params.clone(),
            depth,
        });
        try_index_route(table, table.node(index).children(), depth + 1, params, stack);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::Route;

    fn paths(table: &RouteTable, stack: &MatchStack) -> Vec<String> {
        stack
            .route_ids()
            .map(|id| table.node(id).path().to_string())
            .collect()
    }

    #[test]
    fn test_flat_routes() {
        let table = RouteTable::new(vec![
            Route::new("/"),
            Route::new("/about"),
            Route::new("/contact"),
        ])
        .unwrap();

        let stack = resolve_match_stack(&table, "/about");
        assert_eq!(paths(&table, &stack), vec!["/about"]);

        let stack = resolve_match_stack(&table, "/");
        assert_eq!(paths(&table, &stack), vec!["/"]);
    }

    #[test]
    fn test_index_route_appended() {
        let table = RouteTable::new(vec![Route::new("/dashboard").children(vec![
            Route::new(""),
            Route::new("settings"),
        ])])
        .unwrap();

        let stack = resolve_match_stack(&table, "/dashboard");
        assert_eq!(paths(&table, &stack), vec!["/dashboard", ""]);
        assert_eq!(stack.at_depth(1).unwrap().depth, 1);

        let stack = resolve_match_stack(&table, "/dashboard/settings");
        assert_eq!(paths(&table, &stack), vec!["/dashboard", "settings"]);
    }

    #[test]
    fn test_layout_root_backtracks() {
        let table = RouteTable::new(vec![
            Route::new("/").children(vec![Route::new(""), Route::new("namespaces")]),
            Route::new("/namespaces/:namespace"),
        ])
        .unwrap();

        let stack = resolve_match_stack(&table, "/namespaces");
        assert_eq!(paths(&table, &stack), vec!["/", "namespaces"]);

        let stack = resolve_match_stack(&table, "/namespaces/ns1");
        assert_eq!(paths(&table, &stack), vec!["/namespaces/:namespace"]);
        assert_eq!(stack.params().get("namespace"), Some("ns1"));

        let stack = resolve_match_stack(&table, "/");
        assert_eq!(paths(&table, &stack), vec!["/", ""]);
    }

    #[test]
    fn test_nested_parameters_accumulate() {
        let table = RouteTable::new(vec![Route::new("/users/:userId")
            .children(vec![Route::new("posts/:postId")])])
        .unwrap();

        let stack = resolve_match_stack(&table, "/users/42/posts/7");
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.root().unwrap().params.get("postId"), None);
        let leaf = stack.leaf().unwrap();
        assert_eq!(leaf.params.get("userId"), Some("42"));
        assert_eq!(leaf.params.get("postId"), Some("7"));
    }

    #[test]
    fn test_declaration_order_wins() {
        let table = RouteTable::new(vec![
            Route::new("/items/:id").name("param"),
            Route::new("/items/new").name("literal"),
        ])
        .unwrap();

        let stack = resolve_match_stack(&table, "/items/new");
        let leaf = table.node(stack.leaf().unwrap().route);
        assert_eq!(leaf.name(), Some("param"));
    }

    #[test]
    fn test_unmatched_is_empty() {
        let table = RouteTable::new(vec![Route::new("/a").children(vec![Route::new("b")])]).unwrap();
        assert!(resolve_match_stack(&table, "/a/c").is_empty());
        assert!(resolve_match_stack(&table, "/zzz").is_empty());
        assert_eq!(resolve_match_stack(&table, "/zzz").describe(&table), "(empty)");
    }

    #[test]
    fn test_path_normalization() {
        let table = RouteTable::new(vec![Route::new("/a").children(vec![Route::new("b")])]).unwrap();
        assert_eq!(resolve_match_stack(&table, "a//b/").len(), 2);
    }
}
