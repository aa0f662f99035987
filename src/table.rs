//! The immutable route table.
//!
//! [`RouteTable::new`] validates a tree of [`Route`] declarations and flattens
//! it into an arena of [`RouteNode`]s. Nodes refer to their parent and
//! children by [`RouteId`], so the tree has no ownership cycles and can be
//! shared behind an `Arc` for the life of the process.
//!
//! Ids are assigned depth-first in declaration order, which is also the order
//! the matcher tries candidates in.

use crate::error::NavigationError;
use crate::matching::{join_patterns, PathPattern, PatternError};
use crate::params::RouteParams;
use crate::props::PropsRule;
use crate::redirect::{RedirectRule, Target};
use crate::route::Route;
use crate::{debug_log, info_log};
use std::collections::HashMap;
use thiserror::Error;

/// Index of a route in its [`RouteTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteId(usize);

impl RouteId {
    /// Position in the table's arena.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Problems found while building a route table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteTableError {
    #[error("route name '{name}' is declared more than once")]
    DuplicateName { name: String },

    #[error("route '{path}' declares both a redirect and view slots")]
    RedirectWithViews { path: String },

    #[error("route '{path}' has an invalid pattern")]
    InvalidPattern {
        path: String,
        #[source]
        source: PatternError,
    },

    #[error("route '{path}' has a props rule for undeclared slot '{slot}'")]
    UnknownSlot { path: String, slot: String },
}

/// One flattened route.
#[derive(Debug)]
pub struct RouteNode {
    id: RouteId,
    route: Route,
    pattern: PathPattern,
    full_pattern: PathPattern,
    parent: Option<RouteId>,
    children: Vec<RouteId>,
    depth: usize,
}

impl RouteNode {
    pub fn id(&self) -> RouteId {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.route.name.as_deref()
    }

    /// The path as declared (relative for children).
    pub fn path(&self) -> &str {
        &self.route.path
    }

    /// The pattern of this route alone.
    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    /// Absolute pattern including every ancestor.
    pub fn full_path(&self) -> &str {
        self.full_pattern.raw()
    }

    pub fn full_pattern(&self) -> &PathPattern {
        &self.full_pattern
    }

    pub fn parent(&self) -> Option<RouteId> {
        self.parent
    }

    pub fn children(&self) -> &[RouteId] {
        &self.children
    }

    /// Nesting level, 0 for roots.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Declared `(slot, view)` pairs in declaration order.
    pub fn views(&self) -> &[(String, String)] {
        &self.route.views
    }

    pub fn props_rule(&self, slot: &str) -> Option<&PropsRule> {
        self.route
            .props
            .iter()
            .find(|(s, _)| s == slot)
            .map(|(_, rule)| rule)
    }

    pub fn redirect(&self) -> Option<&RedirectRule> {
        self.route.redirect.as_ref()
    }

    pub fn is_redirect(&self) -> bool {
        self.route.redirect.is_some()
    }
}

/// Arena of validated routes.
#[derive(Debug)]
pub struct RouteTable {
    nodes: Vec<RouteNode>,
    roots: Vec<RouteId>,
    names: HashMap<String, RouteId>,
}

impl RouteTable {
    /// Validate and flatten a route forest.
    pub fn new(routes: Vec<Route>) -> Result<Self, RouteTableError> {
        let mut table = Self {
            nodes: Vec::new(),
            roots: Vec::new(),
            names: HashMap::new(),
        };

        for route in routes {
            let id = table.insert(route, None, "/", 0)?;
            table.roots.push(id);
        }

        info_log!(
            "Route table built: {} routes ({} roots, {} named)",
            table.nodes.len(),
            table.roots.len(),
            table.names.len()
        );
        Ok(table)
    }

    fn insert(
        &mut self,
        mut route: Route,
        parent: Option<RouteId>,
        parent_full: &str,
        depth: usize,
    ) -> Result<RouteId, RouteTableError> {
        let invalid = |path: &str, source| RouteTableError::InvalidPattern {
            path: path.to_string(),
            source,
        };

        let pattern = PathPattern::parse(&route.path).map_err(|e| invalid(&route.path, e))?;
        let full = join_patterns(parent_full, &route.path);
        let full_pattern = PathPattern::parse(&full).map_err(|e| invalid(&full, e))?;

        if route.redirect.is_some() && !route.views.is_empty() {
            return Err(RouteTableError::RedirectWithViews { path: full });
        }
        if let Some(RedirectRule::Static(Target::Path { path, .. })) = &route.redirect {
            PathPattern::parse(path).map_err(|e| invalid(&full, e))?;
        }
        if let Some((slot, _)) = route
            .props
            .iter()
            .find(|(slot, _)| !route.views.iter().any(|(s, _)| s == slot))
        {
            return Err(RouteTableError::UnknownSlot {
                path: full,
                slot: slot.clone(),
            });
        }

        let id = RouteId(self.nodes.len());
        if let Some(name) = &route.name {
            if self.names.insert(name.clone(), id).is_some() {
                return Err(RouteTableError::DuplicateName { name: name.clone() });
            }
            debug_log!("Registered route '{}' (name: '{}')", full, name);
        } else {
            debug_log!("Registered route '{}'", full);
        }

        let children = std::mem::take(&mut route.children);
        self.nodes.push(RouteNode {
            id,
            route,
            pattern,
            full_pattern,
            parent,
            children: Vec::new(),
            depth,
        });

        let mut child_ids = Vec::with_capacity(children.len());
        for child in children {
            child_ids.push(self.insert(child, Some(id), &full, depth + 1)?);
        }
        self.nodes[id.0].children = child_ids;

        Ok(id)
    }

    /// Look up a node. `id` must come from this table.
    pub fn node(&self, id: RouteId) -> &RouteNode {
        &self.nodes[id.0]
    }

    pub fn get(&self, id: RouteId) -> Option<&RouteNode> {
        self.nodes.get(id.0)
    }

    /// Top-level routes in declaration order.
    pub fn roots(&self) -> &[RouteId] {
        &self.roots
    }

    pub fn by_name(&self, name: &str) -> Option<&RouteNode> {
        self.names.get(name).map(|id| self.node(*id))
    }

    /// All nodes, depth-first in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &RouteNode> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Build the path of a named route from `params`.
    ///
    /// ```
    /// use workflow_navigator::{Route, RouteParams, RouteTable};
    ///
    /// let table = RouteTable::new(vec![
    ///     Route::new("/namespaces/:namespace").name("namespace").children(vec![
    ///         Route::new("settings").name("namespace-settings").view("settings", "Settings"),
    ///     ]),
    /// ])
    /// .unwrap();
    ///
    /// let params: RouteParams = [("namespace", "ns1")].into_iter().collect();
    /// assert_eq!(
    ///     table.url_for("namespace-settings", &params).unwrap(),
    ///     "/namespaces/ns1/settings"
    /// );
    /// ```
    pub fn url_for(&self, name: &str, params: &RouteParams) -> Result<String, NavigationError> {
        let node = self
            .by_name(name)
            .ok_or_else(|| NavigationError::UnknownRouteName {
                name: name.to_string(),
            })?;
        node.full_pattern
            .fill(params)
            .map_err(|param| NavigationError::MissingParam {
                route: name.to_string(),
                param,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    #[test]
    fn test_flattening_and_links() {
        let table = RouteTable::new(vec![
            Route::new("/a").name("a").children(vec![
                Route::new("b").name("b"),
                Route::new("c").children(vec![Route::new("d").name("d")]),
            ]),
            Route::new("/e"),
        ])
        .unwrap();

        assert_eq!(table.len(), 5);
        assert_eq!(table.roots().len(), 2);

        let d = table.by_name("d").unwrap();
        assert_eq!(d.full_path(), "/a/c/d");
        assert_eq!(d.depth(), 2);
        let c = table.node(d.parent().unwrap());
        assert_eq!(c.path(), "c");
        assert_eq!(c.children(), &[d.id()]);
        assert!(c.parent().is_some());
        assert!(table.node(table.roots()[1]).parent().is_none());
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let err = RouteTable::new(vec![
            Route::new("/a").name("dup"),
            Route::new("/b").children(vec![Route::new("c").name("dup")]),
        ])
        .unwrap_err();
        assert_eq!(err, RouteTableError::DuplicateName { name: "dup".into() });
    }

    #[test]
    fn test_redirect_with_views_rejected() {
        let err = RouteTable::new(vec![Route::new("/a").component("A").redirect("/b")]).unwrap_err();
        assert_eq!(err, RouteTableError::RedirectWithViews { path: "/a".into() });
    }

    #[test]
    fn test_invalid_patterns_rejected() {
        let err = RouteTable::new(vec![Route::new("/a/*/b")]).unwrap_err();
        assert!(matches!(err, RouteTableError::InvalidPattern { .. }));

        let err = RouteTable::new(vec![Route::new("/a").redirect("/b/*/c")]).unwrap_err();
        assert!(matches!(err, RouteTableError::InvalidPattern { .. }));
    }

    #[test]
    fn test_props_for_unknown_slot_rejected() {
        let err = RouteTable::new(vec![Route::new("/a")
            .view("main", "Main")
            .static_props("side", Map::new())])
        .unwrap_err();
        assert_eq!(
            err,
            RouteTableError::UnknownSlot {
                path: "/a".into(),
                slot: "side".into()
            }
        );
    }

    #[test]
    fn test_url_for_errors() {
        let table = RouteTable::new(vec![Route::new("/w/:id").name("w")]).unwrap();
        assert_eq!(
            table.url_for("nope", &RouteParams::new()),
            Err(NavigationError::UnknownRouteName { name: "nope".into() })
        );
        assert_eq!(
            table.url_for("w", &RouteParams::new()),
            Err(NavigationError::MissingParam {
                route: "w".into(),
                param: "id".into()
            })
        );
    }
}
