//! Declarative route definitions.
//!
//! A [`Route`] is a builder describing one node of the route tree: a path
//! pattern, an optional unique name, the views it mounts into named slots, how
//! each slot's properties are derived, an optional redirect, and child routes
//! whose paths are relative to this one.
//!
//! Routes are only a declaration. [`RouteTable::new`](crate::RouteTable::new)
//! validates and flattens them into an immutable arena.
//!
//! ```
//! use serde_json::json;
//! use workflow_navigator::{Route, RouteTable, Target};
//!
//! let routes = vec![
//!     Route::new("/namespaces/:namespace")
//!         .name("namespace")
//!         .component("Namespace")
//!         .children(vec![
//!             Route::new("workflows")
//!                 .name("workflow-list")
//!                 .view("workflow-list", "WorkflowList"),
//!         ]),
//!     Route::new("/namespaces/:namespace/config")
//!         .redirect(Target::path("/namespaces/:namespace/settings")),
//!     Route::new("/help").view("help", "Help").props_fn("help", |_| {
//!         json!({"section": "intro"}).as_object().cloned().unwrap_or_default()
//!     }),
//! ];
//!
//! let table = RouteTable::new(routes).unwrap();
//! assert_eq!(table.len(), 4);
//! ```

use crate::params::RouteParams;
use crate::props::{Props, PropsError, PropsRule};
use crate::query::Query;
use crate::redirect::{RedirectRule, Target};
use std::sync::Arc;

/// Slot used by [`Route::component`].
pub const DEFAULT_SLOT: &str = "default";

/// What props and redirect functions get to look at.
#[derive(Debug, Clone, Copy)]
pub struct RouteContext<'a> {
    /// Matched path (normalized, still percent-encoded).
    pub path: &'a str,
    /// Parameters captured along the whole matched chain.
    pub params: &'a RouteParams,
    /// Decoded query.
    pub query: &'a Query,
    /// Name of the route the context is built for.
    pub name: Option<&'a str>,
}

/// Builder for one route and its subtree.
#[derive(Debug, Clone)]
pub struct Route {
    pub(crate) path: String,
    pub(crate) name: Option<String>,
    pub(crate) views: Vec<(String, String)>,
    pub(crate) props: Vec<(String, PropsRule)>,
    pub(crate) redirect: Option<RedirectRule>,
    pub(crate) children: Vec<Route>,
}

impl Route {
    /// Start a route for `path`.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: None,
            views: Vec::new(),
            props: Vec::new(),
            redirect: None,
            children: Vec::new(),
        }
    }

    /// Give the route a table-wide unique name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Mount `view` into the [`DEFAULT_SLOT`].
    pub fn component(self, view: impl Into<String>) -> Self {
        self.view(DEFAULT_SLOT, view)
    }

    /// Mount `view` into `slot`. Declaring a slot twice replaces the view.
    pub fn view(mut self, slot: impl Into<String>, view: impl Into<String>) -> Self {
        let slot = slot.into();
        let view = view.into();
        if let Some(existing) = self.views.iter_mut().find(|(s, _)| *s == slot) {
            existing.1 = view;
        } else {
            self.views.push((slot, view));
        }
        self
    }

    /// Set the props rule for `slot`.
    pub fn props(mut self, slot: impl Into<String>, rule: PropsRule) -> Self {
        let slot = slot.into();
        self.props.retain(|(s, _)| *s != slot);
        self.props.push((slot, rule));
        self
    }

    /// Pass a fixed property map to `slot`.
    pub fn static_props(self, slot: impl Into<String>, props: Props) -> Self {
        self.props(slot, PropsRule::Static(props))
    }

    /// Derive `slot`'s properties from the matched params and query.
    pub fn props_fn<F>(self, slot: impl Into<String>, f: F) -> Self
    where
        F: Fn(&RouteContext<'_>) -> Props + Send + Sync + 'static,
    {
        self.props(slot, PropsRule::derived(f))
    }

    /// Like [`props_fn`](Self::props_fn) for derivations that can fail.
    pub fn try_props_fn<F>(self, slot: impl Into<String>, f: F) -> Self
    where
        F: Fn(&RouteContext<'_>) -> Result<Props, PropsError> + Send + Sync + 'static,
    {
        self.props(slot, PropsRule::Derived(Arc::new(f)))
    }

    /// Redirect to a fixed target. Path targets may use `:param` and `*`
    /// placeholders filled from the matched params.
    pub fn redirect(mut self, target: impl Into<Target>) -> Self {
        self.redirect = Some(RedirectRule::Static(target.into()));
        self
    }

    /// Redirect to a target computed from the matched params and query.
    pub fn redirect_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&RouteContext<'_>) -> Target + Send + Sync + 'static,
    {
        self.redirect = Some(RedirectRule::Derived(Arc::new(f)));
        self
    }

    /// Replace the child routes.
    pub fn children(mut self, children: Vec<Route>) -> Self {
        self.children = children;
        self
    }

    /// Append one child route.
    pub fn child(mut self, child: Route) -> Self {
        self.children.push(child);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    #[test]
    fn test_builder_collects_fields() {
        let route = Route::new("/workflows/:workflowId")
            .name("workflow")
            .component("WorkflowTabs")
            .view("summary", "Summary")
            .static_props("summary", Map::new())
            .child(Route::new("history"));

        assert_eq!(route.path, "/workflows/:workflowId");
        assert_eq!(route.name.as_deref(), Some("workflow"));
        assert_eq!(
            route.views,
            vec![
                (DEFAULT_SLOT.to_string(), "WorkflowTabs".to_string()),
                ("summary".to_string(), "Summary".to_string()),
            ]
        );
        assert_eq!(route.props.len(), 1);
        assert_eq!(route.children.len(), 1);
    }

    #[test]
    fn test_view_and_props_replace_same_slot() {
        let route = Route::new("/")
            .view("main", "A")
            .view("main", "B")
            .static_props("main", Map::new())
            .props_fn("main", |_| Map::new());

        assert_eq!(route.views, vec![("main".to_string(), "B".to_string())]);
        assert_eq!(route.props.len(), 1);
        assert!(matches!(route.props[0].1, PropsRule::Derived(_)));
    }

    #[test]
    fn test_redirect_variants() {
        let route = Route::new("/").redirect("/namespaces");
        assert!(matches!(route.redirect, Some(RedirectRule::Static(_))));

        let route = Route::new("/").redirect_fn(|_| Target::named("help"));
        assert!(matches!(route.redirect, Some(RedirectRule::Derived(_))));
    }
}
