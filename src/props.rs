//! Per-slot property derivation.
//!
//! Every view slot of every matched route gets a property map:
//!
//! | Rule                    | Properties                                 |
//! |-------------------------|--------------------------------------------|
//! | [`PropsRule::Static`]   | the declared map, unchanged                |
//! | [`PropsRule::Derived`]  | whatever the function returns for the match |
//! | none                    | the path parameters as strings             |
//!
//! A failing derivation only affects its own slot; siblings are still derived.

use crate::params::RouteParams;
use crate::query::Query;
use crate::resolve::MatchStack;
use crate::route::RouteContext;
use crate::table::{RouteId, RouteTable};
use crate::{trace_log, warn_log};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Properties handed to a mounted view.
pub type Props = Map<String, Value>;

/// Fallible props derivation function.
pub type PropsFn = Arc<dyn Fn(&RouteContext<'_>) -> Result<Props, PropsError> + Send + Sync>;

/// A props derivation failure, reported on the slot it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("props for slot '{slot}' failed: {message}")]
pub struct PropsError {
    pub slot: String,
    pub message: String,
}

impl PropsError {
    /// Create an error. The slot is filled in by the deriver.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            slot: String::new(),
            message: message.into(),
        }
    }

    fn with_slot(mut self, slot: &str) -> Self {
        self.slot = slot.to_string();
        self
    }
}

/// How a slot's properties are produced.
#[derive(Clone)]
pub enum PropsRule {
    Static(Props),
    Derived(PropsFn),
}

impl PropsRule {
    /// Wrap an infallible derivation function.
    pub fn derived<F>(f: F) -> Self
    where
        F: Fn(&RouteContext<'_>) -> Props + Send + Sync + 'static,
    {
        PropsRule::Derived(Arc::new(move |ctx| Ok(f(ctx))))
    }

    /// Produce the properties for a match.
    pub fn apply(&self, ctx: &RouteContext<'_>) -> Result<Props, PropsError> {
        match self {
            PropsRule::Static(props) => Ok(props.clone()),
            PropsRule::Derived(f) => f(ctx),
        }
    }
}

impl fmt::Debug for PropsRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropsRule::Static(props) => f.debug_tuple("Static").field(props).finish(),
            PropsRule::Derived(_) => f.write_str("Derived(<fn>)"),
        }
    }
}

/// One view to mount, in mount order.
#[derive(Debug, Clone, PartialEq)]
pub struct MountedView {
    /// Depth of the owning route in the matched chain.
    pub depth: usize,
    /// The owning route.
    pub route: RouteId,
    pub slot: String,
    pub view: String,
    pub props: Result<Props, PropsError>,
}

impl MountedView {
    /// Properties, if derivation succeeded.
    pub fn props(&self) -> Option<&Props> {
        self.props.as_ref().ok()
    }
}

/// Derive the mounted view list for a terminal match stack.
///
/// Views are ordered by depth (root first), then by slot declaration order.
/// Each slot sees the parameters of the whole chain.
pub fn derive_views(
    table: &RouteTable,
    stack: &MatchStack,
    path: &str,
    query: &Query,
) -> Vec<MountedView> {
    let params: RouteParams = stack.params();
    let leaf_name = stack.leaf().and_then(|e| table.node(e.route).name());
    let ctx = RouteContext {
        path,
        params: &params,
        query,
        name: leaf_name,
    };

    let mut views = Vec::new();
    for entry in stack.entries() {
        let node = table.node(entry.route);
        for (slot, view) in node.views() {
            let props = match node.props_rule(slot) {
                Some(rule) => rule.apply(&ctx).map_err(|e| e.with_slot(slot)),
                None => Ok(params.to_json_map()),
            };
            match &props {
                Ok(p) => {
                    trace_log!("Slot '{}' -> {} ({} props)", slot, view, p.len());
                }
                Err(err) => {
                    warn_log!("{} (view {}, route '{}')", err, view, node.full_path());
                }
            }
            views.push(MountedView {
                depth: entry.depth,
                route: entry.route,
                slot: slot.clone(),
                view: view.clone(),
                props,
            });
        }
    }
    views
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::resolve_match_stack;
    use crate::route::Route;
    use serde_json::json;

    fn props(value: Value) -> Props {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_static_derived_and_implicit() {
        let table = RouteTable::new(vec![Route::new("/ns/:namespace")
            .component("Namespace")
            .view("banner", "Banner")
            .static_props("banner", props(json!({"tone": "info"})))
            .child(
                Route::new("wf/:workflowId")
                    .view("detail", "Detail")
                    .props_fn("detail", |ctx| {
                        props(json!({
                            "id": ctx.params.get("workflowId"),
                            "tab": ctx.query.get_str("tab").unwrap_or("summary"),
                        }))
                    }),
            )])
        .unwrap();

        let stack = resolve_match_stack(&table, "/ns/a/wf/b");
        let query = Query::parse("tab=history");
        let views = derive_views(&table, &stack, "/ns/a/wf/b", &query);

        assert_eq!(views.len(), 3);
        assert_eq!(views[0].slot, "default");
        assert_eq!(
            views[0].props(),
            Some(&props(json!({"namespace": "a", "workflowId": "b"})))
        );
        assert_eq!(views[1].props(), Some(&props(json!({"tone": "info"}))));
        assert_eq!(views[2].depth, 1);
        assert_eq!(
            views[2].props(),
            Some(&props(json!({"id": "b", "tab": "history"})))
        );
    }

    #[test]
    fn test_failure_is_isolated_to_its_slot() {
        let table = RouteTable::new(vec![Route::new("/x")
            .view("left", "Left")
            .view("right", "Right")
            .try_props_fn("left", |_| Err(PropsError::new("boom")))
            .props_fn("right", |_| Map::new())])
        .unwrap();

        let stack = resolve_match_stack(&table, "/x");
        let views = derive_views(&table, &stack, "/x", &Query::new());

        assert_eq!(views.len(), 2);
        let err = views[0].props.as_ref().unwrap_err();
        assert_eq!(err.slot, "left");
        assert_eq!(err.to_string(), "props for slot 'left' failed: boom");
        assert_eq!(views[1].props(), Some(&Map::new()));
    }
}
