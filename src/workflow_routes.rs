//! The workflow UI's route table.
//!
//! ```text
//! /                                                   Root
//!   ""                                                → /namespaces
//!   namespaces                  namespace-list        [namespace-list]
//!   help                        help                  [help]
//! /namespaces/:namespace        namespace             Namespace
//!   workflows                   workflow-list         [workflow-list]
//!   settings                    namespace-settings    [namespace-settings]
//! /namespaces/:namespace/workflows/:workflowId/:runId
//!                               workflow              WorkflowTabs
//!   summary                     workflow/summary      [summary]
//!   history                     workflow/history      [history]
//!   stack-trace                 workflow/stack-trace  [stacktrace]
//!   query                       workflow/query        [query]
//! /namespaces/:namespace/task-lists/:taskList
//!                               task-list             TaskList
//! /namespace/*                  namespaces-redirect   → /namespaces/*
//! /namespaces/:namespace/config namespace-config-redirect
//!                                                     → /namespaces/:namespace/settings
//! /namespaces/:namespace/history                      → workflow/history or workflow-list
//! ```

use crate::params::RouteParams;
use crate::props::Props;
use crate::redirect::Target;
use crate::route::{Route, RouteContext, DEFAULT_SLOT};
use crate::table::{RouteTable, RouteTableError};
use serde_json::{Number, Value};

/// View identifiers mounted by the table.
pub mod views {
    pub const ROOT: &str = "Root";
    pub const NAMESPACE_LIST: &str = "NamespaceList";
    pub const HELP: &str = "Help";
    pub const NAMESPACE: &str = "Namespace";
    pub const WORKFLOW_LIST: &str = "WorkflowList";
    pub const NAMESPACE_SETTINGS: &str = "NamespaceSettings";
    pub const WORKFLOW_TABS: &str = "WorkflowTabs";
    pub const WORKFLOW_SUMMARY: &str = "WorkflowSummary";
    pub const HISTORY: &str = "History";
    pub const STACK_TRACE: &str = "StackTrace";
    pub const QUERY: &str = "Query";
    pub const TASK_LIST: &str = "TaskList";
}

/// Default rendering of the history tab.
pub const DEFAULT_HISTORY_FORMAT: &str = "grid";

/// Route declarations, in matching order.
pub fn workflow_routes() -> Vec<Route> {
    vec![
        Route::new("/").component(views::ROOT).children(vec![
            Route::new("").redirect("/namespaces"),
            Route::new("namespaces")
                .name("namespace-list")
                .view("namespace-list", views::NAMESPACE_LIST),
            Route::new("help").name("help").view("help", views::HELP),
        ]),
        Route::new("/namespaces/:namespace")
            .name("namespace")
            .component(views::NAMESPACE)
            .props_fn(DEFAULT_SLOT, |ctx| pick(ctx.params, &["namespace"]))
            .children(vec![
                Route::new("workflows")
                    .name("workflow-list")
                    .view("workflow-list", views::WORKFLOW_LIST),
                Route::new("settings")
                    .name("namespace-settings")
                    .view("namespace-settings", views::NAMESPACE_SETTINGS),
            ]),
        Route::new("/namespaces/:namespace/workflows/:workflowId/:runId")
            .name("workflow")
            .component(views::WORKFLOW_TABS)
            .props_fn(DEFAULT_SLOT, |ctx| {
                pick(ctx.params, &["namespace", "runId", "workflowId"])
            })
            .children(vec![
                Route::new("summary")
                    .name("workflow/summary")
                    .view("summary", views::WORKFLOW_SUMMARY)
                    .props_fn("summary", |ctx| pick(ctx.params, &["runId", "workflowId"])),
                Route::new("history")
                    .name("workflow/history")
                    .view("history", views::HISTORY)
                    .props_fn("history", history_props),
                Route::new("stack-trace")
                    .name("workflow/stack-trace")
                    .view("stacktrace", views::STACK_TRACE),
                Route::new("query")
                    .name("workflow/query")
                    .view("query", views::QUERY),
            ]),
        Route::new("/namespaces/:namespace/task-lists/:taskList")
            .name("task-list")
            .component(views::TASK_LIST),
        Route::new("/namespace/*")
            .name("namespaces-redirect")
            .redirect("/namespaces/*"),
        Route::new("/namespaces/:namespace/config")
            .name("namespace-config-redirect")
            .redirect("/namespaces/:namespace/settings"),
        Route::new("/namespaces/:namespace/history").redirect_fn(history_redirect),
    ]
}

/// Build the validated table.
pub fn route_table() -> Result<RouteTable, RouteTableError> {
    RouteTable::new(workflow_routes())
}

/// `/namespaces/:namespace/history?runId=..&workflowId=..` moved under the
/// workflow. `runId` and `workflowId` become path params; the rest of the
/// query is kept. Without both ids it lands on the workflow list.
fn history_redirect(ctx: &RouteContext<'_>) -> Target {
    let non_empty = |key: &str| ctx.query.get_str(key).filter(|v| !v.is_empty());

    match (non_empty("runId"), non_empty("workflowId")) {
        (Some(run_id), Some(workflow_id)) => {
            let mut params = RouteParams::new();
            params.insert("runId", run_id);
            params.insert("workflowId", workflow_id);
            params.insert("namespace", ctx.params.get("namespace").unwrap_or_default());

            let mut query = ctx.query.clone();
            query.remove("runId");
            query.remove("workflowId");

            Target::named("workflow/history")
                .with_params(params)
                .with_query(query)
        }
        _ => Target::named("workflow-list").with_params(ctx.params.clone()),
    }
}

fn history_props(ctx: &RouteContext<'_>) -> Props {
    let mut props = pick(ctx.params, &["namespace", "runId", "workflowId"]);
    if let Some(event_id) = ctx.query.get_str("eventId").and_then(event_id) {
        props.insert("eventId".into(), event_id);
    }
    let format = ctx
        .query
        .get_str("format")
        .filter(|f| !f.is_empty())
        .unwrap_or(DEFAULT_HISTORY_FORMAT);
    props.insert("format".into(), Value::from(format));
    props.insert(
        "showGraph".into(),
        Value::Bool(ctx.query.get_str("showGraph") == Some("true")),
    );
    props
}

/// A numeric, non-zero event id. Anything else means "no event selected".
fn event_id(raw: &str) -> Option<Value> {
    let raw = raw.trim();
    if let Ok(n) = raw.parse::<i64>() {
        return (n != 0).then(|| Value::from(n));
    }
    raw.parse::<f64>()
        .ok()
        .filter(|n| n.is_finite() && *n != 0.0)
        .and_then(Number::from_f64)
        .map(Value::Number)
}

fn pick(params: &RouteParams, keys: &[&str]) -> Props {
    keys.iter()
        .filter_map(|&key| params.get(key).map(|v| (key.to_string(), Value::from(v))))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Query;
    use serde_json::json;

    fn ctx<'a>(params: &'a RouteParams, query: &'a Query) -> RouteContext<'a> {
        RouteContext {
            path: "/",
            params,
            query,
            name: None,
        }
    }

    #[test]
    fn test_table_builds() {
        let table = route_table().unwrap();
        assert_eq!(table.len(), 16);
        assert_eq!(
            table.by_name("workflow/history").unwrap().full_path(),
            "/namespaces/:namespace/workflows/:workflowId/:runId/history"
        );
    }

    #[test]
    fn test_event_id() {
        assert_eq!(event_id("42"), Some(json!(42)));
        assert_eq!(event_id(" 7 "), Some(json!(7)));
        assert_eq!(event_id("1.5"), Some(json!(1.5)));
        assert_eq!(event_id("0"), None);
        assert_eq!(event_id(""), None);
        assert_eq!(event_id("abc"), None);
        assert_eq!(event_id("NaN"), None);
    }

    #[test]
    fn test_history_props_defaults() {
        let params: RouteParams = [("namespace", "ns"), ("workflowId", "wf"), ("runId", "r")]
            .into_iter()
            .collect();
        let query = Query::parse("format=&showGraph=1");
        let props = history_props(&ctx(&params, &query));

        assert_eq!(
            Value::Object(props),
            json!({
                "namespace": "ns",
                "workflowId": "wf",
                "runId": "r",
                "format": "grid",
                "showGraph": false,
            })
        );
    }

    #[test]
    fn test_history_redirect_whitelists_query() {
        let params: RouteParams = [("namespace", "ns1")].into_iter().collect();
        let query = Query::parse("runId=r1&workflowId=wf1&extra=keep");
        let target = history_redirect(&ctx(&params, &query));

        let expected_params: RouteParams =
            [("namespace", "ns1"), ("runId", "r1"), ("workflowId", "wf1")]
                .into_iter()
                .collect();
        assert_eq!(
            target,
            Target::named("workflow/history")
                .with_params(expected_params)
                .with_query(Query::parse("extra=keep"))
        );
    }

    #[test]
    fn test_history_redirect_without_ids() {
        let params: RouteParams = [("namespace", "ns1")].into_iter().collect();
        let query = Query::parse("runId=r1&workflowId=");
        let target = history_redirect(&ctx(&params, &query));
        assert_eq!(
            target,
            Target::named("workflow-list").with_params(params.clone())
        );
    }
}
