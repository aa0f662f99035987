//! Navigation targets and redirect rules.
//!
//! A [`Target`] names where to go: either a route name plus params, or a
//! literal path. Both may carry a query. Parts left as `None` are *inherited*
//! when the target comes out of a redirect (the matched params and query are
//! carried forward) and are empty for explicit navigation.
//!
//! A route redirects when it carries a [`RedirectRule`]. The first route in the
//! matched chain with a rule wins (the leaf, or an ancestor that is a pure
//! redirect).

use crate::error::NavigationError;
use crate::matching::{normalize_path, PathPattern};
use crate::params::RouteParams;
use crate::query::Query;
use crate::resolve::MatchStack;
use crate::route::RouteContext;
use crate::table::{RouteId, RouteTable};
use std::fmt;
use std::sync::Arc;

/// Where a navigation or redirect should go.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    /// Resolve through the route name index.
    Named {
        name: String,
        params: Option<RouteParams>,
        query: Option<Query>,
    },
    /// Resolve a literal path. In redirect rules the path is a template.
    Path { path: String, query: Option<Query> },
}

impl Target {
    /// Target a named route.
    pub fn named(name: impl Into<String>) -> Self {
        Target::Named {
            name: name.into(),
            params: None,
            query: None,
        }
    }

    /// Target a path, taken literally (no `?` splitting).
    pub fn path(path: impl Into<String>) -> Self {
        Target::Path {
            path: path.into(),
            query: None,
        }
    }

    /// Target a URL, splitting the query string off the path.
    ///
    /// ```
    /// use workflow_navigator::Target;
    ///
    /// let target = Target::from_url("/namespaces/ns1/history?runId=r1");
    /// assert_eq!(target.query().and_then(|q| q.get_str("runId")), Some("r1"));
    /// assert_eq!(target.to_string(), "/namespaces/ns1/history?runId=r1");
    /// ```
    pub fn from_url(url: &str) -> Self {
        match url.split_once('?') {
            Some((path, query)) => Target::Path {
                path: path.to_string(),
                query: Some(Query::parse(query)),
            },
            None => Target::path(url),
        }
    }

    /// Set the params of a named target. Path targets are unaffected.
    pub fn with_params(mut self, new_params: RouteParams) -> Self {
        if let Target::Named { params, .. } = &mut self {
            *params = Some(new_params);
        }
        self
    }

    /// Set the query explicitly, replacing whatever would be inherited.
    pub fn with_query(mut self, new_query: Query) -> Self {
        match &mut self {
            Target::Named { query, .. } | Target::Path { query, .. } => *query = Some(new_query),
        }
        self
    }

    /// The explicit query, if any.
    pub fn query(&self) -> Option<&Query> {
        match self {
            Target::Named { query, .. } | Target::Path { query, .. } => query.as_ref(),
        }
    }
}

impl From<&str> for Target {
    fn from(url: &str) -> Self {
        Target::from_url(url)
    }
}

impl From<String> for Target {
    fn from(url: String) -> Self {
        Target::from_url(&url)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Named { name, query, .. } => {
                write!(f, "route '{name}'")?;
                if let Some(query) = query {
                    f.write_str(&query.to_search())?;
                }
                Ok(())
            }
            Target::Path { path, query } => {
                f.write_str(path)?;
                if let Some(query) = query {
                    f.write_str(&query.to_search())?;
                }
                Ok(())
            }
        }
    }
}

/// Redirect target computation.
pub type RedirectFn = Arc<dyn Fn(&RouteContext<'_>) -> Target + Send + Sync>;

/// How a redirect route picks its target.
#[derive(Clone)]
pub enum RedirectRule {
    Static(Target),
    Derived(RedirectFn),
}

impl RedirectRule {
    /// The target for a match.
    pub fn target(&self, ctx: &RouteContext<'_>) -> Target {
        match self {
            RedirectRule::Static(target) => target.clone(),
            RedirectRule::Derived(f) => f(ctx),
        }
    }
}

impl fmt::Debug for RedirectRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RedirectRule::Static(target) => f.debug_tuple("Static").field(target).finish(),
            RedirectRule::Derived(_) => f.write_str("Derived(<fn>)"),
        }
    }
}

/// The first route in the chain that carries a redirect rule.
pub fn find_redirect<'t>(
    table: &'t RouteTable,
    stack: &MatchStack,
) -> Option<(RouteId, &'t RedirectRule)> {
    stack.entries().iter().find_map(|entry| {
        table
            .node(entry.route)
            .redirect()
            .map(|rule| (entry.route, rule))
    })
}

/// Turn a target into a normalized path and a query.
///
/// With `inherited` set (redirects), path targets are templates filled from
/// the inherited params, and missing params/query are taken from it.
pub fn target_location(
    table: &RouteTable,
    target: &Target,
    inherited: Option<(&RouteParams, &Query)>,
) -> Result<(String, Query), NavigationError> {
    let query_or_inherited = |query: &Option<Query>| {
        query
            .clone()
            .or_else(|| inherited.map(|(_, q)| q.clone()))
            .unwrap_or_default()
    };

    match target {
        Target::Named {
            name,
            params,
            query,
        } => {
            let empty = RouteParams::new();
            let params = params
                .as_ref()
                .or_else(|| inherited.map(|(p, _)| p))
                .unwrap_or(&empty);
            let path = table.url_for(name, params)?;
            Ok((path, query_or_inherited(query)))
        }
        Target::Path { path, query } => {
            let path = match inherited {
                Some((params, _)) => {
                    let template =
                        PathPattern::parse(path).map_err(|e| NavigationError::InvalidTarget {
                            target: path.clone(),
                            reason: e.to_string(),
                        })?;
                    template
                        .fill(params)
                        .map_err(|param| NavigationError::MissingParam {
                            route: path.clone(),
                            param,
                        })?
                }
                None => normalize_path(path).into_owned(),
            };
            Ok((path, query_or_inherited(query)))
        }
    }
}
