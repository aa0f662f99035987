//! Target resolution: match, follow redirects, derive props.
//!
//! ```text
//! Target ──► (path, query) ──► MatchStack ──► redirect? ──yes──► next Target ─┐
//!                 ▲                              │ no                          │
//!                 └──────────────────────────────┼─────────────────────────────┘
//!                                                ▼
//!                                     derive_views ──► Resolution
//! ```
//!
//! Each redirect hop re-enters matching once. Hops are bounded by
//! `max_hops`; a chain that is still redirecting after that many hops fails
//! with [`NavigationError::RedirectCycle`].

use crate::error::NavigationError;
use crate::params::RouteParams;
use crate::props::{derive_views, MountedView};
use crate::query::Query;
use crate::redirect::{find_redirect, target_location, Target};
use crate::resolve::{resolve_match_stack, MatchStack};
use crate::route::RouteContext;
use crate::table::RouteTable;
use crate::{debug_log, error_log, trace_log};

/// A fully resolved terminal match.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// Normalized path of the terminal match.
    pub path: String,
    pub query: Query,
    /// Parameters accumulated along the terminal chain.
    pub params: RouteParams,
    /// Name of the leaf route, if it has one.
    pub name: Option<String>,
    pub stack: MatchStack,
    /// Views to mount, root first.
    pub views: Vec<MountedView>,
    /// URLs that redirected, in the order they were left.
    pub redirects: Vec<String>,
}

impl Resolution {
    /// Canonical URL: path plus `?query` when the query is non-empty.
    pub fn url(&self) -> String {
        canonical_url(&self.path, &self.query)
    }
}

/// Join a path and query into a URL.
///
/// ```
/// use workflow_navigator::query::Query;
/// use workflow_navigator::resolution::canonical_url;
///
/// assert_eq!(canonical_url("/help", &Query::new()), "/help");
/// assert_eq!(canonical_url("/help", &Query::parse("b=2&a=1")), "/help?a=1&b=2");
/// ```
pub fn canonical_url(path: &str, query: &Query) -> String {
    format!("{}{}", path, query.to_search())
}

/// Resolve a target against the table without caching.
pub fn resolve_target(
    table: &RouteTable,
    target: &Target,
    max_hops: usize,
) -> Result<Resolution, NavigationError> {
    resolve_with(table, target, max_hops, |path| resolve_match_stack(table, path))
}

/// Resolve a target using `lookup` to turn paths into match stacks.
pub(crate) fn resolve_with<F>(
    table: &RouteTable,
    target: &Target,
    max_hops: usize,
    mut lookup: F,
) -> Result<Resolution, NavigationError>
where
    F: FnMut(&str) -> MatchStack,
{
    let (mut path, mut query) = target_location(table, target, None)?;
    let requested = canonical_url(&path, &query);
    let mut redirects: Vec<String> = Vec::new();

    loop {
        let stack = lookup(&path);
        if stack.is_empty() {
            debug_log!("No route matches '{}'", path);
            return Err(NavigationError::UnmatchedRoute { path });
        }

        let params = stack.params();
        let Some((id, rule)) = find_redirect(table, &stack) else {
            let name = stack
                .leaf()
                .and_then(|e| table.node(e.route).name())
                .map(str::to_string);
            let views = derive_views(table, &stack, &path, &query);
            trace_log!(
                "'{}' resolved to {} views after {} redirects",
                path,
                views.len(),
                redirects.len()
            );
            return Ok(Resolution {
                path,
                query,
                params,
                name,
                stack,
                views,
                redirects,
            });
        };

        if redirects.len() >= max_hops {
            error_log!(
                "Redirect chain from '{}' still redirecting after {} hops: {} → {}",
                requested,
                max_hops,
                redirects.join(" → "),
                canonical_url(&path, &query)
            );
            return Err(NavigationError::RedirectCycle {
                path: requested,
                hops: max_hops,
            });
        }

        let ctx = RouteContext {
            path: &path,
            params: &params,
            query: &query,
            name: table.node(id).name(),
        };
        let next = rule.target(&ctx);
        let (next_path, next_query) = target_location(table, &next, Some((&params, &query)))?;

        let from = canonical_url(&path, &query);
        debug_log!(
            "Redirect '{}' → '{}' (route '{}')",
            from,
            canonical_url(&next_path, &next_query),
            table.node(id).full_path()
        );
        redirects.push(from);
        path = next_path;
        query = next_query;
    }
}
