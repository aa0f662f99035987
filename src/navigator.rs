//! The navigation controller.
//!
//! [`Navigator`] owns the route table, the committed [`Location`] and a
//! [`History`] implementation. Every navigation goes through three steps:
//!
//! 1. [`begin`](Navigator::begin) allocates a navigation id. Only the most
//!    recently allocated id is current.
//! 2. [`resolve`](Navigator::resolve) matches the target, follows redirects
//!    and derives view props. No state changes.
//! 3. [`commit`](Navigator::commit) applies the outcome if the id is still
//!    current: swaps the location, writes history and notifies listeners.
//!    A superseded navigation returns [`NavigationResult::Cancelled`] and
//!    changes nothing.
//!
//! [`push`](Navigator::push), [`replace`](Navigator::replace) and
//! [`sync`](Navigator::sync) run all three steps at once.
//!
//! # Example
//!
//! ```
//! use workflow_navigator::{workflow_routes, History, Navigator};
//!
//! let mut nav = Navigator::new(workflow_routes::route_table().unwrap());
//! nav.start();
//! assert_eq!(nav.location().path(), "/namespaces");
//!
//! let result = nav.push("/namespaces/ns1/config");
//! assert!(result.is_success());
//! assert_eq!(nav.location().name(), Some("namespace-settings"));
//! assert_eq!(nav.history().current_url(), "/namespaces/ns1/settings");
//! ```

#[cfg(feature = "cache")]
use crate::cache::{CacheStats, RouteCache};
use crate::error::{NavigationError, NavigationResult};
use crate::history::{History, HistoryWrite, MemoryHistory};
use crate::matching::normalize_path;
use crate::options::RouterOptions;
use crate::params::RouteParams;
use crate::redirect::Target;
use crate::resolution::{resolve_with, Resolution};
use crate::state::{Location, RouterState};
use crate::table::RouteTable;
use crate::{debug_log, info_log, warn_log};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// The kind of history write a navigation asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavigateOp {
    /// Add a history entry.
    Push,
    /// Overwrite the current entry.
    Replace,
    /// Adopt a URL already in history (initial load, back/forward).
    Sync,
}

/// A navigation that has been started but not committed.
#[derive(Debug, Clone)]
pub struct PendingNavigation {
    id: usize,
    target: Target,
    op: NavigateOp,
    requested: String,
}

impl PendingNavigation {
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn op(&self) -> NavigateOp {
        self.op
    }

    /// The URL (or route description) as requested.
    pub fn requested(&self) -> &str {
        &self.requested
    }
}

/// Passed to listeners after every commit.
#[derive(Debug, Clone)]
pub struct RouteChangeEvent {
    /// URL of the previous location; `None` for the first commit.
    pub from: Option<String>,
    /// Canonical URL of the new location.
    pub to: String,
    pub op: NavigateOp,
    pub location: Arc<Location>,
}

type Listener = Box<dyn Fn(&RouteChangeEvent) + Send + Sync>;

/// Drives navigation against a route table and a history.
pub struct Navigator<H: History = MemoryHistory> {
    table: Arc<RouteTable>,
    options: RouterOptions,
    state: RouterState,
    history: H,
    #[cfg(feature = "cache")]
    cache: RouteCache,
    listeners: Vec<Listener>,
}

impl Navigator<MemoryHistory> {
    /// Navigator over a fresh in-memory history at `/`.
    pub fn new(table: impl Into<Arc<RouteTable>>) -> Self {
        Self::with_history(table, MemoryHistory::new())
    }
}

impl<H: History> Navigator<H> {
    /// Navigator over an existing history. Call [`start`](Self::start) to
    /// resolve its current URL.
    pub fn with_history(table: impl Into<Arc<RouteTable>>, history: H) -> Self {
        let options = RouterOptions::default();
        Self {
            table: table.into(),
            options,
            state: RouterState::new(),
            history,
            #[cfg(feature = "cache")]
            cache: RouteCache::with_capacity(options.cache_capacity),
            listeners: Vec::new(),
        }
    }

    /// Replace the options. Invalidates the resolution cache, keeping its
    /// statistics.
    pub fn with_options(mut self, options: RouterOptions) -> Self {
        self.options = options;
        #[cfg(feature = "cache")]
        {
            self.cache.resize(options.cache_capacity);
            self.cache.clear();
        }
        self
    }

    pub fn table(&self) -> &Arc<RouteTable> {
        &self.table
    }

    pub fn options(&self) -> &RouterOptions {
        &self.options
    }

    /// The committed location.
    pub fn location(&self) -> Arc<Location> {
        Arc::clone(self.state.location())
    }

    /// URL of the location before the last commit.
    pub fn previous_url(&self) -> Option<&str> {
        self.state.previous_url()
    }

    pub fn history(&self) -> &H {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut H {
        &mut self.history
    }

    /// Call `listener` after every committed navigation.
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: Fn(&RouteChangeEvent) + Send + Sync + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Build the URL of a named route.
    pub fn url_for(&self, name: &str, params: &RouteParams) -> Result<String, NavigationError> {
        self.table.url_for(name, params)
    }

    #[cfg(feature = "cache")]
    pub fn cache_stats(&self) -> &CacheStats {
        self.cache.stats()
    }

    // ========================================================================
    // Navigation entry points
    // ========================================================================

    /// Resolve the history's current URL, as on page load.
    pub fn start(&mut self) -> NavigationResult {
        let url = self.history.current_url();
        self.sync(&url)
    }

    /// Navigate and add a history entry.
    pub fn push(&mut self, target: impl Into<Target>) -> NavigationResult {
        self.navigate(target.into(), NavigateOp::Push)
    }

    /// Navigate and overwrite the current history entry.
    pub fn replace(&mut self, target: impl Into<Target>) -> NavigationResult {
        self.navigate(target.into(), NavigateOp::Replace)
    }

    /// Adopt `url`, which is already the current history entry.
    ///
    /// History is only touched when the canonical URL differs from `url`
    /// (a redirect or a non-canonical query order), and then with a replace.
    pub fn sync(&mut self, url: &str) -> NavigationResult {
        let pending = self.begin_with(Target::from_url(url), NavigateOp::Sync, url.to_string());
        let outcome = self.resolve(&pending);
        self.commit(pending, outcome)
    }

    /// Step back in history and sync. `None` at the oldest entry.
    pub fn back(&mut self) -> Option<NavigationResult> {
        self.go(-1)
    }

    /// Step forward in history and sync. `None` at the newest entry.
    pub fn forward(&mut self) -> Option<NavigationResult> {
        self.go(1)
    }

    /// Traverse history by `delta` entries and sync.
    pub fn go(&mut self, delta: isize) -> Option<NavigationResult> {
        let url = self.history.go(delta)?;
        Some(self.sync(&url))
    }

    /// Set one query parameter on the current location and replace.
    ///
    /// A falsy `value` (`null`, `false`, `0`, `""`) removes the parameter.
    pub fn replace_query_param(&mut self, key: &str, value: impl Into<Value>) -> NavigationResult {
        let current = self.location();
        let mut query = current.query().clone();
        query.set_json(key, &value.into());
        self.replace(Target::Path {
            path: current.path().to_string(),
            query: Some(query),
        })
    }

    fn navigate(&mut self, target: Target, op: NavigateOp) -> NavigationResult {
        let pending = self.begin(target, op);
        let outcome = self.resolve(&pending);
        self.commit(pending, outcome)
    }

    // ========================================================================
    // Pipeline steps
    // ========================================================================

    /// Start a navigation. Any navigation begun earlier is superseded.
    pub fn begin(&self, target: impl Into<Target>, op: NavigateOp) -> PendingNavigation {
        let target = target.into();
        let requested = target.to_string();
        self.begin_with(target, op, requested)
    }

    fn begin_with(&self, target: Target, op: NavigateOp, requested: String) -> PendingNavigation {
        let id = self.state.start_navigation();
        debug_log!("Navigation #{} {:?}: '{}'", id, op, requested);
        PendingNavigation {
            id,
            target,
            op,
            requested,
        }
    }

    /// Resolve a pending navigation. Has no visible side effects.
    pub fn resolve(&mut self, pending: &PendingNavigation) -> Result<Resolution, NavigationError> {
        let table = Arc::clone(&self.table);
        let max_hops = self.options.max_redirect_hops;

        #[cfg(feature = "cache")]
        let cache = &mut self.cache;
        #[cfg(feature = "cache")]
        let lookup = |path: &str| cache.get_or_resolve(&table, path);
        #[cfg(not(feature = "cache"))]
        let lookup = |path: &str| crate::resolve::resolve_match_stack(&table, path);

        resolve_with(&table, &pending.target, max_hops, lookup)
    }

    /// Apply a resolved navigation if it is still the current one.
    pub fn commit(
        &mut self,
        pending: PendingNavigation,
        outcome: Result<Resolution, NavigationError>,
    ) -> NavigationResult {
        if !self.state.is_navigation_current(pending.id) {
            warn_log!(
                "Navigation #{} to '{}' superseded by #{}, discarding",
                pending.id,
                pending.requested,
                self.state.navigation_id()
            );
            return NavigationResult::Cancelled { id: pending.id };
        }

        let (location, error) = match outcome {
            Ok(resolution) => (Location::from(resolution), None),
            Err(error) => {
                warn_log!("Navigation to '{}' failed: {}", pending.requested, error);
                match &pending.target {
                    Target::Path { path, query } => (
                        Location::not_found(
                            normalize_path(path).into_owned(),
                            query.clone().unwrap_or_default(),
                        ),
                        Some(error),
                    ),
                    // A named target has no URL to show; keep the current location.
                    Target::Named { .. } => return NavigationResult::Error(error),
                }
            }
        };

        let url = location.url();
        let write = match pending.op {
            NavigateOp::Push if self.history.current_url() == url => HistoryWrite::Replace,
            NavigateOp::Push => HistoryWrite::Push,
            NavigateOp::Replace => HistoryWrite::Replace,
            NavigateOp::Sync if pending.requested == url => HistoryWrite::None,
            NavigateOp::Sync => HistoryWrite::Replace,
        };
        match write {
            HistoryWrite::Push => self.history.push(&url),
            HistoryWrite::Replace => self.history.replace(&url),
            HistoryWrite::None => {}
        }

        let (from, location) = self.state.commit(location);
        info_log!(
            "Navigation #{} {:?}: '{}' → '{}' ({} views, history {:?})",
            pending.id,
            pending.op,
            from.as_deref().unwrap_or("-"),
            url,
            location.views().len(),
            write
        );

        let event = RouteChangeEvent {
            from,
            to: url,
            op: pending.op,
            location: Arc::clone(&location),
        };
        for listener in &self.listeners {
            listener(&event);
        }

        match error {
            None => NavigationResult::Success {
                location,
                history: write,
            },
            Some(error) => NavigationResult::NotFound {
                location,
                error,
                history: write,
            },
        }
    }
}

impl<H: History + fmt::Debug> fmt::Debug for Navigator<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Navigator")
            .field("routes", &self.table.len())
            .field("options", &self.options)
            .field("location", &self.state.location().url())
            .field("history", &self.history)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::Route;
    use std::sync::Mutex;

    fn table() -> RouteTable {
        RouteTable::new(vec![
            Route::new("/").children(vec![
                Route::new("").redirect("/home"),
                Route::new("home").name("home").component("Home"),
            ]),
            Route::new("/users/:id").name("user").component("User"),
            Route::new("/loop").redirect("/loop"),
        ])
        .unwrap()
    }

    #[test]
    fn test_start_replaces_redirected_url() {
        let mut nav = Navigator::new(table());
        let result = nav.start();

        assert!(result.is_success());
        assert_eq!(result.history_write(), Some(HistoryWrite::Replace));
        assert_eq!(nav.history().entries(), &["/home".to_string()]);
        assert_eq!(nav.location().redirected_from(), &["/".to_string()]);
    }

    #[test]
    fn test_sync_of_canonical_url_writes_nothing() {
        let mut nav = Navigator::with_history(table(), MemoryHistory::with_url("/users/1"));
        let result = nav.start();
        assert_eq!(result.history_write(), Some(HistoryWrite::None));
        assert_eq!(nav.location().params().get("id"), Some("1"));
    }

    #[test]
    fn test_push_same_url_downgrades_to_replace() {
        let mut nav = Navigator::new(table());
        nav.start();
        assert_eq!(nav.push("/users/1").history_write(), Some(HistoryWrite::Push));
        assert_eq!(nav.push("/users/1").history_write(), Some(HistoryWrite::Replace));
        assert_eq!(nav.history().len(), 2);
    }

    #[test]
    fn test_unmatched_path_commits_not_found() {
        let mut nav = Navigator::new(table());
        nav.start();
        let result = nav.push("/nowhere?x=1");

        assert!(result.is_not_found());
        assert_eq!(result.history_write(), Some(HistoryWrite::Push));
        let location = nav.location();
        assert!(!location.is_matched());
        assert!(location.views().is_empty());
        assert_eq!(nav.history().current_url(), "/nowhere?x=1");
    }

    #[test]
    fn test_redirect_loop_is_not_found() {
        let mut nav = Navigator::new(table())
            .with_options(RouterOptions::default().with_max_redirect_hops(3));
        let result = nav.push("/loop");
        assert_eq!(
            result.error(),
            Some(&NavigationError::RedirectCycle {
                path: "/loop".into(),
                hops: 3
            })
        );
    }

    #[cfg(feature = "cache")]
    #[test]
    fn test_with_options_invalidates_cache() {
        let mut nav = Navigator::new(table());
        nav.start();
        nav.push("/users/1");
        assert!(!nav.cache.is_empty());

        let nav = nav.with_options(RouterOptions::default().with_cache_capacity(8));
        assert!(nav.cache.is_empty());
        assert_eq!(nav.cache.capacity(), 8);
        assert_eq!(nav.cache_stats().invalidations, 1);
        assert_eq!(nav.cache_stats().misses, 3);
    }

    #[test]
    fn test_named_failure_keeps_location() {
        let mut nav = Navigator::new(table());
        nav.start();
        let before = nav.location();
        let result = nav.push(Target::named("missing"));

        assert!(result.is_error());
        assert!(result.location().is_none());
        assert_eq!(
            result.error(),
            Some(&NavigationError::UnknownRouteName {
                name: "missing".into()
            })
        );
        assert_eq!(result.history_write(), Some(HistoryWrite::None));
        assert!(Arc::ptr_eq(&before, &nav.location()));
        assert_eq!(nav.history().len(), 1);
    }

    #[test]
    fn test_superseded_commit_is_cancelled() {
        let mut nav = Navigator::new(table());
        nav.start();
        let before = nav.location();

        let first = nav.begin("/users/1", NavigateOp::Push);
        let second = nav.begin("/users/2", NavigateOp::Push);
        let first_outcome = nav.resolve(&first);
        let second_outcome = nav.resolve(&second);

        let result = nav.commit(first, first_outcome);
        assert!(result.is_cancelled());
        assert!(Arc::ptr_eq(&before, &nav.location()));
        assert_eq!(nav.history().len(), 1);

        assert!(nav.commit(second, second_outcome).is_success());
        assert_eq!(nav.location().path(), "/users/2");
    }

    #[test]
    fn test_listeners_see_every_commit() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut nav = Navigator::new(table());
        let sink = Arc::clone(&seen);
        nav.subscribe(move |event| {
            sink.lock()
                .unwrap()
                .push((event.from.clone(), event.to.clone(), event.op));
        });

        nav.start();
        nav.push("/users/1");
        nav.back();

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                (None, "/home".to_string(), NavigateOp::Sync),
                (Some("/home".to_string()), "/users/1".to_string(), NavigateOp::Push),
                (Some("/users/1".to_string()), "/home".to_string(), NavigateOp::Sync),
            ]
        );
    }

    #[test]
    fn test_replace_query_param() {
        let mut nav = Navigator::with_history(table(), MemoryHistory::with_url("/users/1?a=1"));
        nav.start();

        nav.replace_query_param("b", "2");
        assert_eq!(nav.history().current_url(), "/users/1?a=1&b=2");

        nav.replace_query_param("a", 0);
        assert_eq!(nav.history().current_url(), "/users/1?b=2");
        assert_eq!(nav.history().len(), 1);
        assert_eq!(nav.previous_url(), Some("/users/1?a=1&b=2"));
    }
}
