//! Router state management

use crate::params::RouteParams;
use crate::props::MountedView;
use crate::query::Query;
use crate::resolution::{canonical_url, Resolution};
use crate::resolve::MatchStack;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// The committed result of a navigation.
///
/// A location is immutable. Each commit swaps in a new `Arc<Location>`, so a
/// handle obtained from [`Navigator::location`](crate::Navigator::location)
/// keeps describing the route it was taken from.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    path: String,
    query: Query,
    params: RouteParams,
    name: Option<String>,
    stack: MatchStack,
    views: Vec<MountedView>,
    redirected_from: Vec<String>,
    matched: bool,
}

impl Location {
    /// A location for a URL no route accounts for. It mounts nothing.
    pub fn not_found(path: impl Into<String>, query: Query) -> Self {
        Self {
            path: path.into(),
            query,
            params: RouteParams::new(),
            name: None,
            stack: MatchStack::new(),
            views: Vec::new(),
            redirected_from: Vec::new(),
            matched: false,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn params(&self) -> &RouteParams {
        &self.params
    }

    /// Name of the matched leaf route.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn stack(&self) -> &MatchStack {
        &self.stack
    }

    /// Views to mount, root first.
    pub fn views(&self) -> &[MountedView] {
        &self.views
    }

    /// The deepest mounted view for `slot`.
    pub fn view(&self, slot: &str) -> Option<&MountedView> {
        self.views.iter().rev().find(|v| v.slot == slot)
    }

    /// URLs this location was redirected from, oldest first.
    pub fn redirected_from(&self) -> &[String] {
        &self.redirected_from
    }

    /// `false` for not-found locations.
    pub fn is_matched(&self) -> bool {
        self.matched
    }

    /// Canonical URL of this location.
    pub fn url(&self) -> String {
        canonical_url(&self.path, &self.query)
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::not_found("/", Query::new())
    }
}

impl From<Resolution> for Location {
    fn from(res: Resolution) -> Self {
        Self {
            path: res.path,
            query: res.query,
            params: res.params,
            name: res.name,
            stack: res.stack,
            views: res.views,
            redirected_from: res.redirects,
            matched: true,
        }
    }
}

/// Router state
#[derive(Debug)]
pub struct RouterState {
    /// Current committed location
    location: Arc<Location>,
    /// URL of the location replaced by the last commit
    previous_url: Option<String>,
    /// Whether anything has been committed yet
    committed: bool,
    /// Navigation ID counter for cancellation tracking.
    /// Each navigation increments this, allowing detection of stale navigations
    navigation_id: Arc<AtomicUsize>,
}

impl RouterState {
    /// Create a new router state
    pub fn new() -> Self {
        Self {
            location: Arc::new(Location::default()),
            previous_url: None,
            committed: false,
            navigation_id: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Get current navigation ID
    pub fn navigation_id(&self) -> usize {
        self.navigation_id.load(Ordering::SeqCst)
    }

    /// Start a new navigation and return the new navigation ID
    ///
    /// This increments the navigation counter, allowing previous navigations
    /// to detect they've been superseded and should be cancelled.
    pub fn start_navigation(&self) -> usize {
        self.navigation_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Check if a navigation is still current (not cancelled by newer navigation)
    pub fn is_navigation_current(&self, nav_id: usize) -> bool {
        self.navigation_id() == nav_id
    }

    /// The committed location.
    pub fn location(&self) -> &Arc<Location> {
        &self.location
    }

    /// URL before the last commit; `None` until the second commit.
    pub fn previous_url(&self) -> Option<&str> {
        self.previous_url.as_deref()
    }

    /// Swap in a new location and return it with the URL it replaced.
    pub fn commit(&mut self, location: Location) -> (Option<String>, Arc<Location>) {
        let from = self.committed.then(|| self.location.url());
        self.location = Arc::new(location);
        self.previous_url.clone_from(&from);
        self.committed = true;
        (from, Arc::clone(&self.location))
    }
}

impl Default for RouterState {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for RouterState {
    fn clone(&self) -> Self {
        Self {
            location: Arc::clone(&self.location),
            previous_url: self.previous_url.clone(),
            committed: self.committed,
            // Share the counter, not its value
            navigation_id: Arc::clone(&self.navigation_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigation_ids() {
        let state = RouterState::new();
        assert_eq!(state.navigation_id(), 0);

        let first = state.start_navigation();
        assert!(state.is_navigation_current(first));

        let second = state.start_navigation();
        assert!(!state.is_navigation_current(first));
        assert!(state.is_navigation_current(second));

        let clone = state.clone();
        clone.start_navigation();
        assert!(!state.is_navigation_current(second));
    }

    #[test]
    fn test_commit_tracks_previous_url() {
        let mut state = RouterState::new();
        let before = Arc::clone(state.location());

        let (from, now) = state.commit(Location::not_found("/a", Query::parse("x=1")));
        assert_eq!(from, None);
        assert_eq!(now.url(), "/a?x=1");
        assert_eq!(state.previous_url(), None);

        let (from, _) = state.commit(Location::not_found("/b", Query::new()));
        assert_eq!(from.as_deref(), Some("/a?x=1"));
        assert_eq!(state.previous_url(), Some("/a?x=1"));

        // Old handles are untouched
        assert_eq!(before.path(), "/");
        assert!(!before.is_matched());
    }
}
