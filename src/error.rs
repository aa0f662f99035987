//! Error handling for the router.
//!
//! - [`NavigationError`]: why a target could not be resolved to a mounted
//!   view set (unmatched path, redirect cycle, unknown route name, ...).
//! - [`NavigationResult`]: the outcome of a navigation as seen by the
//!   presentation layer: `Success`, `NotFound`, `Error` or `Cancelled`.
//!   Errors never escape the [`Navigator`](crate::Navigator): an unresolvable
//!   path commits a not-found location, anything else is reported as `Error`
//!   without touching the committed state.
//!
//! Route table construction has its own error type,
//! [`RouteTableError`](crate::table::RouteTableError).
//!
//! ```
//! use workflow_navigator::NavigationError;
//!
//! let error = NavigationError::UnmatchedRoute { path: "/nowhere".into() };
//! assert_eq!(error.to_string(), "no route matches '/nowhere'");
//! ```

use crate::history::HistoryWrite;
use crate::state::Location;
use std::sync::Arc;
use thiserror::Error;

/// Detailed reasons a navigation target failed to resolve.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    /// No route pattern accounts for the whole path.
    #[error("no route matches '{path}'")]
    UnmatchedRoute { path: String },

    /// The redirect hop bound was exceeded.
    #[error("redirect limit of {hops} hops exceeded navigating to '{path}'")]
    RedirectCycle { path: String, hops: usize },

    /// A named target refers to a name missing from the table.
    #[error("unknown route name '{name}'")]
    UnknownRouteName { name: String },

    /// A named target or path template lacks a parameter value.
    #[error("route '{route}' requires parameter '{param}'")]
    MissingParam { route: String, param: String },

    /// A redirect produced a path template that does not compile.
    #[error("invalid redirect target '{target}': {reason}")]
    InvalidTarget { target: String, reason: String },
}

impl NavigationError {
    /// `true` for errors caused by the URL itself rather than the route table.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            NavigationError::UnmatchedRoute { .. } | NavigationError::RedirectCycle { .. }
        )
    }
}

/// Outcome of a navigation attempt.
#[derive(Debug, Clone)]
pub enum NavigationResult {
    /// A terminal route matched and the new location was committed.
    Success {
        location: Arc<Location>,
        history: HistoryWrite,
    },
    /// Nothing matched (or the redirect chain was cut off). `location` is the
    /// committed not-found location with an empty view set.
    NotFound {
        location: Arc<Location>,
        error: NavigationError,
        history: HistoryWrite,
    },
    /// The target could not be turned into a URL (unknown route name, missing
    /// parameter). Nothing was committed and history was not written.
    Error(NavigationError),
    /// A newer navigation started before this one committed; nothing changed.
    Cancelled { id: usize },
}

impl NavigationResult {
    /// Check if navigation was successful
    pub fn is_success(&self) -> bool {
        matches!(self, NavigationResult::Success { .. })
    }

    /// Check if route was not found
    pub fn is_not_found(&self) -> bool {
        matches!(self, NavigationResult::NotFound { .. })
    }

    /// Check if the target was rejected before anything was committed
    pub fn is_error(&self) -> bool {
        matches!(self, NavigationResult::Error(_))
    }

    /// Check if navigation was superseded
    pub fn is_cancelled(&self) -> bool {
        matches!(self, NavigationResult::Cancelled { .. })
    }

    /// The location committed by this navigation, if any.
    pub fn location(&self) -> Option<&Arc<Location>> {
        match self {
            NavigationResult::Success { location, .. }
            | NavigationResult::NotFound { location, .. } => Some(location),
            NavigationResult::Error(_) | NavigationResult::Cancelled { .. } => None,
        }
    }

    /// The history write performed, or `None` for cancelled navigations.
    pub fn history_write(&self) -> Option<HistoryWrite> {
        match self {
            NavigationResult::Success { history, .. }
            | NavigationResult::NotFound { history, .. } => Some(*history),
            NavigationResult::Error(_) => Some(HistoryWrite::None),
            NavigationResult::Cancelled { .. } => None,
        }
    }

    /// The resolution error for a not-found or rejected outcome.
    pub fn error(&self) -> Option<&NavigationError> {
        match self {
            NavigationResult::NotFound { error, .. } | NavigationResult::Error(error) => {
                Some(error)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigation_error_display() {
        let error = NavigationError::RedirectCycle {
            path: "/a".to_string(),
            hops: 10,
        };
        assert_eq!(
            error.to_string(),
            "redirect limit of 10 hops exceeded navigating to '/a'"
        );

        let error = NavigationError::MissingParam {
            route: "workflow/history".to_string(),
            param: "runId".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "route 'workflow/history' requires parameter 'runId'"
        );
    }

    #[test]
    fn test_not_found_classification() {
        assert!(NavigationError::UnmatchedRoute { path: "/x".into() }.is_not_found());
        assert!(NavigationError::RedirectCycle {
            path: "/x".into(),
            hops: 3
        }
        .is_not_found());
        assert!(!NavigationError::UnknownRouteName { name: "x".into() }.is_not_found());
    }

    #[test]
    fn test_result_predicates() {
        let location = Arc::new(Location::default());
        let result = NavigationResult::Success {
            location: Arc::clone(&location),
            history: HistoryWrite::Push,
        };
        assert!(result.is_success());
        assert!(!result.is_not_found());
        assert_eq!(result.history_write(), Some(HistoryWrite::Push));
        assert!(result.error().is_none());

        let result = NavigationResult::NotFound {
            location,
            error: NavigationError::UnmatchedRoute { path: "/".into() },
            history: HistoryWrite::None,
        };
        assert!(result.is_not_found());
        assert!(result.error().is_some());

        let result = NavigationResult::Error(NavigationError::UnknownRouteName {
            name: "x".into(),
        });
        assert!(result.is_error());
        assert!(!result.is_not_found());
        assert!(result.location().is_none());
        assert_eq!(result.history_write(), Some(HistoryWrite::None));

        let result = NavigationResult::Cancelled { id: 3 };
        assert!(result.is_cancelled());
        assert!(result.location().is_none());
        assert!(result.history_write().is_none());
    }
}
