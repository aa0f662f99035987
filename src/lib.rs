//! # workflow-navigator
//!
//! Route resolution for a single-page workflow-execution UI. The crate turns a
//! URL into the set of views to mount, the properties each view receives and
//! the history write to perform. Rendering, fetching and the browser itself
//! stay outside.
//!
//! ## Pieces
//!
//! - [`query`]: bracket-notation query codec (`a[b]=1`, `a[]=1&a[]=2`).
//! - [`Route`] / [`RouteTable`]: declarative routes flattened into an arena.
//! - [`resolve`]: first-match matcher with backtracking, producing a
//!   [`MatchStack`].
//! - [`props`]: per-slot property derivation.
//! - [`redirect`] / [`resolution`]: targets, redirect rules and the bounded
//!   redirect loop.
//! - [`Navigator`]: begin / resolve / commit with last-request-wins
//!   cancellation, history writes and change listeners.
//! - [`workflow_routes`]: the application's route table.
//!
//! ## Quick start
//!
//! ```
//! use workflow_navigator::{workflow_routes, History, MemoryHistory, Navigator};
//!
//! let history = MemoryHistory::with_url(
//!     "/namespaces/ns1/workflows/wf1/run1/history?eventId=42",
//! );
//! let mut nav = Navigator::with_history(workflow_routes::route_table().unwrap(), history);
//! let result = nav.start();
//! assert!(result.is_success());
//!
//! let location = nav.location();
//! assert_eq!(location.name(), Some("workflow/history"));
//! let props = location.view("history").and_then(|v| v.props()).unwrap();
//! assert_eq!(props["eventId"], 42);
//! assert_eq!(props["format"], "grid");
//!
//! nav.replace_query_param("format", "compact");
//! assert_eq!(
//!     nav.history().current_url(),
//!     "/namespaces/ns1/workflows/wf1/run1/history?eventId=42&format=compact"
//! );
//! ```
//!
//! ## Features
//!
//! - `log` (default): diagnostics through the `log` crate.
//! - `tracing`: diagnostics through `tracing` instead.
//! - `cache` (default): LRU cache of path → match stack.

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod logging;

#[cfg(feature = "cache")]
#[cfg_attr(docsrs, doc(cfg(feature = "cache")))]
pub mod cache;
pub mod error;
pub mod history;
pub mod matching;
pub mod navigator;
pub mod options;
pub mod params;
pub mod props;
pub mod query;
pub mod redirect;
pub mod resolution;
pub mod resolve;
pub mod route;
pub mod state;
pub mod table;
pub mod workflow_routes;

pub use error::{NavigationError, NavigationResult};
pub use history::{History, HistoryWrite, MemoryHistory};
pub use matching::normalize_path;
pub use navigator::{NavigateOp, Navigator, PendingNavigation, RouteChangeEvent};
pub use options::RouterOptions;
pub use params::RouteParams;
pub use props::{MountedView, Props, PropsError, PropsRule};
pub use query::{Query, QueryValue};
pub use redirect::{RedirectRule, Target};
pub use resolution::Resolution;
pub use resolve::{MatchEntry, MatchStack};
pub use route::{Route, RouteContext, DEFAULT_SLOT};
pub use state::Location;
pub use table::{RouteId, RouteNode, RouteTable, RouteTableError};
