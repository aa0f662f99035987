//! Test utilities shared by the integration tests
//!
//! Provides fixtures, helpers, and assertion utilities.

#![allow(dead_code)]

use workflow_navigator::*;

/// Route router logs to the test output. Set `RUST_LOG=workflow_navigator=trace`
/// to see them.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// The application route table.
pub fn workflow_table() -> RouteTable {
    workflow_routes::route_table().expect("workflow route table is valid")
}

/// A navigator whose history starts at `url`, already started.
pub fn started_at(url: &str) -> (Navigator, NavigationResult) {
    init_logging();
    let mut nav = Navigator::with_history(workflow_table(), MemoryHistory::with_url(url));
    let result = nav.start();
    (nav, result)
}

/// Props of the deepest view mounted in `slot`.
pub fn slot_props(location: &Location, slot: &str) -> Props {
    location
        .view(slot)
        .unwrap_or_else(|| panic!("no view mounted in slot '{}'", slot))
        .props()
        .unwrap_or_else(|| panic!("props for slot '{}' failed", slot))
        .clone()
}

/// Assert that route parameters contain expected key-value pair
pub fn assert_param_equals(params: &RouteParams, key: &str, expected: &str) {
    let value = params.get(key);
    assert!(
        value.is_some(),
        "Parameter '{}' not found in RouteParams",
        key
    );
    assert_eq!(
        value.unwrap(),
        expected,
        "Parameter '{}' has wrong value",
        key
    );
}

/// Assert that route parameters do NOT contain a key
pub fn assert_param_not_present(params: &RouteParams, key: &str) {
    assert!(
        params.get(key).is_none(),
        "Parameter '{}' should not be present",
        key
    );
}

/// Create RouteParams with multiple key-value pairs
pub fn params_with(pairs: &[(&str, &str)]) -> RouteParams {
    pairs.iter().copied().collect()
}

/// Route names along a match stack, root first (`-` for unnamed routes).
pub fn chain_names(table: &RouteTable, stack: &MatchStack) -> Vec<String> {
    stack
        .route_ids()
        .map(|id| table.node(id).name().unwrap_or("-").to_string())
        .collect()
}
