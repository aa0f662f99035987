//! Navigator configuration.

/// Tunables for a [`Navigator`](crate::Navigator).
///
/// ```
/// use workflow_navigator::RouterOptions;
///
/// let options = RouterOptions::default().with_max_redirect_hops(4);
/// assert_eq!(options.max_redirect_hops, 4);
/// assert_eq!(options.cache_capacity, 256);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouterOptions {
    /// Redirect hops followed before a navigation is treated as unmatched.
    pub max_redirect_hops: usize,
    /// Match stacks kept by the resolution cache (feature `cache`).
    pub cache_capacity: usize,
}

impl RouterOptions {
    pub const DEFAULT_MAX_REDIRECT_HOPS: usize = 10;
    pub const DEFAULT_CACHE_CAPACITY: usize = 256;

    pub fn with_max_redirect_hops(mut self, hops: usize) -> Self {
        self.max_redirect_hops = hops;
        self
    }

    /// A capacity of zero is raised to one.
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            max_redirect_hops: Self::DEFAULT_MAX_REDIRECT_HOPS,
            cache_capacity: Self::DEFAULT_CACHE_CAPACITY,
        }
    }
}
