/// Tuning knobs for a [`Registry`](super::Registry).
///
/// ```ignore
/// let registry = Registry::with_config(Config::new().with_min_free_indices(0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    min_free_indices: usize,
}

impl Config {
    /// Freed indices pooled before any of them is reused.
    pub const DEFAULT_MIN_FREE_INDICES: usize = 1024;

    /// Construct the default configuration.
    #[inline]
    pub const fn new() -> Self {
        Self {
            min_free_indices: Self::DEFAULT_MIN_FREE_INDICES,
        }
    }

    /// Only reuse a freed index once more than `count` indices are waiting in the pool.
    ///
    /// A larger value spreads reuse of any one index over more destroy calls, so a stale handle
    /// needs more generations to wrap before it aliases a live entity.
    #[inline]
    pub const fn with_min_free_indices(mut self, count: usize) -> Self {
        self.min_free_indices = count;
        self
    }

    #[inline]
    pub const fn min_free_indices(&self) -> usize {
        self.min_free_indices
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pools_1024_indices() {
        assert_eq!(Config::default().min_free_indices(), 1024);
        assert_eq!(Config::default(), Config::new());
    }

    #[test]
    fn builder_overrides_pool_size() {
        // When
        let config = Config::new().with_min_free_indices(8);

        // Then
        assert_eq!(config.min_free_indices(), 8);
    }
}
