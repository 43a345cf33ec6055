/// Initial sizing of a node store.
///
/// Both tables grow by doubling, so these only affect how many reallocations happen early on.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct MddConfig {
    /// Number of node slots allocated up front.
    pub capacity: usize,
    /// Number of primary buckets of the hash-consing table.
    pub buckets: usize,
}

impl MddConfig {
    pub const DEFAULT_CAPACITY: usize = 100;

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    pub fn with_buckets(mut self, buckets: usize) -> Self {
        self.buckets = buckets.max(1);
        self
    }
}

impl Default for MddConfig {
    fn default() -> Self {
        Self {
            capacity: Self::DEFAULT_CAPACITY,
            buckets: 2 * Self::DEFAULT_CAPACITY,
        }
    }
}
