//! BVH build configuration and build report.

/// What to do when the recursion addresses a slot past the node array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverflowPolicy {
    /// Drop the subtree, record it in `BuildStats::dropped` and keep going
    #[default]
    Truncate,
    /// Abort the build with `Error::CapacityExceeded`
    Fail,
}

/// Build configuration
///
/// # Example
///
/// ```
/// use galaxy_3d_accel::galaxy3d::bvh::{BuildConfig, OverflowPolicy};
///
/// let config = BuildConfig::default()
///     .with_max_depth(12)
///     .with_overflow_policy(OverflowPolicy::Fail);
/// assert_eq!(config.max_depth, Some(12));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BuildConfig {
    /// Upper bound on tree levels (root = 1). `None` sizes the array for
    /// a balanced build: `ceil(log2 n) + 1` levels.
    pub max_depth: Option<u32>,
    /// Behavior when a subtree does not fit the node array
    pub overflow: OverflowPolicy,
    /// Reject primitives whose cached bounds are non-finite, inverted or
    /// disagree with their vertices (off by default: stale bounds are a
    /// caller error)
    pub validate_bounds: bool,
}

impl BuildConfig {
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    pub fn with_overflow_policy(mut self, overflow: OverflowPolicy) -> Self {
        self.overflow = overflow;
        self
    }

    pub fn with_validate_bounds(mut self, validate_bounds: bool) -> Self {
        self.validate_bounds = validate_bounds;
        self
    }
}

/// A primitive range that did not fit in the node array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DroppedRange {
    /// Slot the range would have been rooted at
    pub node_index: usize,
    /// Primitives in the range
    pub primitive_count: usize,
}

/// Summary of one build.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BuildStats {
    /// Primitives handed to the build
    pub primitive_count: usize,
    /// Node array length (= serialized record count)
    pub node_count: usize,
    /// Slots the build wrote
    pub used_nodes: usize,
    /// Face leaves
    pub leaf_count: usize,
    /// Deepest level written (root = 1, 0 for an empty build)
    pub max_depth_reached: u32,
    /// Subtrees dropped for lack of slots
    pub dropped: Vec<DroppedRange>,
}

impl BuildStats {
    /// Total primitives missing from the tree
    pub fn dropped_primitives(&self) -> usize {
        self.dropped.iter().map(|range| range.primitive_count).sum()
    }

    /// Every primitive ended up in a leaf
    pub fn is_complete(&self) -> bool {
        self.dropped.is_empty()
    }
}
