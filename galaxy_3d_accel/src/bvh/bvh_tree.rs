/// Implicit median-split BVH over triangles.
///
/// The whole tree lives in one `Vec<BvhNode>` sized for a complete binary
/// tree of `ceil(log2 n) + 1` levels. Node `i` has its children at
/// `2i + 1` and `2i + 2`, so the array is directly uploadable once
/// flattened by `serialize`.
///
/// Each internal node splits its primitive range at the median index along
/// the longest axis of its bounds. With that split the balanced allocation
/// always suffices; a `max_depth` cap in `BuildConfig` can make ranges run
/// out of slots, in which case the subtree is dropped and reported.

use crate::error::{Error, Result};
use crate::{accel_bail, accel_debug, accel_error, accel_trace, accel_warn};
use super::aabb::AABB;
use super::build_config::{BuildConfig, BuildStats, DroppedRange, OverflowPolicy};
use super::bvh_node::BvhNode;
use super::gpu_record::{GpuBvhData, GpuBvhRecord};
use super::triangle::Triangle;

const SOURCE: &str = "galaxy3d::BvhTree";

/// Implicit BVH, rebuilt from scratch for every scene.
#[derive(Debug, Clone, Default)]
pub struct BvhTree {
    nodes: Vec<BvhNode>,
}

impl BvhTree {
    /// Create an empty tree
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Build a tree with the default configuration.
    ///
    /// `primitives` is reordered in place (see `build`).
    pub fn from_primitives(primitives: &mut [Triangle]) -> Result<Self> {
        let mut tree = Self::new();
        tree.build(primitives)?;
        Ok(tree)
    }

    /// Build with the default configuration.
    ///
    /// See `build_with_config`.
    pub fn build(&mut self, primitives: &mut [Triangle]) -> Result<BuildStats> {
        self.build_with_config(primitives, &BuildConfig::default())
    }

    /// Replace the tree with a fresh build over `primitives`.
    ///
    /// The slice is partitioned in place: after the call its order is
    /// unspecified and any external index into it (such as a geometry's
    /// face range) is invalid. Leaves keep their own copy of their triangle,
    /// the slice is not retained.
    ///
    /// An empty slice leaves the tree empty. With the default
    /// `OverflowPolicy::Truncate` the build never fails on its own; ranges
    /// that do not fit are listed in the returned stats.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidPrimitive` when `validate_bounds` is set and a
    ///   primitive's cached bounds are unusable
    /// - `Error::CapacityExceeded` under `OverflowPolicy::Fail`
    /// - `Error::InvalidInput` for `max_depth == Some(0)`
    ///
    /// On error the tree is left empty.
    pub fn build_with_config(
        &mut self,
        primitives: &mut [Triangle],
        config: &BuildConfig,
    ) -> Result<BuildStats> {
        self.nodes.clear();

        if config.max_depth == Some(0) {
            accel_bail!(SOURCE, "max_depth must be at least 1 (the root level)");
        }

        if primitives.is_empty() {
            accel_debug!(SOURCE, "Empty primitive list, tree left empty");
            return Ok(BuildStats::default());
        }

        if config.validate_bounds {
            Self::validate_primitives(primitives)?;
        }

        let balanced = Self::balanced_depth(primitives.len());
        let depth = config.max_depth.map_or(balanced, |cap| balanced.min(cap));
        let node_count = Self::node_count_for_depth(depth);
        self.nodes = vec![BvhNode::default(); node_count];

        let mut stats = BuildStats {
            primitive_count: primitives.len(),
            node_count,
            ..Default::default()
        };

        if let Err(error) = self.build_recursive(0, 1, primitives, config.overflow, &mut stats) {
            self.nodes.clear();
            return Err(error);
        }

        accel_debug!(
            SOURCE,
            "Built BVH: {} primitives, {} slots ({} used), {} leaves, depth {}",
            stats.primitive_count,
            stats.node_count,
            stats.used_nodes,
            stats.leaf_count,
            stats.max_depth_reached
        );
        if !stats.is_complete() {
            accel_warn!(
                SOURCE,
                "{} primitives in {} subtrees did not fit in {} slots and were dropped",
                stats.dropped_primitives(),
                stats.dropped.len(),
                stats.node_count
            );
        }

        Ok(stats)
    }

    fn build_recursive(
        &mut self,
        node_index: usize,
        depth: u32,
        primitives: &mut [Triangle],
        overflow: OverflowPolicy,
        stats: &mut BuildStats,
    ) -> Result<()> {
        if primitives.is_empty() {
            return Ok(());
        }

        if node_index >= self.nodes.len() {
            return match overflow {
                OverflowPolicy::Truncate => {
                    accel_trace!(
                        SOURCE,
                        "Dropping {} primitives rooted at slot {}",
                        primitives.len(),
                        node_index
                    );
                    stats.dropped.push(DroppedRange {
                        node_index,
                        primitive_count: primitives.len(),
                    });
                    Ok(())
                }
                OverflowPolicy::Fail => {
                    accel_error!(
                        SOURCE,
                        "Slot {} is past the node array ({} slots)",
                        node_index,
                        self.nodes.len()
                    );
                    Err(Error::CapacityExceeded {
                        node_index,
                        capacity: self.nodes.len(),
                        dropped_primitives: primitives.len(),
                    })
                }
            };
        }

        let bounds = primitives
            .iter()
            .fold(AABB::EMPTY, |acc, primitive| acc.union(&primitive.aabb()));

        stats.used_nodes += 1;
        stats.max_depth_reached = stats.max_depth_reached.max(depth);

        let node = &mut self.nodes[node_index];
        node.idx = Some(node_index as u32);
        node.set_aabb(bounds);

        if primitives.len() == 1 {
            node.is_leaf = true;
            node.has_face = true;
            node.face = primitives[0];
            stats.leaf_count += 1;
            return Ok(());
        }

        let axis = bounds.largest_axis();
        node.axis = axis;

        // Only the median position has to be right, halves stay unordered
        let mid = primitives.len() / 2;
        let a = axis.index();
        primitives.select_nth_unstable_by(mid, |lhs, rhs| {
            lhs.centroid()[a].total_cmp(&rhs.centroid()[a])
        });

        let (left, right) = primitives.split_at_mut(mid);
        self.build_recursive(BvhNode::left_child_index(node_index), depth + 1, left, overflow, stats)?;
        self.build_recursive(BvhNode::right_child_index(node_index), depth + 1, right, overflow, stats)
    }

    fn validate_primitives(primitives: &[Triangle]) -> Result<()> {
        for (index, primitive) in primitives.iter().enumerate() {
            if let Some(reason) = primitive.bounds_problem() {
                accel_error!(SOURCE, "Primitive {} rejected: {}", index, reason);
                return Err(Error::InvalidPrimitive { index, reason });
            }
        }
        Ok(())
    }

    /// Levels of a balanced median-split tree over `n` primitives:
    /// `ceil(log2 n) + 1` (0 for no primitives).
    pub fn balanced_depth(n: usize) -> u32 {
        match n {
            0 => 0,
            n => n.next_power_of_two().trailing_zeros() + 1,
        }
    }

    /// Slots in a complete binary tree of `depth` levels: `2^depth - 1`.
    pub fn node_count_for_depth(depth: u32) -> usize {
        1usize.checked_shl(depth).map_or(usize::MAX, |count| count - 1)
    }

    // ===== ACCESSORS =====

    /// All node slots, built or not, in index order
    pub fn nodes(&self) -> &[BvhNode] {
        &self.nodes
    }

    /// Node slot `index`
    pub fn node(&self, index: usize) -> Option<&BvhNode> {
        self.nodes.get(index)
    }

    /// Root node, `None` for an empty tree
    pub fn root(&self) -> Option<&BvhNode> {
        self.nodes.first()
    }

    /// Number of slots (= serialized record count)
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Levels the node array was sized for
    pub fn depth(&self) -> u32 {
        (self.nodes.len() + 1).trailing_zeros()
    }

    /// Face leaves in index order
    pub fn leaves(&self) -> impl Iterator<Item = &BvhNode> + '_ {
        self.nodes.iter().filter(|node| node.has_face)
    }

    /// Drop all nodes
    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    // ===== GPU FLATTENING =====

    /// One record per node slot, in index order.
    ///
    /// Default slots are included so that record `i` always mirrors
    /// node `i` and child indices stay valid on the GPU.
    pub fn serialize(&self) -> Vec<GpuBvhRecord> {
        self.nodes.iter().map(GpuBvhRecord::from_node).collect()
    }

    /// Append one record per node slot to `records`.
    pub fn serialize_into(&self, records: &mut Vec<GpuBvhRecord>) {
        records.reserve(self.nodes.len());
        records.extend(self.nodes.iter().map(GpuBvhRecord::from_node));
    }

    /// Records plus counts, ready for a structured buffer upload.
    pub fn to_gpu_data(&self) -> GpuBvhData {
        GpuBvhData {
            records: self.serialize(),
            node_count: self.nodes.len() as u32,
            leaf_count: self.leaves().count() as u32,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "bvh_tree_tests.rs"]
mod tests;
