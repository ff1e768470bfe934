//! Implicit BVH module
//!
//! Builds a pointer-free, heap-indexed BVH over triangles (one triangle per
//! leaf, median split on the longest axis) and flattens it into a
//! fixed-layout record array for the GPU traversal kernel.
//!
//! ```text
//! &mut [Triangle] → BvhTree::build → Vec<BvhNode> → BvhTree::serialize → Vec<GpuBvhRecord>
//! ```

mod aabb;
mod build_config;
mod bvh_node;
mod bvh_tree;
mod gpu_record;
mod traversal;
mod triangle;

pub use aabb::{AABB, Axis};
pub use build_config::{BuildConfig, BuildStats, DroppedRange, OverflowPolicy};
pub use bvh_node::BvhNode;
pub use bvh_tree::BvhTree;
pub use gpu_record::{GpuBvhData, GpuBvhRecord, GPU_BVH_RECORD_SIZE};
pub use traversal::{intersect_records, intersect_triangle, Hit, Ray};
pub use triangle::Triangle;
