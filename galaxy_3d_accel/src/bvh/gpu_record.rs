//! GPU record layout for the implicit BVH.
//!
//! The traversal kernel reads the node buffer by byte offset, so the
//! record below is a wire format: field order, padding and size must not
//! change without changing the kernel. Every row is 16 bytes (one `float4`).
//!
//! ```text
//! offset  row
//!      0  min_corner.xyz        | idx (i32, -1 = unbuilt slot)
//!     16  max_corner.xyz        | is_leaf (u32)
//!     32  point1.xyz            | has_face (u32)
//!     48  point2.xyz            | geom_id (i32)
//!     64  point3.xyz, 1
//!     80  normal1.xyz, 1
//!     96  normal2.xyz, 1
//!    112  normal3.xyz, 1
//!    128  tex_coord1.xy         | tex_coord2.xy
//!    144  tex_coord3.xy         | pad (f32) | split_axis (u32)
//!    160  triangle_min.xyz, 1
//!    176  triangle_max.xyz, 1
//!    192  triangle_centroid.xyz, 1
//!    208  (end)
//! ```
//!
//! Non-face records carry an all-zero face block; the kernel tells leaves
//! from placeholders through `is_leaf` / `has_face` only.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use crate::error::{Error, Result};
use super::bvh_node::BvhNode;

/// Byte size of one record
pub const GPU_BVH_RECORD_SIZE: usize = 208;

/// One flattened BVH node (208 bytes, 16-byte aligned rows).
#[repr(C, align(16))]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GpuBvhRecord {
    pub min_corner: [f32; 3],
    pub idx: i32,
    pub max_corner: [f32; 3],
    pub is_leaf: u32,
    pub point1: [f32; 3],
    pub has_face: u32,
    pub point2: [f32; 3],
    pub geom_id: i32,
    pub point3: [f32; 4],
    pub normal1: [f32; 4],
    pub normal2: [f32; 4],
    pub normal3: [f32; 4],
    pub tex_coord1: [f32; 2],
    pub tex_coord2: [f32; 2],
    pub tex_coord3: [f32; 2],
    pub _pad0: f32,
    pub split_axis: u32,
    pub triangle_min: [f32; 4],
    pub triangle_max: [f32; 4],
    pub triangle_centroid: [f32; 4],
}

const _: () = assert!(std::mem::size_of::<GpuBvhRecord>() == GPU_BVH_RECORD_SIZE);
const _: () = assert!(std::mem::align_of::<GpuBvhRecord>() == 16);

#[inline]
fn point4(v: Vec3) -> [f32; 4] {
    v.extend(1.0).to_array()
}

impl GpuBvhRecord {
    /// Project a node onto the record layout.
    pub fn from_node(node: &BvhNode) -> Self {
        let mut record = GpuBvhRecord {
            min_corner: node.min_corner.to_array(),
            idx: node.idx.map_or(-1, |idx| idx as i32),
            max_corner: node.max_corner.to_array(),
            is_leaf: node.is_leaf as u32,
            has_face: node.has_face as u32,
            split_axis: node.axis.index() as u32,
            ..GpuBvhRecord::zeroed()
        };

        if let Some(face) = node.face() {
            record.point1 = face.points[0].to_array();
            record.point2 = face.points[1].to_array();
            record.geom_id = face.geom_id;
            record.point3 = point4(face.points[2]);
            record.normal1 = point4(face.normals[0]);
            record.normal2 = point4(face.normals[1]);
            record.normal3 = point4(face.normals[2]);
            record.triangle_min = point4(face.min_corner());
            record.triangle_max = point4(face.max_corner());
            record.triangle_centroid = point4(face.centroid());
        }

        record
    }

    /// Whether the record belongs to a slot the build wrote
    pub fn is_built(&self) -> bool {
        self.idx >= 0
    }

    /// Left child slot (`2i + 1`) of this record's slot
    pub fn left_child(&self) -> Option<usize> {
        self.is_built().then(|| BvhNode::left_child_index(self.idx as usize))
    }

    /// Right child slot (`2i + 2`) of this record's slot
    pub fn right_child(&self) -> Option<usize> {
        self.is_built().then(|| BvhNode::right_child_index(self.idx as usize))
    }

    /// Reinterpret a read-back buffer as records.
    ///
    /// # Errors
    ///
    /// `Error::InvalidLayout` when the length is not a whole number of
    /// records or the buffer is not 16-byte aligned.
    pub fn from_bytes(bytes: &[u8]) -> Result<&[GpuBvhRecord]> {
        if bytes.is_empty() {
            return Ok(&[]);
        }
        if bytes.len() % GPU_BVH_RECORD_SIZE != 0 {
            return Err(Error::InvalidLayout {
                expected: GPU_BVH_RECORD_SIZE,
                actual: bytes.len(),
            });
        }
        bytemuck::try_cast_slice(bytes).map_err(|_| Error::InvalidLayout {
            expected: GPU_BVH_RECORD_SIZE,
            actual: bytes.len(),
        })
    }
}

/// Flattened BVH ready for upload.
#[derive(Debug, Clone, Default)]
pub struct GpuBvhData {
    /// One record per node slot
    pub records: Vec<GpuBvhRecord>,
    /// Record count
    pub node_count: u32,
    /// Face leaf count
    pub leaf_count: u32,
}

impl GpuBvhData {
    /// Records as raw bytes for buffer creation
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.records)
    }

    /// Buffer size in bytes
    pub fn byte_len(&self) -> usize {
        self.records.len() * GPU_BVH_RECORD_SIZE
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "gpu_record_tests.rs"]
mod tests;
