/// One slot of the implicit (heap-indexed) BVH array.
///
/// A node has no pointers: the children of slot `i` are slots `2i + 1`
/// and `2i + 2`. Slots the build never reached keep their default value
/// (`idx == None`, inverted bounds, not a leaf).

use glam::Vec3;
use super::aabb::{AABB, Axis};
use super::triangle::Triangle;

/// A node of the implicit BVH.
#[derive(Debug, Clone, PartialEq)]
pub struct BvhNode {
    /// Own slot index once built, `None` for untouched slots
    pub idx: Option<u32>,
    /// Union bounds of every primitive beneath this node
    pub min_corner: Vec3,
    pub max_corner: Vec3,
    /// No children will be built below this node
    pub is_leaf: bool,
    /// Leaf that stores exactly one triangle in `face`
    pub has_face: bool,
    /// Split axis (internal nodes only)
    pub axis: Axis,
    /// Embedded primitive, valid only when `has_face`
    pub face: Triangle,
}

impl Default for BvhNode {
    fn default() -> Self {
        Self {
            idx: None,
            min_corner: AABB::UNBUILT.min,
            max_corner: AABB::UNBUILT.max,
            is_leaf: false,
            has_face: false,
            axis: Axis::X,
            face: Triangle::default(),
        }
    }
}

impl BvhNode {
    /// Slot of the left child of slot `index`
    #[inline]
    pub fn left_child_index(index: usize) -> usize {
        index * 2 + 1
    }

    /// Slot of the right child of slot `index`
    #[inline]
    pub fn right_child_index(index: usize) -> usize {
        index * 2 + 2
    }

    /// Slot of the parent of slot `index`, `None` for the root
    #[inline]
    pub fn parent_index(index: usize) -> Option<usize> {
        (index > 0).then(|| (index - 1) / 2)
    }

    /// Whether the build ever wrote this slot
    pub fn is_built(&self) -> bool {
        self.idx.is_some()
    }

    /// Bounds as an `AABB`
    pub fn aabb(&self) -> AABB {
        AABB::new(self.min_corner, self.max_corner)
    }

    /// The embedded triangle, if this is a face leaf
    pub fn face(&self) -> Option<&Triangle> {
        self.has_face.then_some(&self.face)
    }

    pub(crate) fn set_aabb(&mut self, aabb: AABB) {
        self.min_corner = aabb.min;
        self.max_corner = aabb.max;
    }
}
