/// Axis-aligned bounding boxes and split axes.
///
/// `AABB` is the box type shared by triangles, BVH nodes and the
/// host reference traversal. All boxes are world- or local-space
/// depending on how the owning triangle computed them.

use glam::Vec3;

// ===== AXIS =====

/// Coordinate axis used to split a BVH node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Axis {
    #[default]
    X,
    Y,
    Z,
}

impl Axis {
    /// Component index (0 = x, 1 = y, 2 = z)
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

// ===== AABB =====

/// Axis-Aligned Bounding Box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    /// Minimum corner (x, y, z)
    pub min: Vec3,
    /// Maximum corner (x, y, z)
    pub max: Vec3,
}

impl AABB {
    /// Identity for `union`.
    pub const EMPTY: AABB = AABB {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    /// Bounds stored in never-built node slots.
    ///
    /// Finite so the GPU side never reads infinities, inverted so that
    /// no ray or box test can ever hit it.
    pub const UNBUILT: AABB = AABB {
        min: Vec3::splat(f32::MAX),
        max: Vec3::splat(f32::MIN),
    };

    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Smallest box containing three points.
    pub fn from_points(p1: Vec3, p2: Vec3, p3: Vec3) -> Self {
        Self {
            min: p1.min(p2).min(p3),
            max: p1.max(p2).max(p3),
        }
    }

    /// Componentwise union of two boxes.
    #[inline]
    pub fn union(&self, other: &AABB) -> AABB {
        AABB {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Vector from min to max corner.
    #[inline]
    pub fn diagonal(&self) -> Vec3 {
        self.max - self.min
    }

    /// Center of the box.
    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Axis of the largest diagonal component.
    ///
    /// Ties go to x first, then y: x wins any tie it takes part in,
    /// y wins a remaining tie with z.
    pub fn largest_axis(&self) -> Axis {
        let d = self.diagonal();
        if d.x >= d.y && d.x >= d.z {
            Axis::X
        } else if d.y >= d.z {
            Axis::Y
        } else {
            Axis::Z
        }
    }

    /// Whether min <= max on every axis and all corners are finite.
    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min.cmple(self.max).all()
    }

    /// Test if this box fully contains another box.
    pub fn contains(&self, other: &AABB) -> bool {
        self.min.x <= other.min.x && self.max.x >= other.max.x
        && self.min.y <= other.min.y && self.max.y >= other.max.y
        && self.min.z <= other.min.z && self.max.z >= other.max.z
    }

    /// Slab test against a ray given its precomputed inverse direction.
    ///
    /// Returns the entry distance when the ray overlaps the box within
    /// `[t_min, t_max]`. An axis the ray does not move along (infinite
    /// inverse) passes when the origin lies inside that slab, boundary
    /// planes included.
    pub fn hit_distance(&self, origin: Vec3, inv_dir: Vec3, t_min: f32, t_max: f32) -> Option<f32> {
        // Inverted boxes (EMPTY, UNBUILT) would pass the slab test once swapped
        if !self.min.cmple(self.max).all() {
            return None;
        }

        let mut near = t_min;
        let mut far = t_max;
        for axis in 0..3 {
            let (lo, hi, o, inv) = (self.min[axis], self.max[axis], origin[axis], inv_dir[axis]);
            if inv.is_infinite() {
                // 0 * inf would be NaN for an origin on the plane
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }
            let t0 = (lo - o) * inv;
            let t1 = (hi - o) * inv;
            near = near.max(t0.min(t1));
            far = far.min(t0.max(t1));
        }
        (near <= far).then_some(near)
    }
}

impl Default for AABB {
    fn default() -> Self {
        AABB::EMPTY
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "aabb_tests.rs"]
mod tests;
