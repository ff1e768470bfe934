/*!
# Galaxy 3D Accel

Spatial acceleration structures for the Galaxy 3D rendering engine.

This crate builds an implicit (pointer-free) BVH over scene triangles and
flattens it into a fixed-layout record array that the compute traversal
kernel reads by byte offset.

## Architecture

- **Triangle**: leaf primitive with cached bounds and centroid
- **BvhTree**: heap-indexed node array, median-split build, GPU serialization
- **GpuBvhRecord**: 208-byte wire record, one per node slot
- **GeometryList**: triangle gathering from indexed meshes
- **Logger**: pluggable diagnostics sink

## Example

```
use galaxy_3d_accel::galaxy3d::bvh::{BvhTree, Triangle};
use galaxy_3d_accel::glam::Vec3;

let mut triangles = vec![
    Triangle::new([Vec3::ZERO, Vec3::X, Vec3::Y], [Vec3::Z; 3], 0),
    Triangle::new([Vec3::splat(2.0), Vec3::new(3.0, 2.0, 2.0), Vec3::new(2.0, 3.0, 2.0)], [Vec3::Z; 3], 0),
];

let tree = BvhTree::from_primitives(&mut triangles)?;
let records = tree.serialize();
assert_eq!(records.len(), 3);
# Ok::<(), galaxy_3d_accel::galaxy3d::Error>(())
```
*/

// Internal modules
mod error;
pub mod log;
pub mod bvh;
pub mod scene;

// Main galaxy3d namespace module
pub mod galaxy3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Logging sub-module (types and logger slot, macros live at crate root)
    pub mod log {
        pub use crate::log::{
            Logger, LogEntry, LogSeverity, DefaultLogger,
            set_logger, reset_logger,
        };
    }

    // BVH sub-module
    pub mod bvh {
        pub use crate::bvh::*;
    }

    // Scene input sub-module
    pub mod scene {
        pub use crate::scene::*;
    }
}

// Re-export math library at crate root
pub use glam;
