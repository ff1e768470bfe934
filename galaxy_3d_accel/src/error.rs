//! Error types for the Galaxy3D acceleration structures
//!
//! Building a BVH is mostly silent by contract (empty input and truncated
//! subtrees are not faults), so errors only surface for malformed input
//! meshes, opt-in validation, the strict overflow policy and GPU buffer
//! read-back.

use std::fmt;

/// Result type for acceleration structure operations
pub type Result<T> = std::result::Result<T, Error>;

/// Acceleration structure errors
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Generic invalid argument passed by the caller
    InvalidInput(String),

    /// Mesh data that cannot be turned into triangles
    InvalidMesh(String),

    /// Primitive whose cached bounds are missing or stale
    InvalidPrimitive {
        /// Position of the primitive in the input sequence
        index: usize,
        /// What is wrong with it
        reason: String,
    },

    /// Recursion needed a node slot past the end of the node array
    CapacityExceeded {
        /// Node index the build tried to address
        node_index: usize,
        /// Length of the node array
        capacity: usize,
        /// Primitives in the range that could not be placed
        dropped_primitives: usize,
    },

    /// Byte buffer does not match the GPU record layout
    InvalidLayout {
        /// Expected size in bytes (or record stride)
        expected: usize,
        /// Actual size in bytes
        actual: usize,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            Error::InvalidMesh(msg) => write!(f, "Invalid mesh: {}", msg),
            Error::InvalidPrimitive { index, reason } => {
                write!(f, "Invalid primitive {}: {}", index, reason)
            }
            Error::CapacityExceeded { node_index, capacity, dropped_primitives } => write!(
                f,
                "Node capacity exceeded: index {} >= {} ({} primitives dropped)",
                node_index, capacity, dropped_primitives
            ),
            Error::InvalidLayout { expected, actual } => write!(
                f,
                "Invalid GPU record layout: expected multiple of {} bytes, got {}",
                expected, actual
            ),
        }
    }
}

impl std::error::Error for Error {}

// ===== ERROR MACROS =====

/// Log an ERROR with file:line and build an `Error::InvalidInput`
///
/// # Example
///
/// ```ignore
/// let node = nodes.get(i).ok_or_else(|| accel_err!("galaxy3d::BvhTree", "No node {}", i))?;
/// ```
#[macro_export]
macro_rules! accel_err {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::log::log_detailed(
            $crate::log::LogSeverity::Error,
            $source,
            message.clone(),
            file!(),
            line!(),
        );
        $crate::galaxy3d::Error::InvalidInput(message)
    }};
}

/// Log an ERROR and return early with an `Error::InvalidInput`
#[macro_export]
macro_rules! accel_bail {
    ($source:expr, $($arg:tt)*) => {
        return Err($crate::accel_err!($source, $($arg)*))
    };
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
