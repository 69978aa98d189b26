//! Dual contouring mesher for signed distance fields.
//!
//! Given an [`ImplicitFunction`] — a signed distance oracle paired with an
//! axis-aligned bounding box — [`Mesher::tessellate`] produces a uniform-voxel
//! dual contoured triangle mesh that preserves sharp features. The mesher does
//! one pass over a dense voxel grid; it does not adaptively refine, repair
//! non-manifold output, or simplify the result. Those concerns, along with
//! constructing the distance field itself and writing it to a file format,
//! belong to the caller.
//!
//! The pipeline, leaf components first:
//!
//! - [`cache::EvaluationCache`] memoises oracle calls at voxel corners.
//! - [`grid::VoxelGrid`] derives the cell count and cell size from the
//!   oracle's bounding box and the configured resolution.
//! - [`edge`] locates surface crossings on voxel edges by sphere tracing with
//!   a bisection fallback.
//! - [`normal`] estimates the surface normal at a point by central
//!   differences.
//! - [`qef::Qef`] places a single vertex per surface-crossing voxel by
//!   least-squares on the planes collected from its crossings.
//! - [`dual_contouring::Mesher`] drives the per-cell vertex placement and
//!   stitches neighbouring cells' vertices into triangles.

pub mod cache;
pub mod config;
pub mod dual_contouring;
pub mod edge;
pub mod error;
pub mod grid;
pub mod mesh;
pub mod normal;
pub mod qef;
pub mod warnings;

pub use bbox::BoundingBox;
pub use config::MesherConfig;
pub use dual_contouring::Mesher;
pub use error::MesherError;
pub use mesh::{TriangleMesh, TriangleSink};
pub use qef::Plane;

use alga::general::Real;
use na::Point3;

pub(crate) use nalgebra as na;

/// The signed distance oracle the mesher consumes.
///
/// Implementations must be deterministic: calling `value` twice with the
/// same point has to return the same scalar. `bbox` bounds the region the
/// mesher is allowed to sample; the mesher never evaluates outside it.
pub trait ImplicitFunction<S: Real> {
    /// The axis-aligned region to mesh. `bbox.min` must be strictly less
    /// than `bbox.max` on every axis.
    fn bbox(&self) -> &BoundingBox<S>;
    /// Signed distance to the nearest surface at `p`: negative inside,
    /// positive outside.
    fn value(&self, p: &Point3<S>) -> S;
}

/// Rounds a scalar to the nearest non-negative `usize`, the way voxel counts
/// are derived from a bounding box size divided by a resolution.
pub trait RoundAsUsize {
    fn round_as_usize(self) -> usize;
}

impl RoundAsUsize for f32 {
    fn round_as_usize(self) -> usize {
        self.round().max(0.) as usize
    }
}

impl RoundAsUsize for f64 {
    fn round_as_usize(self) -> usize {
        self.round().max(0.) as usize
    }
}
