//! Pre-validation failures: the only error kind that can stop a render.
//!
//! Everything past this point (singular QEFs, raycast non-convergence,
//! far-away vertices, missing stitch neighbours) is recovered locally and
//! only surfaced through [`crate::warnings::Diagnostics`].

use thiserror::Error;

/// Failure to even start a render.
#[derive(Debug, Error, PartialEq)]
pub enum MesherError {
    /// The oracle's bounding box does not have `min < max` on every axis.
    #[error("oracle bounding box is empty or inverted")]
    EmptyBoundingBox,
    /// `mesh_cells` was zero.
    #[error("mesh_cells must be greater than zero")]
    NonPositiveMeshCells,
}
