//! Derives the voxel grid (cell counts and cell size) from an oracle's
//! bounding box and the configured resolution.

use crate::na;
use crate::{BoundingBox, ImplicitFunction, MesherError, RoundAsUsize};
use alga::general::Real;
use na::{Point3, Vector3};
use num_traits::Float;

/// Widens a bounding box's max corner by a tiny per-axis epsilon, so a
/// point computed to sit exactly on the original max corner (as the far
/// layer of grid corners does) lies strictly inside the widened box instead
/// of exactly on its boundary.
pub(crate) fn widen<S: Real + From<f32>>(bbox: &BoundingBox<S>) -> BoundingBox<S> {
    let eps: S = From::from(1e-12);
    BoundingBox::new(&bbox.min, &(bbox.max + Vector3::new(eps, eps, eps)))
}

/// The uniform voxel grid covering an oracle's bounding box.
#[derive(Clone)]
pub struct VoxelGrid<S> {
    /// The widened bounding box the grid's geometry was derived from; see
    /// [`widen`].
    pub bbox: BoundingBox<S>,
    pub origin: Point3<S>,
    /// Number of cells along each axis.
    pub cells: [usize; 3],
    /// Size of a single cell along each axis.
    pub cell_size: Vector3<S>,
}

impl<S: std::fmt::Debug> std::fmt::Debug for VoxelGrid<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoxelGrid")
            .field("bbox_min", &self.bbox.min)
            .field("bbox_max", &self.bbox.max)
            .field("origin", &self.origin)
            .field("cells", &self.cells)
            .field("cell_size", &self.cell_size)
            .finish()
    }
}

impl<S: Real + Float + RoundAsUsize + From<f32>> VoxelGrid<S> {
    /// Computes `(resolution, cells, cell_size)` from the oracle's bounding
    /// box, widened by [`widen`] so the far layer of corners never samples
    /// exactly on (or outside) the oracle's declared boundary: `resolution`
    /// is the widened bbox's longest side divided by `mesh_cells`; `cells`
    /// is the widened bbox size divided by `resolution`, rounded
    /// component-wise (so a non-cubic bbox can have different cell counts
    /// per axis); `cell_size` is then recomputed exactly so
    /// `cells * cell_size == widened bbox size`.
    pub fn new<F: ImplicitFunction<S> + ?Sized>(
        f: &F,
        mesh_cells: usize,
    ) -> Result<Self, MesherError> {
        if mesh_cells == 0 {
            return Err(MesherError::NonPositiveMeshCells);
        }
        let raw = f.bbox();
        let raw_size = raw.max - raw.min;
        if raw_size.x <= S::zero() || raw_size.y <= S::zero() || raw_size.z <= S::zero() {
            return Err(MesherError::EmptyBoundingBox);
        }
        let bbox = widen(raw);
        let size = bbox.max - bbox.min;

        let longest = Float::max(Float::max(size.x, size.y), size.z);
        let resolution = longest / From::from(mesh_cells as f32);

        let cells = [
            RoundAsUsize::round_as_usize(size.x / resolution).max(1),
            RoundAsUsize::round_as_usize(size.y / resolution).max(1),
            RoundAsUsize::round_as_usize(size.z / resolution).max(1),
        ];

        let cell_size = Vector3::new(
            size.x / From::from(cells[0] as f32),
            size.y / From::from(cells[1] as f32),
            size.z / From::from(cells[2] as f32),
        );

        Ok(VoxelGrid {
            origin: bbox.min,
            bbox,
            cells,
            cell_size,
        })
    }

    /// Minimum corner of cell `(i, j, k)`.
    pub fn cell_start(&self, idx: [usize; 3]) -> Point3<S> {
        self.origin
            + Vector3::new(
                self.cell_size.x * From::from(idx[0] as f32),
                self.cell_size.y * From::from(idx[1] as f32),
                self.cell_size.z * From::from(idx[2] as f32),
            )
    }

    pub fn cell_center(&self, idx: [usize; 3]) -> Point3<S> {
        let half: S = From::from(0.5f32);
        self.cell_start(idx) + self.cell_size * half
    }

    pub fn total_cells(&self) -> usize {
        self.cells[0] * self.cells[1] * self.cells[2]
    }

    /// A grid with the same cell counts and sizes, origin nudged by a small
    /// random amount per axis. Used to retry a render whose oracle sampled
    /// exactly zero at a corner (an ambiguous inside/outside classification):
    /// nudging the origin moves every corner off the zero set without
    /// changing the grid's resolution. The jitter is applied per-axis since
    /// this grid's cells need not be cubic.
    pub fn jittered(&self) -> Self {
        let jitter = |cell: S| -> S {
            let r = Float::abs(rand::random::<f32>());
            let denom: S = From::from(10.0f32 + r);
            -cell / denom
        };
        VoxelGrid {
            bbox: self.bbox.clone(),
            origin: self.origin
                + Vector3::new(
                    jitter(self.cell_size.x),
                    jitter(self.cell_size.y),
                    jitter(self.cell_size.z),
                ),
            cells: self.cells,
            cell_size: self.cell_size,
        }
    }
}
