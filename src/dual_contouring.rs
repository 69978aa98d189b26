//! The mesher proper: per-cell vertex placement and the quad/triangle
//! stitcher that connects neighbouring cells' vertices into a triangle
//! stream.
//!
//! Vertex placement is embarrassingly parallel across cells and runs under
//! `rayon`, each worker holding its own [`EvaluationCache`] shard (cache hits
//! across workers are not required for correctness, only within one).
//! Stitching observes the completed vertex buffer and neighbour map and
//! runs single-threaded, since it is dominated by sink I/O rather than
//! compute.

use crate::cache::EvaluationCache;
use crate::config::MesherConfig;
use crate::edge;
use crate::grid::VoxelGrid;
use crate::mesh::{TriangleMesh, TriangleSink};
use crate::na;
use crate::normal;
use crate::qef::{Plane, Qef};
use crate::warnings::Diagnostics;
use crate::{ImplicitFunction, MesherError, RoundAsUsize};
use alga::general::Real;
use na::{Point3, Vector3};
use num_traits::Float;
use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

/// Corner offsets, numbered `(x<<2)|(y<<1)|z`.
const CORNERS: [[usize; 3]; 8] = [
    [0, 0, 0],
    [0, 0, 1],
    [0, 1, 0],
    [0, 1, 1],
    [1, 0, 0],
    [1, 0, 1],
    [1, 1, 0],
    [1, 1, 1],
];

/// The 12 cell edges as unordered pairs of corner indices.
const EDGES: [(usize, usize); 12] = [
    (0, 1),
    (0, 2),
    (0, 4),
    (1, 3),
    (1, 5),
    (2, 3),
    (2, 6),
    (3, 7),
    (4, 5),
    (4, 6),
    (5, 7),
    (6, 7),
];

/// The three far edges anchored at corner 7, one per axis (x, y, z).
const FAR_EDGES: [(usize, usize); 3] = [(3, 7), (5, 7), (6, 7)];

/// Cell-index offsets of the three neighbours sharing a far edge, indexed by
/// axis.
const NEIGHBOR_OFFSETS: [[[usize; 3]; 3]; 3] = [
    [[0, 0, 1], [0, 1, 0], [0, 1, 1]],
    [[0, 0, 1], [1, 0, 0], [1, 0, 1]],
    [[0, 1, 0], [1, 0, 0], [1, 1, 0]],
];

/// A surface-crossing cell stops collecting edge crossings after this many;
/// a cube corner has at most 7 crossing edges, but 6 already over-determines
/// the QEF together with the center-push planes.
const MAX_CROSSINGS: usize = 6;

/// How many times a render retries with a jittered grid origin after an
/// oracle sample landed exactly on zero (an ambiguous corner that cannot be
/// classified as inside or outside). Bounded rather than unbounded so a
/// pathological oracle that always samples exactly zero cannot hang the
/// caller.
const MAX_ZERO_RETRIES: usize = 8;

struct CellVertex<S> {
    position: Point3<S>,
    mask: u8,
}

/// Drives one dual-contouring render: vertex placement then stitching.
#[derive(Clone, Copy, Debug)]
pub struct Mesher<S> {
    config: MesherConfig<S>,
}

impl<S> Mesher<S>
where
    S: Real + Float + From<f32> + RoundAsUsize + Send + Sync,
{
    pub fn new(config: MesherConfig<S>) -> Self {
        Mesher { config }
    }

    pub fn config(&self) -> &MesherConfig<S> {
        &self.config
    }

    /// Renders `f` and pushes every accepted triangle to `sink`, in
    /// implementation-defined order.
    pub fn tessellate<F, Sink>(&self, f: &F, sink: &mut Sink) -> Result<(), MesherError>
    where
        F: ImplicitFunction<S> + Sync,
        Sink: TriangleSink<S>,
    {
        let (vertices, faces) = self.render(f)?;
        for face in faces {
            sink.push_triangle([vertices[face[0]], vertices[face[1]], vertices[face[2]]]);
        }
        Ok(())
    }

    /// Convenience wrapper that builds an indexed [`TriangleMesh`] directly
    /// from the internal dense vertex buffer, so shared vertices are never
    /// duplicated (unlike pushing through the generic [`TriangleSink`]
    /// impl on `TriangleMesh`, which appends a fresh vertex per corner).
    pub fn tessellate_to_mesh<F>(&self, f: &F) -> Result<TriangleMesh<S>, MesherError>
    where
        F: ImplicitFunction<S> + Sync,
    {
        let (vertices, faces) = self.render(f)?;
        Ok(TriangleMesh {
            vertices: vertices.iter().map(|p| [p.x, p.y, p.z]).collect(),
            faces,
        })
    }

    fn render<F>(&self, f: &F) -> Result<(Vec<Point3<S>>, Vec<[usize; 3]>), MesherError>
    where
        F: ImplicitFunction<S> + Sync,
    {
        let mut grid = VoxelGrid::new(f, self.config.mesh_cells)?;
        let diagnostics = Diagnostics::new();

        let mut cell_indices = Vec::with_capacity(grid.total_cells());
        for i in 0..grid.cells[0] {
            for j in 0..grid.cells[1] {
                for k in 0..grid.cells[2] {
                    cell_indices.push([i, j, k]);
                }
            }
        }

        let mut retries_left = MAX_ZERO_RETRIES;
        let placements = loop {
            let zero_hit = AtomicBool::new(false);
            let placements: Vec<Option<CellVertex<S>>> = cell_indices
                .par_iter()
                .map_init(
                    || EvaluationCache::new(f, grid.bbox.clone(), grid.origin, grid.cell_size),
                    |cache, &idx| {
                        place_vertex(idx, &grid, cache, f, &self.config, &diagnostics, &zero_hit)
                    },
                )
                .collect();

            if zero_hit.load(Ordering::Relaxed) && retries_left > 0 {
                grid = grid.jittered();
                retries_left -= 1;
                continue;
            }
            break placements;
        };

        let mut vertices = Vec::new();
        let mut masks = Vec::new();
        let mut order = Vec::new();
        let mut neighbor_map = HashMap::new();
        for (idx, placement) in cell_indices.into_iter().zip(placements.into_iter()) {
            if let Some(cv) = placement {
                let buf_index = vertices.len();
                vertices.push(cv.position);
                masks.push(cv.mask);
                neighbor_map.insert(idx, buf_index);
                order.push(idx);
            }
        }

        let mut faces = Vec::new();
        for buf_index in 0..order.len() {
            stitch_cell(
                order[buf_index],
                masks[buf_index],
                buf_index,
                &vertices,
                &neighbor_map,
                &diagnostics,
                &mut faces,
            );
        }

        Ok((vertices, faces))
    }
}

fn place_vertex<S, F>(
    idx: [usize; 3],
    grid: &VoxelGrid<S>,
    cache: &EvaluationCache<S, F>,
    f: &F,
    config: &MesherConfig<S>,
    diagnostics: &Diagnostics,
    zero_hit: &AtomicBool,
) -> Option<CellVertex<S>>
where
    S: Real + Float + From<f32>,
    F: ImplicitFunction<S> + ?Sized,
{
    let mut mask: u8 = 0;
    let mut corner_values = [S::zero(); 8];
    for (c, offset) in CORNERS.iter().enumerate() {
        let global = [idx[0] + offset[0], idx[1] + offset[1], idx[2] + offset[2]];
        let v = cache.evaluate_corner(global);
        if v == S::zero() {
            zero_hit.store(true, Ordering::Relaxed);
        }
        corner_values[c] = v;
        if v < S::zero() {
            mask |= 1 << c;
        }
    }
    if mask == 0 || mask == 0xFF {
        return None;
    }

    let mut qef = Qef::new();
    let mut crossings = 0;
    let h = normal::default_step::<S>();
    for &(a, b) in EDGES.iter() {
        if crossings >= MAX_CROSSINGS {
            break;
        }
        let bit_a = (mask >> a) & 1;
        let bit_b = (mask >> b) & 1;
        if bit_a == bit_b {
            continue;
        }
        let off_a = CORNERS[a];
        let off_b = CORNERS[b];
        let global_a = [idx[0] + off_a[0], idx[1] + off_a[1], idx[2] + off_a[2]];
        let global_b = [idx[0] + off_b[0], idx[1] + off_b[1], idx[2] + off_b[2]];
        let pa = cache.corner_point(global_a);
        let pb = cache.corner_point(global_b);
        let va = corner_values[a];
        let vb = corner_values[b];
        let crossing = edge::find_crossing(cache, pa, va, pb, vb, config, diagnostics);
        match normal::estimate(f, &crossing, h) {
            Some(n) => {
                qef.push(Plane::new(crossing, n));
                crossings += 1;
            }
            None => diagnostics.degenerate_normal(),
        }
    }

    let center = grid.cell_center(idx);
    let push = config.center_push;
    qef.push(Plane::new(center, Vector3::new(push, S::zero(), S::zero())));
    qef.push(Plane::new(center, Vector3::new(S::zero(), push, S::zero())));
    qef.push(Plane::new(center, Vector3::new(S::zero(), S::zero(), push)));

    let mut vertex = match qef.solve() {
        Some(v) => v,
        None => {
            diagnostics.qef_failure();
            center
        }
    };

    let cell_start = grid.cell_start(idx);
    let cell_size = grid.cell_size;
    let far_away = config.far_away;
    let diff = vertex - center;
    let mut clamped = false;
    if Float::abs(diff.x) > far_away * cell_size.x {
        vertex.x = clamp(vertex.x, cell_start.x, cell_start.x + cell_size.x);
        clamped = true;
    }
    if Float::abs(diff.y) > far_away * cell_size.y {
        vertex.y = clamp(vertex.y, cell_start.y, cell_start.y + cell_size.y);
        clamped = true;
    }
    if Float::abs(diff.z) > far_away * cell_size.z {
        vertex.z = clamp(vertex.z, cell_start.z, cell_start.z + cell_size.z);
        clamped = true;
    }
    if clamped {
        diagnostics.far_away_clamp();
    }

    Some(CellVertex {
        position: vertex,
        mask,
    })
}

fn clamp<S: Float>(v: S, lo: S, hi: S) -> S {
    Float::max(lo, Float::min(hi, v))
}

#[allow(clippy::too_many_arguments)]
fn stitch_cell<S: Real + Float>(
    idx: [usize; 3],
    mask: u8,
    buf_index: usize,
    vertices: &[Point3<S>],
    neighbor_map: &HashMap<[usize; 3], usize>,
    diagnostics: &Diagnostics,
    faces: &mut Vec<[usize; 3]>,
) {
    for (a, &(c_a, far_corner)) in FAR_EDGES.iter().enumerate() {
        let bit_c = (mask >> c_a) & 1;
        let bit_far = (mask >> far_corner) & 1;
        if bit_c == bit_far {
            continue;
        }

        let offsets = NEIGHBOR_OFFSETS[a];
        let mut neighbor_bufs = [0usize; 3];
        let mut complete = true;
        for (n, offset) in offsets.iter().enumerate() {
            let nidx = [idx[0] + offset[0], idx[1] + offset[1], idx[2] + offset[2]];
            match neighbor_map.get(&nidx) {
                Some(&b) => neighbor_bufs[n] = b,
                None => {
                    complete = false;
                    break;
                }
            }
        }
        if !complete {
            diagnostics.missing_neighbor();
            continue;
        }

        let v1 = neighbor_bufs[0];
        let v2 = neighbor_bufs[1];
        let v3 = neighbor_bufs[2];
        let reverse = (bit_c ^ (a as u8 & 1)) != 0;

        let mut tri1 = [buf_index, v1, v3];
        let mut tri2 = [buf_index, v3, v2];
        if reverse {
            tri1.swap(1, 2);
            tri2.swap(1, 2);
        }
        emit_if_valid(tri1, vertices, faces);
        emit_if_valid(tri2, vertices, faces);
    }
}

fn emit_if_valid<S: Real>(tri: [usize; 3], vertices: &[Point3<S>], faces: &mut Vec<[usize; 3]>) {
    if tri[0] == tri[1] || tri[1] == tri[2] || tri[0] == tri[2] {
        return;
    }
    if vertices[tri[0]] == vertices[tri[1]]
        || vertices[tri[1]] == vertices[tri[2]]
        || vertices[tri[0]] == vertices[tri[2]]
    {
        return;
    }
    faces.push(tri);
}
