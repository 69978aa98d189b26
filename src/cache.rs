//! Memoises oracle evaluations at voxel corner points.
//!
//! The cache is keyed on the integer corner index `(i, j, k)` rather than
//! on bit-equality of the evaluated point — cells are always visited in
//! grid order, so the same index always recomputes the same point from the
//! same arithmetic. This is strictly better than a float-keyed cache: no
//! float equality, smaller keys.

use crate::na;
use crate::{BoundingBox, ImplicitFunction};
use alga::general::Real;
use na::{Point3, Vector3};
use num_traits::Float;
use std::cell::RefCell;
use std::collections::HashMap;

pub struct EvaluationCache<'a, S, F: ?Sized> {
    inner: &'a F,
    bbox: BoundingBox<S>,
    origin: Point3<S>,
    cell_size: Vector3<S>,
    cache: RefCell<HashMap<[usize; 3], S>>,
}

impl<'a, S, F> EvaluationCache<'a, S, F>
where
    S: Real + Float + From<f32>,
    F: ImplicitFunction<S> + ?Sized,
{
    /// `bbox` is the grid's own (already-widened) bounding box, shared with
    /// [`crate::grid::VoxelGrid`] so corner points computed from `origin`
    /// and `cell_size` line up with what this cache reports from
    /// [`Self::bbox`].
    pub fn new(inner: &'a F, bbox: BoundingBox<S>, origin: Point3<S>, cell_size: Vector3<S>) -> Self {
        EvaluationCache {
            inner,
            bbox,
            origin,
            cell_size,
            cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn bbox(&self) -> &BoundingBox<S> {
        &self.bbox
    }

    /// World-space position of voxel corner `(i, j, k)`.
    pub fn corner_point(&self, idx: [usize; 3]) -> Point3<S> {
        self.origin
            + Vector3::new(
                self.cell_size.x * From::from(idx[0] as f32),
                self.cell_size.y * From::from(idx[1] as f32),
                self.cell_size.z * From::from(idx[2] as f32),
            )
    }

    /// Evaluates the oracle at corner `(i, j, k)`, memoising the result.
    pub fn evaluate_corner(&self, idx: [usize; 3]) -> S {
        if let Some(&v) = self.cache.borrow().get(&idx) {
            return v;
        }
        let p = self.corner_point(idx);
        let v = self.inner.value(&p);
        self.cache.borrow_mut().insert(idx, v);
        v
    }

    /// Evaluates the oracle at an arbitrary, not-necessarily-grid-aligned
    /// point. Used for sphere-trace and bisection steps between corners;
    /// these points are visited once and not worth memoising.
    pub fn evaluate_at(&self, p: &Point3<S>) -> S {
        self.inner.value(p)
    }

    pub fn len(&self) -> usize {
        self.cache.borrow().len()
    }
}
