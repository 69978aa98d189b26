//! Quadratic error function solving: placing a single vertex per
//! surface-crossing cell by least-squares on the planes gathered at its
//! edge crossings.

use crate::na;
use alga::general::Real;
use na::{Matrix3, Point3, Vector3};
use num_traits::Float;

/// A tangent plane at a surface crossing: passes through `p` with normal
/// `n`. The plane equation is `n · x = n · p`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Plane<S> {
    pub p: Point3<S>,
    pub n: Vector3<S>,
}

impl<S: Real> Plane<S> {
    pub fn new(p: Point3<S>, n: Vector3<S>) -> Self {
        Plane { p, n }
    }

    fn offset(&self) -> S {
        self.n.dot(&self.p.coords)
    }
}

/// Accumulates oriented planes and solves for the point minimising the sum
/// of squared point-to-plane distances.
#[derive(Clone, Debug, Default)]
pub struct Qef<S> {
    planes: Vec<Plane<S>>,
}

impl<S: Real + Float> Qef<S> {
    pub fn new() -> Self {
        Qef { planes: Vec::new() }
    }

    pub fn push(&mut self, plane: Plane<S>) {
        self.planes.push(plane);
    }

    pub fn len(&self) -> usize {
        self.planes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.planes.is_empty()
    }

    /// Solves the normal equations `AᵀA x = Aᵀb` for the accumulated
    /// planes, where row `i` of `A` is `planes[i].n` and `b[i]` is
    /// `planes[i].offset()`. Returns `None` if the 3x3 system is singular
    /// or the solution contains NaNs.
    pub fn solve(&self) -> Option<Point3<S>> {
        let mut ata = Matrix3::<S>::zeros();
        let mut atb = Vector3::<S>::zeros();
        for plane in &self.planes {
            let n = plane.n;
            let d = plane.offset();
            ata += n * n.transpose();
            atb += n * d;
        }
        let lu = na::linalg::LU::new(ata);
        let solution = lu.solve(&atb)?;
        if solution.iter().any(|v| Float::is_nan(*v)) {
            return None;
        }
        Some(Point3::from(solution))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plane(px: f64, py: f64, pz: f64, nx: f64, ny: f64, nz: f64) -> Plane<f64> {
        Plane::new(
            Point3::new(px, py, pz),
            Vector3::new(nx, ny, nz).normalize(),
        )
    }

    #[test]
    fn three_orthogonal_planes_intersect_at_corner() {
        let mut qef = Qef::new();
        qef.push(plane(1.0, 0.0, 0.0, 1.0, 0.0, 0.0));
        qef.push(plane(0.0, 1.0, 0.0, 0.0, 1.0, 0.0));
        qef.push(plane(0.0, 0.0, 1.0, 0.0, 0.0, 1.0));
        let solution = qef.solve().expect("three independent planes must solve");
        assert!((solution.x - 1.0).abs() < 1e-9);
        assert!((solution.y - 1.0).abs() < 1e-9);
        assert!((solution.z - 1.0).abs() < 1e-9);
    }

    #[test]
    fn degenerate_parallel_planes_are_singular_without_center_push() {
        let mut qef = Qef::new();
        qef.push(plane(1.0, 0.0, 0.0, 1.0, 0.0, 0.0));
        qef.push(plane(1.0, 1.0, 0.0, 1.0, 0.0, 0.0));
        assert!(qef.solve().is_none());
    }

    #[test]
    fn center_push_plane_resolves_degenerate_system() {
        let mut qef = Qef::new();
        qef.push(plane(1.0, 0.0, 0.0, 1.0, 0.0, 0.0));
        qef.push(plane(1.0, 1.0, 0.0, 1.0, 0.0, 0.0));
        qef.push(plane(0.5, 0.5, 0.5, 1.0, 0.0, 0.0));
        qef.push(plane(0.5, 0.5, 0.5, 0.0, 1.0, 0.0));
        qef.push(plane(0.5, 0.5, 0.5, 0.0, 0.0, 1.0));
        let solution = qef.solve().expect("center-push planes guarantee rank 3");
        assert!((solution.x - 1.0).abs() < 1e-9);
    }
}
