//! Finite-difference normal estimation at a surface crossing.

use crate::na;
use crate::ImplicitFunction;
use alga::general::Real;
use na::{Point3, Vector3};
use num_traits::Float;

/// Step size for the central difference, `1e-3` in the oracle's units.
pub fn default_step<S: From<f32>>() -> S {
    From::from(1e-3)
}

/// Central-difference gradient of `f` at `p`, normalised to unit length.
///
/// Returns `None` if the gradient underflows to zero length (the plane at
/// this crossing should then be dropped rather than contribute a
/// degenerate normal).
pub fn estimate<S: Real + Float, F: ImplicitFunction<S> + ?Sized>(
    f: &F,
    p: &Point3<S>,
    h: S,
) -> Option<Vector3<S>> {
    let dx = Vector3::new(h, S::zero(), S::zero());
    let dy = Vector3::new(S::zero(), h, S::zero());
    let dz = Vector3::new(S::zero(), S::zero(), h);

    let gradient = Vector3::new(
        f.value(&(p + dx)) - f.value(&(p - dx)),
        f.value(&(p + dy)) - f.value(&(p - dy)),
        f.value(&(p + dz)) - f.value(&(p - dz)),
    );

    let norm = gradient.norm();
    if norm <= S::zero() || Float::is_nan(norm) {
        return None;
    }
    Some(gradient / norm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BoundingBox;

    struct UnitSphere {
        bbox: BoundingBox<f64>,
    }

    impl ImplicitFunction<f64> for UnitSphere {
        fn bbox(&self) -> &BoundingBox<f64> {
            &self.bbox
        }
        fn value(&self, p: &Point3<f64>) -> f64 {
            Vector3::new(p.x, p.y, p.z).norm() - 1.0
        }
    }

    #[test]
    fn matches_analytic_normal_on_sphere() {
        let sphere = UnitSphere {
            bbox: BoundingBox::new(&Point3::new(-2., -2., -2.), &Point3::new(2., 2., 2.)),
        };
        let p = Point3::new(1.0, 0.0, 0.0);
        let n = estimate(&sphere, &p, 1e-3).unwrap();
        assert!((n.x - 1.0).abs() < 1e-4);
        assert!(n.y.abs() < 1e-4);
        assert!(n.z.abs() < 1e-4);
    }
}
