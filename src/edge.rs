//! Locates the surface-crossing point on a voxel edge whose endpoints
//! straddle zero.
//!
//! The primary method is a scaled sphere trace from one endpoint toward
//! the other; if it fails to converge within its step budget, a bisection
//! fallback (guaranteed to converge, just less precisely aligned to the
//! true oracle gradient) takes over and a one-shot warning fires.

use crate::cache::EvaluationCache;
use crate::config::MesherConfig;
use crate::na;
use crate::warnings::Diagnostics;
use crate::ImplicitFunction;
use alga::general::Real;
use na::Point3;
use num_traits::Float;

const BISECTION_ITERATIONS: usize = 32;

/// Finds `P` on segment `[a, b]` with `|evaluate(P)| <= epsilon`, given
/// `a`/`b` evaluate to `av`/`bv` of opposite sign.
pub fn find_crossing<S, F>(
    cache: &EvaluationCache<S, F>,
    a: Point3<S>,
    av: S,
    b: Point3<S>,
    bv: S,
    config: &MesherConfig<S>,
    diagnostics: &Diagnostics,
) -> Point3<S>
where
    S: Real + Float + From<f32>,
    F: ImplicitFunction<S> + ?Sized,
{
    debug_assert_ne!(Float::signum(av), Float::signum(bv));

    if let Some(p) = sphere_trace(cache, a, b, config) {
        return p;
    }
    diagnostics.raycast_fallback();
    bisect(cache, a, av, b, bv)
}

fn compress<S: Real + Float>(d: S, scale_and_sigmoid: S) -> S {
    if scale_and_sigmoid > S::zero() {
        scale_and_sigmoid * Float::tanh(d / scale_and_sigmoid)
    } else {
        d
    }
}

fn sphere_trace<S, F>(
    cache: &EvaluationCache<S, F>,
    a: Point3<S>,
    b: Point3<S>,
    config: &MesherConfig<S>,
) -> Option<Point3<S>>
where
    S: Real + Float + From<f32>,
    F: ImplicitFunction<S> + ?Sized,
{
    let dir = b - a;
    let len = dir.norm();
    if len <= S::zero() {
        return None;
    }
    let unit_dir = dir / len;
    let max_t = len * From::from(2.0f32);

    let mut t = S::zero();
    for _ in 0..config.raycast_max_steps {
        let p = a + unit_dir * t;
        let raw = cache.evaluate_at(&p);
        let d = compress(raw, config.raycast_scale_and_sigmoid);
        if Float::abs(raw) <= config.raycast_epsilon {
            return Some(p);
        }
        t = t + Float::abs(d) * config.raycast_step_scale;
        if t > max_t {
            return None;
        }
    }
    None
}

fn bisect<S, F>(cache: &EvaluationCache<S, F>, a: Point3<S>, av: S, b: Point3<S>, bv: S) -> Point3<S>
where
    S: Real + Float,
    F: ImplicitFunction<S> + ?Sized,
{
    let mut lo = a;
    let mut lov = av;
    let mut hi = b;
    let mut best = a;
    let mut best_abs = Float::abs(av);
    if Float::abs(bv) < best_abs {
        best = b;
        best_abs = Float::abs(bv);
    }

    let half: S = num_traits::cast::cast(0.5f64).expect("S must represent 0.5");
    for _ in 0..BISECTION_ITERATIONS {
        let mid = lo + (hi - lo) * half;
        let mv = cache.evaluate_at(&mid);
        if Float::abs(mv) < best_abs {
            best = mid;
            best_abs = Float::abs(mv);
        }
        if Float::signum(mv) == Float::signum(lov) {
            lo = mid;
            lov = mv;
        } else {
            hi = mid;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BoundingBox;
    use na::Vector3;

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

    fn sphere_cache(sphere: &UnitSphere) -> EvaluationCache<f64, UnitSphere> {
        EvaluationCache::new(
            sphere,
            crate::grid::widen(&sphere.bbox),
            Point3::new(-1.2, -1.2, -1.2),
            Vector3::new(0.12, 0.12, 0.12),
        )
    }

    #[test]
    fn sphere_trace_finds_the_unit_radius() {
        let sphere = UnitSphere {
            bbox: BoundingBox::new(&Point3::new(-1.2, -1.2, -1.2), &Point3::new(1.2, 1.2, 1.2)),
        };
        let cache = sphere_cache(&sphere);
        let config = MesherConfig::new(20);
        let diagnostics = Diagnostics::new();
        let a = Point3::new(0.5, 0.0, 0.0);
        let b = Point3::new(1.5, 0.0, 0.0);
        let crossing = find_crossing(&cache, a, cache.evaluate_at(&a), b, cache.evaluate_at(&b), &config, &diagnostics);
        assert!((crossing.x - 1.0).abs() < 1e-2);
    }

    #[test]
    fn bisection_converges_even_with_zero_step_budget() {
        let sphere = UnitSphere {
            bbox: BoundingBox::new(&Point3::new(-1.2, -1.2, -1.2), &Point3::new(1.2, 1.2, 1.2)),
        };
        let cache = sphere_cache(&sphere);
        let config = MesherConfig::new(20).with_raycast_max_steps(0);
        let diagnostics = Diagnostics::new();
        let a = Point3::new(0.5, 0.0, 0.0);
        let b = Point3::new(1.5, 0.0, 0.0);
        let crossing = find_crossing(&cache, a, cache.evaluate_at(&a), b, cache.evaluate_at(&b), &config, &diagnostics);
        assert!((crossing.x - 1.0).abs() < 1e-2);
    }
}
