//! One-shot diagnostics for the locally-recovered error kinds.
//!
//! Each kind fires `log::warn!` at most once per render. A fresh
//! [`Diagnostics`] is created per [`crate::Mesher::tessellate`] call, so
//! warnings never leak between renders that reuse the same oracle.

use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Default)]
pub struct Diagnostics {
    qef_failure: AtomicBool,
    raycast_fallback: AtomicBool,
    far_away_clamp: AtomicBool,
    missing_neighbor: AtomicBool,
    degenerate_normal: AtomicBool,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    fn fire_once(flag: &AtomicBool, message: &str) {
        if flag
            .compare_exchange(false, true, Ordering::Relaxed, Ordering::Relaxed)
            .is_ok()
        {
            log::warn!(target: "dual_contour", "{}", message);
        }
    }

    /// The QEF's normal-equations matrix was singular or produced NaNs;
    /// the cell center was substituted.
    pub fn qef_failure(&self) {
        Self::fire_once(
            &self.qef_failure,
            "QEF solve failed for at least one cell; substituted cell center",
        );
    }

    /// Sphere tracing did not converge on at least one edge; bisection
    /// was used instead.
    pub fn raycast_fallback(&self) {
        Self::fire_once(
            &self.raycast_fallback,
            "sphere trace did not converge for at least one edge; fell back to bisection",
        );
    }

    /// A placed vertex strayed more than `far_away * cell_size` from its
    /// cell center and was clamped back into the cell.
    pub fn far_away_clamp(&self) {
        Self::fire_once(
            &self.far_away_clamp,
            "vertex placement exceeded far_away bound for at least one cell; clamped into cell",
        );
    }

    /// A far edge crossed the surface but one of its three stitching
    /// neighbours produced no vertex, leaving a hole.
    pub fn missing_neighbor(&self) {
        Self::fire_once(
            &self.missing_neighbor,
            "missing neighbor vertex at a surface-crossing edge; leaving a hole in the mesh",
        );
    }

    /// A finite-difference gradient underflowed to zero length; its plane
    /// was dropped from the QEF.
    pub fn degenerate_normal(&self) {
        Self::fire_once(
            &self.degenerate_normal,
            "normal estimate underflowed to zero for at least one edge crossing; dropped its plane",
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;

    #[test]
    fn fires_only_once() {
        let diagnostics = Diagnostics::new();
        diagnostics.qef_failure();
        diagnostics.qef_failure();
        diagnostics.qef_failure();
        assert!(diagnostics.qef_failure.load(Ordering::Relaxed));
    }

    #[test]
    fn kinds_are_independent() {
        let diagnostics = Diagnostics::new();
        diagnostics.far_away_clamp();
        assert!(diagnostics.far_away_clamp.load(Ordering::Relaxed));
        assert!(!diagnostics.missing_neighbor.load(Ordering::Relaxed));
    }
}
