//! Mesher configuration: the option table from the crate's external
//! interface, with the same defaults.

use alga::general::Real;

/// Tunable parameters for [`crate::Mesher`].
///
/// `mesh_cells` is the only field without a default — every mesh needs a
/// caller-chosen resolution. The rest default to the values below and are
/// adjusted with the `with_*` setters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MesherConfig<S> {
    /// Cell count along the longest axis of the oracle's bounding box.
    pub mesh_cells: usize,
    /// Maximum vertex displacement from the cell center, as a fraction of
    /// cell size. Larger allows sharper corners but risks degenerate
    /// triangles; the vertex is clamped into its cell beyond this.
    pub far_away: S,
    /// Weight of the three center-biasing planes added to every QEF.
    /// `0` disables them; larger trades sharpness for robustness.
    pub center_push: S,
    /// Sigmoid compression factor applied to the sampled distance before
    /// each sphere-trace step. `0` disables compression.
    pub raycast_scale_and_sigmoid: S,
    /// Multiplier on `|d|` applied to the sphere-trace step length.
    pub raycast_step_scale: S,
    /// Surface-hit tolerance for the sphere trace.
    pub raycast_epsilon: S,
    /// Step budget per edge before the sphere trace gives up and falls
    /// back to bisection.
    pub raycast_max_steps: usize,
}

impl<S: Real + From<f32>> MesherConfig<S> {
    /// A config with every default but `mesh_cells`, which the caller must
    /// always provide explicitly.
    pub fn new(mesh_cells: usize) -> Self {
        MesherConfig {
            mesh_cells,
            ..Self::default_with_zero_mesh_cells()
        }
    }

    fn default_with_zero_mesh_cells() -> Self {
        MesherConfig {
            mesh_cells: 0,
            far_away: From::from(0.499_999),
            center_push: From::from(1.0),
            raycast_scale_and_sigmoid: From::from(0.0),
            raycast_step_scale: From::from(1.0),
            raycast_epsilon: From::from(1e-4),
            raycast_max_steps: 1000,
        }
    }

    pub fn with_far_away(mut self, far_away: S) -> Self {
        self.far_away = far_away;
        self
    }

    pub fn with_center_push(mut self, center_push: S) -> Self {
        self.center_push = center_push;
        self
    }

    pub fn with_raycast_scale_and_sigmoid(mut self, scale: S) -> Self {
        self.raycast_scale_and_sigmoid = scale;
        self
    }

    pub fn with_raycast_step_scale(mut self, step_scale: S) -> Self {
        self.raycast_step_scale = step_scale;
        self
    }

    pub fn with_raycast_epsilon(mut self, epsilon: S) -> Self {
        self.raycast_epsilon = epsilon;
        self
    }

    pub fn with_raycast_max_steps(mut self, max_steps: usize) -> Self {
        self.raycast_max_steps = max_steps;
        self
    }
}
