//! The triangle sink output contract and a ready-made indexed mesh that
//! implements it.
//!
//! File I/O (STL, OBJ, ...) and mesh simplification belong to the caller;
//! this module only carries data.

use crate::na;
use alga::general::RealField;
use na::Point3;
use rayon::prelude::*;
use std::fmt::Debug;

/// Destination for the triangles a [`crate::Mesher`] emits: an ordered
/// triple of points per triangle, object space, implementation-defined
/// order. A sink must not rely on emission order.
pub trait TriangleSink<S> {
    fn push_triangle(&mut self, triangle: [Point3<S>; 3]);
}

/// Indexed triangle mesh returned by
/// [`crate::Mesher::tessellate_to_mesh`].
#[derive(Clone, Debug, PartialEq)]
pub struct TriangleMesh<S: Clone> {
    /// The list of vertices.
    pub vertices: Vec<[S; 3]>,
    /// The list of triangles as indexes into `vertices`.
    pub faces: Vec<[usize; 3]>,
}

impl<S: Clone> TriangleSink<S> for TriangleMesh<S> {
    /// Appends a fresh vertex per triangle corner without deduplicating
    /// shared vertices. [`crate::Mesher::tessellate_to_mesh`] builds an
    /// indexed mesh directly from its own dense vertex buffer instead of
    /// going through this impl, so it never pays that cost; this impl
    /// exists for callers who want a `TriangleMesh` built generically,
    /// through the same sink trait any other consumer uses.
    fn push_triangle(&mut self, triangle: [Point3<S>; 3]) {
        let base = self.vertices.len();
        for p in &triangle {
            self.vertices.push([p.x.clone(), p.y.clone(), p.z.clone()]);
        }
        self.faces.push([base, base + 1, base + 2]);
    }
}

impl<S: Clone> TriangleMesh<S> {
    pub fn new() -> Self {
        TriangleMesh {
            vertices: Vec::new(),
            faces: Vec::new(),
        }
    }

    /// Returns the mesh's topology as a flat buffer: every triangle
    /// contributes three consecutive entries.
    pub fn flat_topology(&self) -> Vec<usize> {
        self.faces
            .par_iter()
            .flat_map(|face| face.to_vec())
            .collect()
    }
}

impl<S: Clone> Default for TriangleMesh<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: RealField + Debug> TriangleMesh<S> {
    /// The normal of the face at index `face`, as a triple of `T`.
    pub fn normal<T>(&self, face: usize) -> [T; 3]
    where
        f32: From<S>,
        T: From<f32>,
    {
        let v: Vec<na::Point3<f32>> = self.faces[face]
            .par_iter()
            .map(|&i| {
                na::Point3::<f32>::new(
                    self.vertices[i][0].into(),
                    self.vertices[i][1].into(),
                    self.vertices[i][2].into(),
                )
            })
            .collect();
        let r = (v[1] - v[0]).cross(&(v[2] - v[0])).normalize();
        [r[0].into(), r[1].into(), r[2].into()]
    }

    /// The vertex at index `i`, as a triple of `T`.
    pub fn vertex<T>(&self, i: usize) -> [T; 3]
    where
        T: From<S>,
    {
        [
            self.vertices[i][0].into(),
            self.vertices[i][1].into(),
            self.vertices[i][2].into(),
        ]
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn f32slice_eq(a: &[f32], b: &[f32]) -> bool {
        assert_eq!(a.len(), b.len());
        for i in 0..a.len() {
            if (a[i] - b[i]).abs() > f32::EPSILON {
                return false;
            }
        }
        true
    }

    #[test]
    fn simple() {
        let m = TriangleMesh {
            vertices: vec![[0., 0., 0.], [1., 0., 0.], [0., 1., 0.]],
            faces: vec![[0, 1, 2]],
        };
        assert!(f32slice_eq(&m.normal::<f32>(0), &[0., 0., 1.]));
        assert!(f32slice_eq(&m.vertex::<f32>(0), &[0., 0., 0.]));
        assert!(f32slice_eq(&m.vertex::<f32>(1), &[1., 0., 0.]));
        assert!(f32slice_eq(&m.vertex::<f32>(2), &[0., 1., 0.]));
    }

    #[test]
    fn push_triangle_appends_a_fresh_vertex_per_corner() {
        let mut mesh = TriangleMesh::<f64>::new();
        mesh.push_triangle([
            Point3::new(0., 0., 0.),
            Point3::new(1., 0., 0.),
            Point3::new(0., 1., 0.),
        ]);
        mesh.push_triangle([
            Point3::new(0., 0., 0.),
            Point3::new(0., 1., 0.),
            Point3::new(0., 0., 1.),
        ]);
        assert_eq!(mesh.vertices.len(), 6);
        assert_eq!(mesh.faces, vec![[0, 1, 2], [3, 4, 5]]);
    }
}
