//! Meshes a unit sphere and writes the result as a Wavefront OBJ file.
//!
//! OBJ emission lives here, not in the library: the crate's output contract
//! stops at triangles, writing them to a file is the caller's job.

use dual_contour::{BoundingBox, ImplicitFunction, Mesher, MesherConfig};
use nalgebra as na;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

struct UnitSphere {
    bbox: BoundingBox<f64>,
}

impl UnitSphere {
    fn new() -> UnitSphere {
        UnitSphere {
            bbox: BoundingBox::new(&na::Point3::new(-1.2, -1.2, -1.2), &na::Point3::new(1.2, 1.2, 1.2)),
        }
    }
}

impl ImplicitFunction<f64> for UnitSphere {
    fn bbox(&self) -> &BoundingBox<f64> {
        &self.bbox
    }
    fn value(&self, p: &na::Point3<f64>) -> f64 {
        na::Vector3::new(p.x, p.y, p.z).norm() - 1.0
    }
}

fn write_obj(path: &Path, vertices: &[[f64; 3]], faces: &[[usize; 3]]) -> std::io::Result<()> {
    let mut file = BufWriter::new(File::create(path)?);
    for v in vertices {
        writeln!(file, "v {} {} {}", v[0], v[1], v[2])?;
    }
    for f in faces {
        writeln!(file, "f {} {} {}", f[0] + 1, f[1] + 1, f[2] + 1)?;
    }
    file.flush()
}

fn main() {
    let sphere = UnitSphere::new();
    let mesher = Mesher::new(MesherConfig::new(40));
    let mesh = mesher.tessellate_to_mesh(&sphere).expect("sphere bbox/mesh_cells are valid");

    write_obj(Path::new("sphere.obj"), &mesh.vertices, &mesh.faces).expect("failed to write sphere.obj");
    println!(
        "wrote sphere.obj: {} vertices, {} triangles",
        mesh.vertices.len(),
        mesh.faces.len()
    );
}
