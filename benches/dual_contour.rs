#[macro_use]
extern crate bencher;

use bencher::Bencher;
use dual_contour::{BoundingBox, ImplicitFunction, Mesher, MesherConfig};
use nalgebra::{Point3, Vector3};

struct Sphere {
    bbox: BoundingBox<f64>,
    radius: f64,
}

impl ImplicitFunction<f64> for Sphere {
    fn bbox(&self) -> &BoundingBox<f64> {
        &self.bbox
    }
    fn value(&self, p: &Point3<f64>) -> f64 {
        Vector3::new(p.x, p.y, p.z).norm() - self.radius
    }
}

fn sphere(radius: f64, margin: f64) -> Sphere {
    let extent = radius + margin;
    Sphere {
        bbox: BoundingBox::new(
            &Point3::new(-extent, -extent, -extent),
            &Point3::new(extent, extent, extent),
        ),
        radius,
    }
}

fn sphere_16(bench: &mut Bencher) {
    let shape = sphere(1.0, 0.2);
    let mesher = Mesher::new(MesherConfig::new(16));
    bench.iter(|| mesher.tessellate_to_mesh(&shape).unwrap());
}

fn sphere_32(bench: &mut Bencher) {
    let shape = sphere(1.0, 0.2);
    let mesher = Mesher::new(MesherConfig::new(32));
    bench.iter(|| mesher.tessellate_to_mesh(&shape).unwrap());
}

fn sphere_64(bench: &mut Bencher) {
    let shape = sphere(1.0, 0.2);
    let mesher = Mesher::new(MesherConfig::new(64));
    bench.iter(|| mesher.tessellate_to_mesh(&shape).unwrap());
}

fn sphere_32_no_center_push(bench: &mut Bencher) {
    let shape = sphere(1.0, 0.2);
    let mesher = Mesher::new(MesherConfig::new(32).with_center_push(0.0));
    bench.iter(|| mesher.tessellate_to_mesh(&shape).unwrap());
}

benchmark_group!(
    dual_contour,
    sphere_16,
    sphere_32,
    sphere_64,
    sphere_32_no_center_push
);
benchmark_main!(dual_contour);
