//! Reproducible synthetic inputs for the demo binary and the tests.

use na::{Point3, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::objects::sphere::Sphere;
use crate::objects::tri_mesh::Triangle;
use crate::objects::PrimitiveBuffer;
use crate::types::Aabb;

/// Side length of the cube all generated primitives are placed in.
pub const EXTENT: f32 = 100.0;

fn random_point(rng: &mut StdRng) -> Point3<f32> {
    Point3::new(
        rng.gen_range(0.0..EXTENT),
        rng.gen_range(0.0..EXTENT),
        rng.gen_range(0.0..EXTENT),
    )
}

/// Uniformly distributed boxes with edges between 0.1 and 2.
pub fn random_boxes(count: usize, seed: u64) -> Vec<Aabb> {
    let mut rng = StdRng::seed_from_u64(seed);

    (0..count)
        .map(|_| {
            let min = random_point(&mut rng);
            let size = Vector3::new(
                rng.gen_range(0.1..2.0),
                rng.gen_range(0.1..2.0),
                rng.gen_range(0.1..2.0),
            );
            Aabb::new(min, min + size)
        })
        .collect()
}

pub fn random_spheres(count: usize, seed: u64) -> PrimitiveBuffer {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut buffer = PrimitiveBuffer::new();

    for _ in 0..count {
        let center = random_point(&mut rng);
        buffer.add_sphere(Sphere::new(center, rng.gen_range(0.05..1.0)));
    }

    buffer
}

/// Long thin triangles crossing a large part of the scene, the case object
/// splits handle badly.
pub fn slivers(count: usize, seed: u64) -> PrimitiveBuffer {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut buffer = PrimitiveBuffer::new();

    for _ in 0..count {
        let a = random_point(&mut rng);
        let b = random_point(&mut rng);
        let offset = Vector3::new(
            rng.gen_range(-0.1..0.1),
            rng.gen_range(-0.1..0.1),
            rng.gen_range(-0.1..0.1),
        );
        buffer.add_triangle(Triangle::new([a, b, a + offset]));
    }

    buffer
}
