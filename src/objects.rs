pub mod sphere;
pub mod tri_mesh;

use sphere::Sphere;
use tri_mesh::Triangle;

use crate::types::Aabb;

/// Anything the hierarchy can be built over.
pub trait Bounded {
    fn bbox(&self) -> Aabb;
}

#[derive(Clone, Debug)]
pub enum Primitive {
    Sphere(Sphere),
    Triangle(Triangle),
}

impl Bounded for Primitive {
    fn bbox(&self) -> Aabb {
        match self {
            Primitive::Sphere(sphere) => sphere.bbox(),
            Primitive::Triangle(triangle) => triangle.bbox(),
        }
    }
}

/// Scene primitives in insertion order. A primitive's position in the buffer
/// is the index the hierarchy stores for it.
#[derive(Clone, Debug, Default)]
pub struct PrimitiveBuffer {
    primitives: Vec<Primitive>,
}

impl PrimitiveBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, primitive: Primitive) {
        self.primitives.push(primitive);
    }

    pub fn add_sphere(&mut self, sphere: Sphere) {
        self.add(Primitive::Sphere(sphere));
    }

    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.add(Primitive::Triangle(triangle));
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    pub fn get(&self, index: u32) -> Option<&Primitive> {
        self.primitives.get(index as usize)
    }

    pub fn aabbs(&self) -> Vec<Aabb> {
        self.primitives.iter().map(|p| p.bbox()).collect()
    }

    pub fn indices(&self) -> Vec<u32> {
        (0..self.primitives.len() as u32).collect()
    }
}
