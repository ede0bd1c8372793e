use na::{Point3, Vector3};

use super::Bounded;
use crate::types::Aabb;

#[derive(Clone, Copy, Debug)]
pub struct Sphere {
    pub center: Point3<f32>,
    pub radius: f32,
}

impl Sphere {
    pub fn new(center: Point3<f32>, radius: f32) -> Self {
        Self {
            center,
            radius: radius.abs(),
        }
    }
}

impl Bounded for Sphere {
    fn bbox(&self) -> Aabb {
        let r = Vector3::repeat(self.radius);
        Aabb::new(self.center - r, self.center + r)
    }
}
