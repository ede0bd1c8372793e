use na::{Point3, Vector3};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Axis {
    #[default]
    X = 0,
    Y = 1,
    Z = 2,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn index(self) -> usize {
        self as usize
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    min: Point3<f32>,
    max: Point3<f32>,
}

impl Aabb {
    // a, b are opposite corners
    pub fn new(a: Point3<f32>, b: Point3<f32>) -> Self {
        let min = Point3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z));
        let max = Point3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z));

        Self { min, max }
    }

    /// Identity of `merge`. Not a valid box on its own: `min > max` on every axis.
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f32::MAX, f32::MAX, f32::MAX),
            max: Point3::new(-f32::MAX, -f32::MAX, -f32::MAX),
        }
    }

    pub fn min(&self) -> &Point3<f32> {
        &self.min
    }

    pub fn max(&self) -> &Point3<f32> {
        &self.max
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn merge(&self, other: &Self) -> Self {
        let min = Point3::new(
            self.min.x.min(other.min.x),
            self.min.y.min(other.min.y),
            self.min.z.min(other.min.z),
        );
        let max = Point3::new(
            self.max.x.max(other.max.x),
            self.max.y.max(other.max.y),
            self.max.z.max(other.max.z),
        );
        Self { min, max }
    }

    pub fn merge_assign(&mut self, other: &Self) {
        *self = self.merge(other);
    }

    pub fn insert(&mut self, p: &Point3<f32>) {
        self.merge_assign(&Self { min: *p, max: *p });
    }

    pub fn extent(&self) -> Vector3<f32> {
        self.max - self.min
    }

    pub fn halfsize(&self) -> Vector3<f32> {
        0.5 * self.extent()
    }

    /// Center of the box.
    pub fn position(&self) -> Point3<f32> {
        na::center(&self.min, &self.max)
    }

    pub fn surface_area(&self) -> f32 {
        if self.is_empty() {
            return 0.0;
        }

        let extent = self.extent();
        2.0 * extent.x * extent.y + 2.0 * extent.x * extent.z + 2.0 * extent.y * extent.z
    }

    pub fn longest_axis(&self) -> Axis {
        let extent = self.extent();
        if extent.x > extent.y && extent.x > extent.z {
            Axis::X
        } else if extent.y > extent.z {
            Axis::Y
        } else {
            Axis::Z
        }
    }

    /// Raises the lower bound on `axis` to `d`.
    pub fn clip_min(&mut self, d: f32, axis: Axis) {
        let a = axis.index();
        self.min[a] = d.max(self.min[a]);
    }

    /// Lowers the upper bound on `axis` to `d`.
    pub fn clip_max(&mut self, d: f32, axis: Axis) {
        let a = axis.index();
        self.max[a] = d.min(self.max[a]);
    }

    pub fn contains(&self, other: &Self) -> bool {
        (0..3).all(|a| self.min[a] <= other.min[a] && other.max[a] <= self.max[a])
    }

    // Touching boxes count as intersecting
    pub fn intersects(&self, other: &Self) -> bool {
        (0..3).all(|a| self.min[a] <= other.max[a] && other.min[a] <= self.max[a])
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit() -> Aabb {
        Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn new_sorts_corners() {
        let b = Aabb::new(Point3::new(1.0, -1.0, 2.0), Point3::new(-1.0, 1.0, 0.0));
        assert_eq!(*b.min(), Point3::new(-1.0, -1.0, 0.0));
        assert_eq!(*b.max(), Point3::new(1.0, 1.0, 2.0));
    }

    #[test]
    fn empty_is_merge_identity() {
        let b = unit();
        assert!(Aabb::empty().is_empty());
        assert_eq!(Aabb::empty().merge(&b), b);
        assert_eq!(b.merge(&Aabb::empty()), b);
        assert_eq!(Aabb::empty().surface_area(), 0.0);
    }

    #[test]
    fn derived_quantities() {
        let b = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 4.0, 6.0));
        assert_eq!(b.surface_area(), 2.0 * (8.0 + 12.0 + 24.0));
        assert_eq!(b.halfsize(), Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(b.position(), Point3::new(1.0, 2.0, 3.0));
        assert_eq!(b.longest_axis(), Axis::Z);
    }

    #[test]
    fn clipping_only_shrinks() {
        let mut b = unit();
        b.clip_max(0.25, Axis::Y);
        b.clip_min(2.0, Axis::X);
        b.clip_min(-5.0, Axis::Z);
        assert_eq!(b.max().y, 0.25);
        assert_eq!(b.min().x, 2.0);
        assert_eq!(b.min().z, 0.0);
    }

    #[test]
    fn containment_and_intersection() {
        let outer = unit();
        let inner = Aabb::new(Point3::new(0.25, 0.25, 0.25), Point3::new(0.5, 0.5, 0.5));
        let touching = Aabb::new(Point3::new(1.0, 0.0, 0.0), Point3::new(2.0, 1.0, 1.0));
        let apart = Aabb::new(Point3::new(3.0, 3.0, 3.0), Point3::new(4.0, 4.0, 4.0));

        assert!(outer.contains(&inner));
        assert!(!inner.contains(&outer));
        assert!(outer.intersects(&touching));
        assert!(!outer.intersects(&apart));
    }
}
