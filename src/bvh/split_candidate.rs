use na::Point3;

use super::reference::{Reference, References};
use crate::types::{Aabb, Axis};

/// An axis-aligned splitting plane and, once evaluated, what it would do to a
/// reference set.
#[derive(Clone, Copy, Debug)]
pub struct SplitCandidate {
    aabb_0: Aabb,
    aabb_1: Aabb,
    num_side_0: u32,
    num_side_1: u32,
    d: f32,
    cost: f32,
    axis: Axis,
    spatial: bool,
}

impl SplitCandidate {
    pub fn new(axis: Axis, p: &Point3<f32>, spatial: bool) -> Self {
        Self {
            aabb_0: Aabb::empty(),
            aabb_1: Aabb::empty(),
            num_side_0: 0,
            num_side_1: 0,
            d: p[axis.index()],
            cost: f32::MAX,
            axis,
            spatial,
        }
    }

    pub fn evaluate(&mut self, references: &[Reference], aabb_surface_area: f32) {
        let mut num_side_0 = 0;
        let mut num_side_1 = 0;

        let mut box_0 = Aabb::empty();
        let mut box_1 = Aabb::empty();

        if self.spatial {
            for r in references {
                let bounds = &r.bounds;

                if self.behind(bounds.max()) {
                    num_side_0 += 1;
                    box_0.merge_assign(bounds);
                } else if !self.behind(bounds.min()) {
                    num_side_1 += 1;
                    box_1.merge_assign(bounds);
                } else {
                    num_side_0 += 1;
                    num_side_1 += 1;
                    box_0.merge_assign(bounds);
                    box_1.merge_assign(bounds);
                }
            }

            box_0.clip_max(self.d, self.axis);
            box_1.clip_min(self.d, self.axis);
        } else {
            for r in references {
                if self.behind(r.bounds.max()) {
                    num_side_0 += 1;
                    box_0.merge_assign(&r.bounds);
                } else {
                    num_side_1 += 1;
                    box_1.merge_assign(&r.bounds);
                }
            }
        }

        // A plane that separates nothing is priced like not splitting at all
        self.cost = if num_side_0 == 0 || num_side_1 == 0 {
            references.len() as f32
        } else {
            (num_side_0 as f32 * box_0.surface_area() + num_side_1 as f32 * box_1.surface_area())
                / aabb_surface_area
        };

        self.aabb_0 = box_0;
        self.aabb_1 = box_1;
        self.num_side_0 = num_side_0;
        self.num_side_1 = num_side_1;
    }

    /// Splits `references` by this plane. Spatial candidates hand references
    /// straddling the plane to both sides, clipped to their side.
    pub fn distribute(&self, references: &[Reference]) -> (References, References) {
        let mut references0 = Vec::with_capacity(self.num_side_0 as usize);
        let mut references1 = Vec::with_capacity(self.num_side_1 as usize);

        if self.spatial {
            for r in references {
                if self.behind(r.bounds.max()) {
                    references0.push(*r);
                } else if !self.behind(r.bounds.min()) {
                    references1.push(*r);
                } else {
                    references0.push(r.clipped_max(self.d, self.axis));
                    references1.push(r.clipped_min(self.d, self.axis));
                }
            }
        } else {
            for r in references {
                if self.behind(r.bounds.max()) {
                    references0.push(*r);
                } else {
                    references1.push(*r);
                }
            }
        }

        (references0, references1)
    }

    pub fn behind(&self, point: &Point3<f32>) -> bool {
        point[self.axis.index()] < self.d
    }

    pub fn cost(&self) -> f32 {
        self.cost
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn plane(&self) -> f32 {
        self.d
    }

    pub fn spatial(&self) -> bool {
        self.spatial
    }

    pub fn aabb_0(&self) -> &Aabb {
        &self.aabb_0
    }

    pub fn aabb_1(&self) -> &Aabb {
        &self.aabb_1
    }

    pub fn num_side_0(&self) -> u32 {
        self.num_side_0
    }

    pub fn num_side_1(&self) -> u32 {
        self.num_side_1
    }
}
