use crate::types::{Aabb, Axis};

/// A primitive's (possibly clipped) bounds together with its original index.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Reference {
    pub bounds: Aabb,
    pub primitive: u32,
}

pub type References = Vec<Reference>;

impl Reference {
    pub fn new(bounds: Aabb, primitive: u32) -> Self {
        Self { bounds, primitive }
    }

    pub fn clipped_min(&self, d: f32, axis: Axis) -> Self {
        let mut r = *self;
        r.bounds.clip_min(d, axis);
        r
    }

    pub fn clipped_max(&self, d: f32, axis: Axis) -> Self {
        let mut r = *self;
        r.bounds.clip_max(d, axis);
        r
    }
}
