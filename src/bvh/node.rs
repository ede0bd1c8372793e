use crate::types::{Aabb, Axis};

/// Node of the build arena. Either an inner node with two children, addressed
/// by their index in the arena, or a leaf owning its primitive indices.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BuildNode {
    aabb: Aabb,
    children: Option<[u32; 2]>,
    axis: Axis,
    primitives: Vec<u32>,
}

impl BuildNode {
    pub fn aabb(&self) -> &Aabb {
        &self.aabb
    }

    pub fn children(&self) -> Option<[u32; 2]> {
        self.children
    }

    /// Split axis of an inner node.
    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn primitives(&self) -> &[u32] {
        &self.primitives
    }

    pub fn num_primitives(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    pub(crate) fn set_aabb(&mut self, aabb: Aabb) {
        self.aabb = aabb;
    }

    pub(crate) fn set_split_node(&mut self, children: [u32; 2], axis: Axis) {
        self.children = Some(children);
        self.axis = axis;
        self.primitives = Vec::new();
    }

    pub(crate) fn set_leaf_node(&mut self, primitives: Vec<u32>) {
        self.children = None;
        self.primitives = primitives;
    }

    pub(crate) fn take_primitives(&mut self) -> Vec<u32> {
        std::mem::take(&mut self.primitives)
    }

    pub(crate) fn offset_children(&mut self, offset: u32) {
        if let Some(children) = self.children.as_mut() {
            children[0] += offset;
            children[1] += offset;
        }
    }
}
