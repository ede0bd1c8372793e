use super::node::BuildNode;
use crate::error::{Error, Result};
use crate::types::{Aabb, Axis};

/// A finished hierarchy: the build arena with the root at index 0, plus the
/// number of primitive references stored across all leaves.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Bvh {
    nodes: Vec<BuildNode>,
    num_references: u32,
}

impl Bvh {
    pub(crate) fn new(nodes: Vec<BuildNode>, num_references: u32) -> Self {
        Self {
            nodes,
            num_references,
        }
    }

    pub fn nodes(&self) -> &[BuildNode] {
        &self.nodes
    }

    /// Sum of the leaf sizes. Larger than the primitive count whenever spatial
    /// splits duplicated references.
    pub fn num_references(&self) -> u32 {
        self.num_references
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn aabb(&self) -> Aabb {
        self.nodes
            .first()
            .map(|root| *root.aabb())
            .unwrap_or_default()
    }

    pub fn num_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Number of edges on the longest root-to-leaf path.
    pub fn max_depth(&self) -> u32 {
        let mut max_depth = 0;

        self.walk(|_, _, depth| max_depth = max_depth.max(depth));

        max_depth
    }

    /// SAH cost metric of the hierarchy, normalised by the root area. Every
    /// inner node costs 1, every leaf costs its primitive count.
    pub fn sah_cost(&self) -> f32 {
        let root_area = self.aabb().surface_area();
        let mut cost = 0.0;

        self.walk(|_, node, _| {
            let weight = if node.is_leaf() {
                node.num_primitives() as f32
            } else {
                1.0
            };

            let ratio = if root_area > 0.0 {
                node.aabb().surface_area() / root_area
            } else {
                1.0
            };

            cost += weight * ratio;
        });

        cost
    }

    /// Checks the structure: every node reachable exactly once, children past
    /// their parent and inside its box, inner nodes without primitives, and a
    /// reference total matching the leaves.
    pub fn validate(&self) -> Result<()> {
        if self.nodes.is_empty() {
            return if self.num_references == 0 {
                Ok(())
            } else {
                Err(Error::InvalidNode {
                    node: 0,
                    reason: "references counted in an empty hierarchy",
                })
            };
        }

        let mut visited = 0;
        let mut num_references = 0;
        let mut stack = vec![0u32];

        while let Some(id) = stack.pop() {
            let node = &self.nodes[id as usize];
            visited += 1;

            let Some(children) = node.children() else {
                num_references += node.num_primitives();
                continue;
            };

            if !node.primitives().is_empty() {
                return Err(Error::InvalidNode {
                    node: id,
                    reason: "inner node owns primitives",
                });
            }

            for child in children {
                if child <= id || child as usize >= self.nodes.len() {
                    return Err(Error::InvalidNode {
                        node: id,
                        reason: "child index out of range",
                    });
                }

                let child_node = &self.nodes[child as usize];
                let empty_leaf = child_node.is_leaf() && child_node.primitives().is_empty();

                if !empty_leaf && !node.aabb().contains(child_node.aabb()) {
                    return Err(Error::InvalidNode {
                        node: child,
                        reason: "box not contained in its parent",
                    });
                }

                stack.push(child);
            }
        }

        if visited != self.nodes.len() {
            return Err(Error::InvalidNode {
                node: 0,
                reason: "unreachable or shared nodes in the arena",
            });
        }

        if num_references != self.num_references as usize {
            return Err(Error::InvalidNode {
                node: 0,
                reason: "leaf sizes do not add up to the reference count",
            });
        }

        Ok(())
    }

    /// Lays the hierarchy out depth first for traversal. The first child of an
    /// inner node directly follows it; leaves address a run of `indices`.
    pub fn flatten(&self) -> Tree {
        let mut tree = Tree {
            nodes: Vec::with_capacity(self.nodes.len()),
            indices: Vec::with_capacity(self.num_references as usize),
        };

        if !self.nodes.is_empty() {
            self.flatten_node(0, &mut tree);
        }

        tree
    }

    fn flatten_node(&self, id: u32, tree: &mut Tree) {
        let node = &self.nodes[id as usize];

        match node.children() {
            None => {
                tree.nodes.push(Node::Leaf {
                    aabb: *node.aabb(),
                    first: tree.indices.len() as u32,
                    count: node.num_primitives() as u32,
                });
                tree.indices.extend_from_slice(node.primitives());
            }
            Some([c0, c1]) => {
                let index = tree.nodes.len();
                tree.nodes.push(Node::Inner {
                    aabb: *node.aabb(),
                    second_child: 0,
                    axis: node.axis(),
                });

                self.flatten_node(c0, tree);
                let second = tree.nodes.len() as u32;
                self.flatten_node(c1, tree);

                if let Node::Inner { second_child, .. } = &mut tree.nodes[index] {
                    *second_child = second;
                }
            }
        }
    }

    /// Depth-first pre-order walk, first child before second.
    fn walk<F: FnMut(u32, &BuildNode, u32)>(&self, mut visit: F) {
        if self.nodes.is_empty() {
            return;
        }

        let mut stack = vec![(0u32, 0u32)];

        while let Some((id, depth)) = stack.pop() {
            let node = &self.nodes[id as usize];
            visit(id, node, depth);

            if let Some([c0, c1]) = node.children() {
                stack.push((c1, depth + 1));
                stack.push((c0, depth + 1));
            }
        }
    }
}

/// Traversal-ready node of a flattened `Tree`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Node {
    Inner {
        aabb: Aabb,
        second_child: u32,
        axis: Axis,
    },
    Leaf {
        aabb: Aabb,
        first: u32,
        count: u32,
    },
}

impl Node {
    pub fn aabb(&self) -> &Aabb {
        match self {
            Node::Inner { aabb, .. } | Node::Leaf { aabb, .. } => aabb,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Tree {
    pub nodes: Vec<Node>,
    pub indices: Vec<u32>,
}

impl Tree {
    /// Primitive indices of the leaf `node`, empty for inner nodes.
    pub fn primitives(&self, node: &Node) -> &[u32] {
        match *node {
            Node::Leaf { first, count, .. } => {
                &self.indices[first as usize..(first + count) as usize]
            }
            Node::Inner { .. } => &[],
        }
    }
}
