mod builder;
mod kernel;
mod node;
mod reference;
mod split_candidate;
mod task;
mod tree;

pub use builder::Builder;
pub use node::BuildNode;
pub use reference::{Reference, References};
pub use split_candidate::SplitCandidate;
pub use tree::{Bvh, Node, Tree};
