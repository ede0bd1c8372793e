//! Parallel SAH bounding volume hierarchy builder with spatial splits.
//!
//! [`bvh::Builder`] turns primitive bounds into a [`bvh::Bvh`] on a
//! [`thread::Pool`]; [`bvh::Bvh::flatten`] produces the traversal layout.

extern crate nalgebra as na;

pub mod bvh;
pub mod config;
pub mod error;
pub mod objects;
pub mod scenes;
pub mod thread;
pub mod types;

pub use error::{Error, Result};
