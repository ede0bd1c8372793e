#![allow(dead_code)]

use nalgebra::Point3;
use split_bvh::bvh::{Bvh, Reference, References};
use split_bvh::types::Aabb;

pub fn cube(x: f32, y: f32, z: f32) -> Aabb {
    Aabb::new(Point3::new(x, y, z), Point3::new(x + 1.0, y + 1.0, z + 1.0))
}

/// `n * n * n` disjoint unit cubes, two units apart.
pub fn grid(n: u32) -> Vec<Aabb> {
    let mut aabbs = Vec::new();
    for x in 0..n {
        for y in 0..n {
            for z in 0..n {
                aabbs.push(cube(x as f32 * 2.0, y as f32 * 2.0, z as f32 * 2.0));
            }
        }
    }
    aabbs
}

pub fn indices(aabbs: &[Aabb]) -> Vec<u32> {
    (0..aabbs.len() as u32).collect()
}

pub fn references(aabbs: &[Aabb]) -> (References, Aabb) {
    let references: References = aabbs
        .iter()
        .enumerate()
        .map(|(i, aabb)| Reference::new(*aabb, i as u32))
        .collect();
    let aabb = aabbs.iter().fold(Aabb::empty(), |acc, a| acc.merge(a));
    (references, aabb)
}

/// Leaves as sorted primitive lists, in depth-first order.
pub fn leaves(bvh: &Bvh) -> Vec<Vec<u32>> {
    let tree = bvh.flatten();
    tree.nodes
        .iter()
        .filter(|n| n.is_leaf())
        .map(|n| {
            let mut primitives = tree.primitives(n).to_vec();
            primitives.sort();
            primitives
        })
        .collect()
}

/// Every primitive ends up in at least one leaf, each leaf box overlaps the
/// bounds of the primitives it holds, and the leaf sizes add up.
pub fn assert_conserved(bvh: &Bvh, aabbs: &[Aabb]) {
    bvh.validate().unwrap();

    let tree = bvh.flatten();
    assert_eq!(tree.indices.len(), bvh.num_references() as usize);
    assert!(bvh.num_references() as usize >= aabbs.len());

    let mut seen = vec![false; aabbs.len()];
    for node in tree.nodes.iter().filter(|n| n.is_leaf()) {
        for &p in tree.primitives(node) {
            assert!(
                node.aabb().intersects(&aabbs[p as usize]),
                "primitive {} outside its leaf",
                p
            );
            seen[p as usize] = true;
        }
    }
    assert!(seen.iter().all(|&s| s), "primitive lost");
}
