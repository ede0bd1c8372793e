use na::Point3;

use super::node::BuildNode;
use super::reference::{Reference, References};
use super::split_candidate::SplitCandidate;
use super::task::Tasks;
use crate::config::Settings;
use crate::thread::Pool;
use crate::types::{Aabb, Axis};

/// Up to this many references a node falls back to a leaf whenever splitting
/// does not pay off.
const SMALL_SET: u32 = 0xFF;

/// The recursive SAH splitter. Owns a node arena and its candidate scratch
/// buffer, so one kernel must never be shared between concurrent builds.
pub struct Kernel {
    settings: Settings,
    spatial_split_threshold: u32,
    build_nodes: Vec<BuildNode>,
    split_candidates: Vec<SplitCandidate>,
    num_references: u32,
}

impl Kernel {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            spatial_split_threshold: 0,
            build_nodes: Vec::new(),
            split_candidates: Vec::new(),
            num_references: 0,
        }
    }

    /// Clears the arena down to a single root placeholder.
    pub(crate) fn reset(&mut self, spatial_split_threshold: u32) {
        self.spatial_split_threshold = spatial_split_threshold;
        self.build_nodes.clear();
        self.build_nodes.push(BuildNode::default());
        self.num_references = 0;
    }

    #[cfg(test)]
    pub(crate) fn build_nodes(&self) -> &[BuildNode] {
        &self.build_nodes
    }

    pub(crate) fn num_references(&self) -> u32 {
        self.num_references
    }

    pub(crate) fn take_nodes(&mut self) -> Vec<BuildNode> {
        std::mem::take(&mut self.build_nodes)
    }

    /// Builds the subtree rooted at `node_id` over `references`, which are
    /// consumed and released as early as possible.
    ///
    /// `pool` enables parallel candidate evaluation. With `tasks` present,
    /// subtrees below the parallelize threshold are queued instead of built.
    pub(crate) fn split(
        &mut self,
        node_id: u32,
        references: References,
        aabb: &Aabb,
        depth: u32,
        pool: Option<&Pool>,
        mut tasks: Option<&mut Tasks>,
    ) {
        self.build_nodes[node_id as usize].set_aabb(*aabb);

        let num_primitives = references.len() as u32;

        if num_primitives <= self.settings.max_primitives {
            self.assign(node_id, &references);
            return;
        }

        if let Some(tasks) = tasks.as_deref_mut() {
            if num_primitives < self.settings.parallelize_building_threshold {
                tasks.push(node_id, depth, *aabb, references);
                return;
            }
        }

        let (sp, exhausted) = self.splitting_plane(&references, aabb, depth, pool);

        let small = num_primitives <= SMALL_SET;

        if small && (num_primitives as f32 <= sp.cost() || exhausted) {
            self.assign(node_id, &references);
            return;
        }

        if exhausted {
            // TODO: distribute the references arbitrarily to two children so
            // that max_primitives holds even without a separating plane.
            log::warn!(
                "Cannot split node further, keeping {} references in one leaf",
                num_primitives
            );
            self.assign(node_id, &references);
            return;
        }

        let (references0, references1) = sp.distribute(&references);

        if small && (references0.is_empty() || references1.is_empty()) {
            // Every reference was (partially) on the same side of the plane
            self.assign(node_id, &references);
            return;
        }

        drop(references);

        let child0 = self.build_nodes.len() as u32;
        self.build_nodes[node_id as usize].set_split_node([child0, child0 + 1], sp.axis());
        self.build_nodes.push(BuildNode::default());
        self.build_nodes.push(BuildNode::default());

        let depth = depth + 1;

        self.split(
            child0,
            references0,
            sp.aabb_0(),
            depth,
            pool,
            tasks.as_deref_mut(),
        );
        self.split(child0 + 1, references1, sp.aabb_1(), depth, pool, tasks);
    }

    /// Returns the cheapest candidate for `references` and whether it failed
    /// to separate anything from the parent.
    pub(crate) fn splitting_plane(
        &mut self,
        references: &[Reference],
        aabb: &Aabb,
        depth: u32,
        pool: Option<&Pool>,
    ) -> (SplitCandidate, bool) {
        self.generate_candidates(references, aabb, depth);

        let num_references = references.len() as u32;
        let aabb_surface_area = aabb.surface_area();

        match pool {
            Some(pool) if num_references >= self.settings.parallel_evaluation_threshold => {
                pool.run_range(&mut self.split_candidates, |_, _, candidates| {
                    for sc in candidates {
                        sc.evaluate(references, aabb_surface_area);
                    }
                });
            }
            _ => {
                for sc in self.split_candidates.iter_mut() {
                    sc.evaluate(references, aabb_surface_area);
                }
            }
        }

        // First found wins ties, which keeps the result independent of how
        // the evaluation was scheduled.
        let mut sp = &self.split_candidates[0];
        for sc in &self.split_candidates[1..] {
            if sc.cost() < sp.cost() {
                sp = sc;
            }
        }

        let exhausted = (sp.aabb_0() == aabb && num_references == sp.num_side_0())
            || (sp.aabb_1() == aabb && num_references == sp.num_side_1());

        (*sp, exhausted)
    }

    fn generate_candidates(&mut self, references: &[Reference], aabb: &Aabb, depth: u32) {
        self.split_candidates.clear();

        let position = aabb.position();

        for axis in Axis::ALL {
            self.split_candidates
                .push(SplitCandidate::new(axis, &position, false));
        }

        if references.len() as u32 <= self.settings.sweep_threshold {
            for r in references {
                let max = r.bounds.max();
                for axis in Axis::ALL {
                    self.split_candidates
                        .push(SplitCandidate::new(axis, max, false));
                }
            }

            return;
        }

        let min = aabb.min();
        let extent = aabb.extent();
        let step = extent[aabb.longest_axis().index()] / self.settings.num_slices as f32;

        if step <= 0.0 {
            return;
        }

        let spatial = depth < self.spatial_split_threshold;

        for axis in Axis::ALL {
            let a = axis.index();
            let num_steps = (extent[a] / step).ceil() as u32;
            let step_a = extent[a] / num_steps as f32;

            for i in 1..num_steps {
                let mut slice: Point3<f32> = position;
                slice[a] = min[a] + i as f32 * step_a;

                self.split_candidates
                    .push(SplitCandidate::new(axis, &slice, false));

                if spatial {
                    self.split_candidates
                        .push(SplitCandidate::new(axis, &slice, true));
                }
            }
        }
    }

    fn assign(&mut self, node_id: u32, references: &[Reference]) {
        let primitives: Vec<u32> = references.iter().map(|r| r.primitive).collect();
        self.num_references += primitives.len() as u32;
        self.build_nodes[node_id as usize].set_leaf_node(primitives);
    }

    /// Grafts the arena of `sub`, built for the placeholder `node_id`, into
    /// this kernel. `sub` is left empty but keeps its allocations.
    pub(crate) fn merge(&mut self, node_id: u32, sub: &mut Kernel) {
        self.num_references += sub.num_references;
        sub.num_references = 0;

        let mut sub_nodes = sub.build_nodes.drain(..);

        let Some(mut sub_root) = sub_nodes.next() else {
            return;
        };

        let offset = self.build_nodes.len() as u32 - 1;

        let node = &mut self.build_nodes[node_id as usize];
        node.set_aabb(*sub_root.aabb());

        match sub_root.children() {
            None => node.set_leaf_node(sub_root.take_primitives()),
            Some([c0, c1]) => {
                node.set_split_node([c0 + offset, c1 + offset], sub_root.axis());

                self.build_nodes.extend(sub_nodes.map(|mut n| {
                    n.offset_children(offset);
                    n
                }));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(min: [f32; 3], max: [f32; 3], primitive: u32) -> Reference {
        Reference::new(
            Aabb::new(Point3::from(min), Point3::from(max)),
            primitive,
        )
    }

    fn bounds(references: &[Reference]) -> Aabb {
        references
            .iter()
            .fold(Aabb::empty(), |aabb, r| aabb.merge(&r.bounds))
    }

    fn row(count: u32) -> References {
        (0..count)
            .map(|i| {
                let x = i as f32 * 2.0;
                reference([x, 0.0, 0.0], [x + 1.0, 1.0, 1.0], i)
            })
            .collect()
    }

    #[test]
    fn sweep_generates_medians_then_one_candidate_per_reference_and_axis() {
        let settings = Settings::default();
        let mut kernel = Kernel::new(settings);
        kernel.reset(0);

        let references = row(5);
        kernel.generate_candidates(&references, &bounds(&references), 0);

        assert_eq!(kernel.split_candidates.len(), 3 + 3 * 5);
        assert!(kernel.split_candidates.iter().all(|sc| !sc.spatial()));
        assert_eq!(kernel.split_candidates[0].plane(), 4.5);
        assert_eq!(kernel.split_candidates[3].axis(), Axis::X);
        assert_eq!(kernel.split_candidates[3].plane(), 1.0);
    }

    #[test]
    fn binning_adds_spatial_candidates_only_above_the_depth_threshold() {
        let settings = Settings {
            sweep_threshold: 2,
            num_slices: 4,
            ..Settings::default()
        };
        let mut kernel = Kernel::new(settings);
        kernel.reset(1);

        // 15 x 1 x 1: step is 3.75, so X gets 3 inner planes, Y and Z none
        let references = row(8);
        let aabb = bounds(&references);

        kernel.generate_candidates(&references, &aabb, 0);
        let spatial = kernel.split_candidates.iter().filter(|sc| sc.spatial()).count();
        assert_eq!(kernel.split_candidates.len(), 3 + 2 * 3);
        assert_eq!(spatial, 3);

        kernel.generate_candidates(&references, &aabb, 1);
        assert_eq!(kernel.split_candidates.len(), 3 + 3);
        let planes: Vec<f32> = kernel.split_candidates[3..]
            .iter()
            .map(|sc| sc.plane())
            .collect();
        assert_eq!(planes, vec![3.75, 7.5, 11.25]);
    }

    #[test]
    fn degenerate_box_generates_only_medians() {
        let settings = Settings {
            sweep_threshold: 1,
            ..Settings::default()
        };
        let mut kernel = Kernel::new(settings);
        kernel.reset(4);

        let references = vec![reference([1.0; 3], [1.0; 3], 0); 3];
        kernel.generate_candidates(&references, &bounds(&references), 0);
        assert_eq!(kernel.split_candidates.len(), 3);
    }

    #[test]
    fn small_sets_become_a_single_leaf() {
        let settings = Settings::default();
        let mut kernel = Kernel::new(settings);
        kernel.reset(0);

        let references = row(4);
        let aabb = bounds(&references);
        kernel.split(0, references, &aabb, 0, None, None);

        assert_eq!(kernel.build_nodes().len(), 1);
        assert_eq!(kernel.build_nodes()[0].primitives(), &[0, 1, 2, 3]);
        assert_eq!(kernel.num_references(), 4);
    }

    #[test]
    fn merge_rebases_sub_arena() {
        let settings = Settings {
            max_primitives: 1,
            ..Settings::default()
        };

        let mut master = Kernel::new(settings);
        master.reset(0);
        master.build_nodes[0].set_split_node([1, 2], Axis::X);
        master.build_nodes.push(BuildNode::default());
        master.build_nodes.push(BuildNode::default());

        let mut sub = Kernel::new(settings);
        sub.reset(0);
        let references = row(3);
        let aabb = bounds(&references);
        sub.split(0, references, &aabb, 0, None, None);
        assert_eq!(sub.build_nodes().len(), 5);

        master.merge(2, &mut sub);

        assert!(sub.build_nodes().is_empty());
        assert_eq!(master.num_references(), 3);
        assert_eq!(master.build_nodes().len(), 3 + 4);
        assert_eq!(master.build_nodes()[2].aabb(), &aabb);

        let [c0, c1] = master.build_nodes()[2].children().unwrap();
        assert_eq!([c0, c1], [3, 4]);

        let mut stack = vec![2u32];
        let mut primitives = Vec::new();
        while let Some(n) = stack.pop() {
            let node = &master.build_nodes()[n as usize];
            match node.children() {
                Some([a, b]) => stack.extend([a, b]),
                None => primitives.extend_from_slice(node.primitives()),
            }
        }
        primitives.sort();
        assert_eq!(primitives, vec![0, 1, 2]);
    }

    #[test]
    fn merge_moves_single_leaf_into_placeholder() {
        let settings = Settings::default();

        let mut master = Kernel::new(settings);
        master.reset(0);

        let mut sub = Kernel::new(settings);
        sub.reset(0);
        let references = row(2);
        let aabb = bounds(&references);
        sub.split(0, references, &aabb, 0, None, None);

        master.merge(0, &mut sub);

        assert_eq!(master.build_nodes().len(), 1);
        assert_eq!(master.build_nodes()[0].primitives(), &[0, 1]);
        assert_eq!(master.num_references(), 2);
    }
}
