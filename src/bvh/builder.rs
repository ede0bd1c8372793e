use std::time::Instant;

use super::kernel::Kernel;
use super::reference::{Reference, References};
use super::task::Tasks;
use super::tree::Bvh;
use crate::config::Settings;
use crate::thread::Pool;
use crate::types::Aabb;

/// Entry point of the build. Keeps the master kernel and, once a build was
/// large enough to need them, the task kernels across builds.
pub struct Builder {
    settings: Settings,
    kernel: Kernel,
    tasks: Option<Tasks>,
}

impl Builder {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            kernel: Kernel::new(settings),
            tasks: None,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Builds a hierarchy over the primitives named by `indices`, whose bounds
    /// are looked up in `aabbs`.
    ///
    /// # Panics
    ///
    /// If an index is out of range for `aabbs`.
    pub fn build(&mut self, aabbs: &[Aabb], indices: &[u32], pool: &Pool) -> Bvh {
        if indices.is_empty() {
            return Bvh::default();
        }

        let mut references = vec![Reference::new(Aabb::empty(), 0); indices.len()];

        let partial_aabbs = pool.run_range(&mut references, |_, begin, chunk| {
            let mut aabb = Aabb::empty();

            for (r, &primitive) in chunk.iter_mut().zip(&indices[begin..]) {
                *r = Reference::new(aabbs[primitive as usize], primitive);
                aabb.merge_assign(&r.bounds);
            }

            aabb
        });

        let aabb = partial_aabbs
            .iter()
            .fold(Aabb::empty(), |aabb, partial| aabb.merge(partial));

        self.split(references, &aabb, pool)
    }

    /// Builds a hierarchy over `references`, all of which lie inside `aabb`.
    pub fn split(&mut self, references: References, aabb: &Aabb, pool: &Pool) -> Bvh {
        let num_references = references.len() as u32;

        if num_references == 0 {
            return Bvh::default();
        }

        let spatial_split_threshold = self
            .settings
            .spatial_split_threshold
            .unwrap_or_else(|| adaptive_spatial_split_threshold(num_references));

        let num_tasks = num_references
            .checked_div(self.settings.parallelize_building_threshold)
            .unwrap_or(0);

        if self.tasks.is_none() && self.settings.parallel_tasks && num_tasks >= 2 {
            log::debug!("Allocating {} task kernels", num_tasks);
            self.tasks = Some(Tasks::new(self.settings, num_tasks as usize));
        }

        let now = Instant::now();

        self.kernel.reset(spatial_split_threshold);

        if let Some(tasks) = self.tasks.as_mut() {
            tasks.reset(spatial_split_threshold);
        }

        self.kernel.split(
            0,
            references,
            aabb,
            0,
            Some(pool),
            self.tasks.as_mut(),
        );

        log::debug!(
            "Sequential phase: {} references, spatial splits down to depth {}, {:?}",
            num_references,
            spatial_split_threshold,
            now.elapsed()
        );

        if let Some(tasks) = self.tasks.as_mut() {
            let num_tasks = tasks.len();
            let now = Instant::now();

            tasks.work_on_tasks(pool);
            tasks.merge_into(&mut self.kernel);

            log::debug!("Built and merged {} tasks in {:?}", num_tasks, now.elapsed());
        }

        Bvh::new(self.kernel.take_nodes(), self.kernel.num_references())
    }
}

/// Spatial splits are allowed in the top half of the expected tree depth.
fn adaptive_spatial_split_threshold(num_references: u32) -> u32 {
    ((num_references as f32).log2() / 2.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use na::Point3;

    fn cube(x: f32, y: f32, z: f32) -> Aabb {
        Aabb::new(Point3::new(x, y, z), Point3::new(x + 1.0, y + 1.0, z + 1.0))
    }

    fn grid(n: u32) -> Vec<Aabb> {
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

    #[test]
    fn adaptive_threshold() {
        assert_eq!(adaptive_spatial_split_threshold(1), 0);
        assert_eq!(adaptive_spatial_split_threshold(8), 2);
        assert_eq!(adaptive_spatial_split_threshold(1024), 5);
        assert_eq!(adaptive_spatial_split_threshold(1 << 20), 10);
    }

    #[test]
    fn build_picks_only_the_indexed_primitives() {
        let pool = Pool::new(2).unwrap();
        let mut builder = Builder::new(Settings::default());

        let aabbs = grid(3);
        let bvh = builder.build(&aabbs, &[26, 0, 13], &pool);

        assert!(bvh.validate().is_ok());
        assert_eq!(bvh.num_references(), 3);
        assert_eq!(bvh.aabb(), cube(0.0, 0.0, 0.0).merge(&cube(4.0, 4.0, 4.0)));

        let mut primitives = bvh.flatten().indices;
        primitives.sort();
        assert_eq!(primitives, vec![0, 13, 26]);
    }

    #[test]
    fn zero_parallelize_threshold_builds_without_tasks() {
        let pool = Pool::new(2).unwrap();
        let mut builder = Builder::new(Settings {
            parallelize_building_threshold: 0,
            ..Settings::default()
        });

        let aabbs = grid(5);
        let indices: Vec<u32> = (0..aabbs.len() as u32).collect();
        let bvh = builder.build(&aabbs, &indices, &pool);

        assert!(builder.tasks.is_none());
        assert!(bvh.validate().is_ok());
        assert!(bvh.num_references() >= 125);
    }

    #[test]
    fn empty_input_gives_empty_hierarchy() {
        let pool = Pool::new(2).unwrap();
        let mut builder = Builder::new(Settings::default());

        let bvh = builder.build(&grid(2), &[], &pool);
        assert!(bvh.is_empty());
        assert_eq!(bvh.num_references(), 0);
    }

    #[test]
    fn builder_is_reusable() {
        let pool = Pool::new(4).unwrap();
        let settings = Settings {
            parallelize_building_threshold: 64,
            parallel_evaluation_threshold: 64,
            ..Settings::default()
        };
        let mut builder = Builder::new(settings);

        let aabbs = grid(8);
        let indices: Vec<u32> = (0..aabbs.len() as u32).collect();

        let first = builder.build(&aabbs, &indices, &pool);
        assert!(builder.tasks.is_some());
        let second = builder.build(&aabbs, &indices, &pool);

        assert!(first.validate().is_ok());
        assert_eq!(first.flatten(), second.flatten());
    }
}
