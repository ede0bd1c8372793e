use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::kernel::Kernel;
use super::reference::References;
use crate::config::Settings;
use crate::thread::Pool;
use crate::types::Aabb;

/// A deferred subtree: everything needed to build it with a private kernel.
struct Task {
    root: u32,
    depth: u32,
    aabb: Aabb,
    references: References,
    kernel: Kernel,
}

impl Task {
    fn run(&mut self, spatial_split_threshold: u32) {
        let references = std::mem::take(&mut self.references);

        self.kernel.reset(spatial_split_threshold);
        self.kernel
            .split(0, references, &self.aabb, self.depth, None, None);
    }
}

struct Slot(UnsafeCell<Task>);

// Slots are only handed out through `Tasks::claim`, once each, and only from
// within `Tasks::work_on_tasks`.
unsafe impl Sync for Slot {}

/// Subtrees queued by the master kernel during the sequential phase, together
/// with the private kernels that build them.
pub(crate) struct Tasks {
    settings: Settings,
    spatial_split_threshold: u32,
    kernels: Vec<Kernel>,
    queue: Vec<Slot>,
    current: AtomicUsize,
}

impl Tasks {
    pub(crate) fn new(settings: Settings, num_kernels: usize) -> Self {
        Self {
            settings,
            spatial_split_threshold: 0,
            kernels: (0..num_kernels).map(|_| Kernel::new(settings)).collect(),
            queue: Vec::with_capacity(num_kernels),
            current: AtomicUsize::new(0),
        }
    }

    pub(crate) fn reset(&mut self, spatial_split_threshold: u32) {
        self.spatial_split_threshold = spatial_split_threshold;
        self.queue.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.queue.len()
    }

    pub(crate) fn push(&mut self, root: u32, depth: u32, aabb: Aabb, references: References) {
        let kernel = self
            .kernels
            .pop()
            .unwrap_or_else(|| Kernel::new(self.settings));

        self.queue.push(Slot(UnsafeCell::new(Task {
            root,
            depth,
            aabb,
            references,
            kernel,
        })));
    }

    #[allow(clippy::mut_from_ref)]
    fn claim(&self) -> Option<&mut Task> {
        let index = self.current.fetch_add(1, Ordering::Relaxed);
        let slot = self.queue.get(index)?;

        // SAFETY: only `work_on_tasks` may call this. It resets the counter
        // under `&mut self`, so fetch_add yields every index at most once
        // while the workers run, and everything else touching the queue
        // needs `&mut self`. This is the only live reference to the task.
        Some(unsafe { &mut *slot.0.get() })
    }

    /// Builds every queued subtree on the pool. Workers pull tasks through a
    /// shared counter until the queue is drained.
    pub(crate) fn work_on_tasks(&mut self, pool: &Pool) {
        if self.queue.is_empty() {
            return;
        }

        *self.current.get_mut() = 0;

        let tasks = &*self;
        let spatial_split_threshold = self.spatial_split_threshold;

        pool.run_parallel(|_| {
            while let Some(task) = tasks.claim() {
                task.run(spatial_split_threshold);
            }
        });
    }

    /// Grafts every finished subtree into `master`, in queue order, and keeps
    /// the private kernels for the next build.
    pub(crate) fn merge_into(&mut self, master: &mut Kernel) {
        for slot in self.queue.drain(..) {
            let mut task = slot.0.into_inner();
            master.merge(task.root, &mut task.kernel);
            self.kernels.push(task.kernel);
        }
    }
}
