use rayon::prelude::*;

use crate::error::Result;

/// Fixed-size worker pool. Both entry points block until every worker is done.
pub struct Pool {
    inner: rayon::ThreadPool,
}

impl Pool {
    pub fn new(num_threads: u32) -> Result<Self> {
        let inner = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads.max(1) as usize)
            .thread_name(|i| format!("bvh-worker-{}", i))
            .build()?;

        Ok(Self { inner })
    }

    /// Resolves a thread request: `request <= 0` means all hardware threads
    /// minus `|request|`, anything else is clamped to the hardware threads.
    pub fn available_threads(request: i32) -> u32 {
        let available = std::thread::available_parallelism()
            .map(|n| n.get() as u32)
            .unwrap_or(1);

        if request <= 0 {
            let num_threads = available as i32 + request;
            return num_threads.max(1) as u32;
        }

        available.min(request as u32)
    }

    pub fn num_threads(&self) -> u32 {
        self.inner.current_num_threads() as u32
    }

    /// Invokes `program` once per worker with the worker's id.
    pub fn run_parallel<F>(&self, program: F)
    where
        F: Fn(u32) + Sync,
    {
        self.inner.broadcast(|context| program(context.index() as u32));
    }

    /// Splits `items` into one contiguous partition per worker and calls
    /// `program(partition, begin, items[begin..end])` on each. Returns the
    /// per-partition results in partition order.
    pub fn run_range<T, R, F>(&self, items: &mut [T], program: F) -> Vec<R>
    where
        T: Send,
        R: Send,
        F: Fn(u32, usize, &mut [T]) -> R + Sync,
    {
        if items.is_empty() {
            return Vec::new();
        }

        let chunk_size = items.len().div_ceil(self.num_threads() as usize);

        self.inner.install(|| {
            items
                .par_chunks_mut(chunk_size)
                .enumerate()
                .map(|(id, chunk)| program(id as u32, id * chunk_size, chunk))
                .collect()
        })
    }
}
