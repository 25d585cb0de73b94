#[cfg(test)]
#[path = "../../tests/unit/utils/parallel_test.rs"]
mod parallel_test;

pub use self::actual::ThreadPool;
pub use self::actual::parallel_into_collect;

#[cfg(not(target_arch = "wasm32"))]
mod actual {
    use crate::utils::GenericResult;
    use rayon::prelude::*;
    use rayon::{ThreadPool as RayonThreadPool, ThreadPoolBuilder};

    /// Represents a thread pool wrapper.
    pub struct ThreadPool {
        inner: RayonThreadPool,
        num_threads: usize,
    }

    impl ThreadPool {
        /// Creates a new instance of `ThreadPool` with given amount of worker threads.
        pub fn new(num_threads: usize) -> GenericResult<Self> {
            let num_threads = num_threads.max(1);
            let inner = ThreadPoolBuilder::new()
                .num_threads(num_threads)
                .thread_name(|idx| format!("trsp-worker-{idx}"))
                .build()
                .map_err(|err| format!("cannot build a thread pool: {err}"))?;

            Ok(Self { inner, num_threads })
        }

        /// Executes given operation on thread pool, blocks until it is completed.
        pub fn execute<OP, R>(&self, op: OP) -> R
        where
            OP: FnOnce() -> R + Send,
            R: Send,
        {
            self.inner.install(op)
        }

        /// Returns amount of worker threads.
        pub fn num_threads(&self) -> usize {
            self.num_threads
        }
    }

    /// Maps collection and collects results into vector in parallel.
    pub fn parallel_into_collect<T, F, R>(source: Vec<T>, map_op: F) -> Vec<R>
    where
        T: Send + Sync,
        F: Fn(T) -> R + Sync + Send,
        R: Send,
    {
        source.into_par_iter().map(map_op).collect()
    }
}

#[cfg(target_arch = "wasm32")]
mod actual {
    use crate::utils::GenericResult;

    /// Represents a thread pool wrapper.
    pub struct ThreadPool;

    impl ThreadPool {
        /// Creates a new instance of `ThreadPool`.
        pub fn new(_num_threads: usize) -> GenericResult<Self> {
            Ok(Self {})
        }

        /// Executes given operation on thread pool (dummy).
        pub fn execute<OP, R>(&self, op: OP) -> R
        where
            OP: FnOnce() -> R + Send,
            R: Send,
        {
            op()
        }

        /// Returns amount of worker threads.
        pub fn num_threads(&self) -> usize {
            1
        }
    }

    /// Map collections and collects results into vector synchronously.
    pub fn parallel_into_collect<T, F, R>(source: Vec<T>, map_op: F) -> Vec<R>
    where
        T: Send + Sync,
        F: Fn(T) -> R + Sync + Send,
        R: Send,
    {
        source.into_iter().map(map_op).collect()
    }
}
