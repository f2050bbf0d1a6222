use rayon::prelude::*;

/// Runs one job per page on a bounded rayon pool.
///
/// Pages share nothing, so each job runs independently and its result is
/// returned at its page's position.
#[derive(Debug, Clone, Copy)]
pub struct PageScheduler {
    max_concurrent: usize,
}

impl PageScheduler {
    /// `workers` is clamped to at least one.
    pub fn new(workers: usize) -> Self {
        Self {
            max_concurrent: workers.max(1),
        }
    }

    /// Threads used for `num_pages` pages: the worker limit, but never more
    /// threads than pages.
    pub fn threads_for(&self, num_pages: usize) -> usize {
        self.max_concurrent.min(num_pages).max(1)
    }

    /// Run `job` once per page index and collect the results in page order.
    ///
    /// With a single thread everything runs on the calling thread. A panic
    /// inside `job` is propagated to the caller.
    pub fn run<T, F>(&self, num_pages: usize, job: F) -> Vec<T>
    where
        T: Send,
        F: Fn(usize) -> T + Sync,
    {
        let threads = self.threads_for(num_pages);
        tracing::debug!(pages = num_pages, threads, "scheduling pages");

        if threads <= 1 {
            return (0..num_pages).map(job).collect();
        }

        let pool = match rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("parascan-page-{i}"))
            .build()
        {
            Ok(pool) => pool,
            Err(e) => {
                tracing::warn!(error = %e, "page pool unavailable, running inline");
                return (0..num_pages).map(job).collect();
            }
        };

        pool.install(|| (0..num_pages).into_par_iter().map(&job).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn threads_never_exceed_pages() {
        assert_eq!(PageScheduler::new(8).threads_for(2), 2);
        assert_eq!(PageScheduler::new(3).threads_for(7), 3);
        assert_eq!(PageScheduler::new(4).threads_for(0), 1);
        assert_eq!(PageScheduler::new(0).threads_for(3), 1);
    }

    #[test]
    fn results_come_back_in_page_order() {
        let calls = AtomicUsize::new(0);
        let out = PageScheduler::new(4).run(23, |i| {
            calls.fetch_add(1, Ordering::Relaxed);
            i * 10
        });
        assert_eq!(out, (0..23).map(|i| i * 10).collect::<Vec<_>>());
        assert_eq!(calls.load(Ordering::Relaxed), 23);
    }

    #[test]
    fn huge_worker_count_is_bounded_by_pages() {
        let out = PageScheduler::new(usize::MAX).run(2, |i| i);
        assert_eq!(out, vec![0, 1]);
    }

    #[test]
    fn single_worker_runs_inline() {
        let caller = std::thread::current().id();
        let out = PageScheduler::new(1).run(3, |i| {
            assert_eq!(std::thread::current().id(), caller);
            i + 1
        });
        assert_eq!(out, vec![1, 2, 3]);
        assert!(PageScheduler::new(5).run(0, |i| i).is_empty());
    }

    #[test]
    #[should_panic(expected = "page 3 exploded")]
    fn job_panics_reach_the_caller() {
        PageScheduler::new(2).run(4, |i| {
            if i == 3 {
                panic!("page 3 exploded");
            }
            i
        });
    }
}
