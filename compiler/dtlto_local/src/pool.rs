//! Bounded worker pool over a shared atomic cursor.
//!
//! Workers pull the next unclaimed index until the slice is exhausted, so
//! slow items never strand work behind a static partition. The cursor and
//! the error list are the only state shared between workers.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use parking_lot::Mutex;

/// Number of workers for `items` units of work given a requested job count
/// (0 = hardware concurrency).
pub(crate) fn effective_jobs(requested: usize, items: usize) -> usize {
    let jobs = if requested == 0 {
        thread::available_parallelism()
            .map(std::num::NonZeroUsize::get)
            .unwrap_or(1)
    } else {
        requested
    };
    jobs.min(items)
}

/// Run `work` on every item and return the failures in item order.
///
/// Blocks until every worker has finished.
pub(crate) fn run_all<T, E, F>(items: &[T], jobs: usize, work: F) -> Vec<E>
where
    T: Sync,
    E: Send,
    F: Fn(&T) -> Result<(), E> + Sync,
{
    let workers = effective_jobs(jobs, items.len());
    let next_idx = AtomicUsize::new(0);
    let errors = Mutex::new(Vec::new());

    thread::scope(|scope| {
        for _ in 0..workers {
            scope.spawn(|| loop {
                let idx = next_idx.fetch_add(1, Ordering::Relaxed);
                let Some(item) = items.get(idx) else {
                    break;
                };
                if let Err(e) = work(item) {
                    errors.lock().push((idx, e));
                }
            });
        }
    });

    let mut errors = errors.into_inner();
    errors.sort_by_key(|(idx, _)| *idx);
    errors.into_iter().map(|(_, e)| e).collect()
}
