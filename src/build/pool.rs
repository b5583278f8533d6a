//! Bounded worker pool over independent projects.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;

pub const MAX_WORKERS: usize = 8;

/// Clamp a requested pool size into `1..=MAX_WORKERS`, warning when adjusted.
pub fn clamp_workers(requested: usize) -> usize {
    let clamped = requested.clamp(1, MAX_WORKERS);
    if clamped != requested {
        tracing::warn!(
            requested,
            clamped,
            "max_workers out of range (1..={}), clamping",
            MAX_WORKERS
        );
        eprintln!(
            "Warning: max workers {} is out of range, using {}",
            requested, clamped
        );
    }
    clamped
}

/// Run `job` over `items` on up to `workers` threads.
///
/// `on_done` runs on the calling thread as each job finishes, with the
/// number completed so far. Results are returned in input order.
pub fn run_pool<T, R, F, D>(items: &[T], workers: usize, job: F, mut on_done: D) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync,
    D: FnMut(usize, &R),
{
    let workers = workers.clamp(1, items.len().max(1));
    let cursor = AtomicUsize::new(0);
    let mut slots: Vec<Option<R>> = std::iter::repeat_with(|| None).take(items.len()).collect();

    std::thread::scope(|scope| {
        let (tx, rx) = mpsc::channel();
        for _ in 0..workers {
            let tx = tx.clone();
            let cursor = &cursor;
            let job = &job;
            scope.spawn(move || {
                loop {
                    let index = cursor.fetch_add(1, Ordering::SeqCst);
                    let Some(item) = items.get(index) else {
                        break;
                    };
                    if tx.send((index, job(item))).is_err() {
                        break;
                    }
                }
            });
        }
        drop(tx);

        for (completed, (index, result)) in rx.into_iter().enumerate() {
            on_done(completed + 1, &result);
            slots[index] = Some(result);
        }
    });

    slots.into_iter().flatten().collect()
}
