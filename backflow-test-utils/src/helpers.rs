// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use std::sync::{Arc, Barrier};
use std::thread;

/// Run `task(thread_index)` on `threads` OS threads released together by a barrier,
/// then join them all.
///
/// # Panics
/// Propagates a panic from any of the threads.
pub fn run_concurrently<F>(threads: usize, task: F)
where
    F: Fn(usize) + Send + Sync + 'static,
{
    let barrier = Arc::new(Barrier::new(threads));
    let task = Arc::new(task);

    let handles: Vec<_> = (0..threads)
        .map(|index| {
            let barrier = Arc::clone(&barrier);
            let task = Arc::clone(&task);
            thread::spawn(move || {
                barrier.wait();
                task(index);
            })
        })
        .collect();

    for handle in handles {
        if let Err(payload) = handle.join() {
            std::panic::resume_unwind(payload);
        }
    }
}

/// The integers `[start, start + count)` as a vector, for comparing against received values.
pub fn expected_range(start: i64, count: usize) -> Vec<i64> {
    (0..count as i64).map(|offset| start + offset).collect()
}
