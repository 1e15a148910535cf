//! A shared job board: producers post jobs while workers claim and finish them.
//!
//! `find_first_of` only returns a snapshot, so a worker that spots a job must
//! still win the `remove_if` for it. Exactly one worker's removal reports 1;
//! everyone else sees 0 and looks for another job.

use handover::CoupledList;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

#[derive(Clone, Debug)]
struct Job {
    id: usize,
    priority: u8,
}

fn main() {
    const PRODUCERS: usize = 3;
    const JOBS_EACH: usize = 200;
    const WORKERS: usize = 4;

    let board = CoupledList::new();
    let posted = AtomicUsize::new(0);
    let finished = AtomicUsize::new(0);

    thread::scope(|s| {
        for p in 0..PRODUCERS {
            let board = &board;
            let posted = &posted;
            s.spawn(move || {
                for i in 0..JOBS_EACH {
                    let id = p * JOBS_EACH + i;
                    board.push_front(Job {
                        id,
                        priority: (id % 3) as u8,
                    });
                    posted.fetch_add(1, Ordering::Release);
                }
            });
        }

        for _ in 0..WORKERS {
            let board = &board;
            let posted = &posted;
            let finished = &finished;
            s.spawn(move || loop {
                // Read before searching: a miss after every job was posted means the board is drained.
                let all_posted = posted.load(Ordering::Acquire) == PRODUCERS * JOBS_EACH;

                // Prefer urgent work, fall back to anything.
                let job = board
                    .find_first_of(|j| j.priority == 0)
                    .or_else(|| board.find_first_of(|_| true));

                match job {
                    Some(job) => {
                        if board.remove_if(|j| j.id == job.id) == 1 {
                            finished.fetch_add(1, Ordering::AcqRel);
                        }
                    }
                    None if all_posted => break,
                    None => thread::yield_now(),
                }
            });
        }
    });

    assert!(board.is_empty());
    assert_eq!(finished.load(Ordering::Acquire), PRODUCERS * JOBS_EACH);
    println!(
        "{} jobs posted by {PRODUCERS} producers, all claimed exactly once by {WORKERS} workers",
        PRODUCERS * JOBS_EACH
    );
}
