use handover::concurrency::sync::{wait_on_u32, wake_all_u32, NodeMutex};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[test]
fn test_mutex_basic() {
    let mutex = NodeMutex::new(String::from("a"));
    {
        let mut guard = mutex.lock();
        guard.push('b');
    }
    {
        let guard = mutex.lock();
        assert_eq!(*guard, "ab");
    }
}

#[test]
fn test_mutex_contention() {
    let mutex = Arc::new(NodeMutex::new(0u32));
    let m1 = mutex.clone();
    let m2 = mutex.clone();

    thread::scope(|s| {
        let t1 = s.spawn(move || {
            for _ in 0..1_000 {
                *m1.lock() += 1;
            }
        });

        let t2 = s.spawn(move || {
            for _ in 0..1_000 {
                *m2.lock() += 1;
            }
        });

        t1.join().unwrap();
        t2.join().unwrap();
    });

    assert_eq!(*mutex.lock(), 2_000);
}

#[test]
fn test_parked_waiters_all_wake() {
    const WAITERS: usize = 6;

    let mutex = Arc::new(NodeMutex::new(Vec::new()));
    let guard = mutex.lock();

    thread::scope(|s| {
        for i in 0..WAITERS {
            let m = mutex.clone();
            s.spawn(move || {
                m.lock().push(i);
            });
        }

        // Give the waiters time to exhaust their spin and park.
        thread::sleep(Duration::from_millis(100));
        drop(guard);
    });

    let mut seen = mutex.lock().clone();
    seen.sort_unstable();
    assert_eq!(seen, (0..WAITERS).collect::<Vec<_>>());
}

#[test]
fn test_wait_and_wake_all() {
    let word = Arc::new(AtomicU32::new(0));

    thread::scope(|s| {
        for _ in 0..3 {
            let w = word.clone();
            s.spawn(move || {
                while w.load(Ordering::Acquire) == 0 {
                    wait_on_u32(&w, 0);
                }
            });
        }

        thread::sleep(Duration::from_millis(50));
        word.store(1, Ordering::Release);
        wake_all_u32(&word);
    });
}
