use super::*;
use std::sync::atomic::Ordering;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

#[test]
fn test_node_mutex_contention() {
    let mutex = NodeMutex::new(0u64);
    let mutex = &mutex;

    thread::scope(|s| {
        s.spawn(move || {
            let mut guard = mutex.lock();
            thread::sleep(Duration::from_millis(50));
            *guard += 1;
        });

        s.spawn(move || {
            thread::sleep(Duration::from_millis(10));
            // Should block until first thread releases
            let mut guard = mutex.lock();
            *guard += 1;
        });
    });

    assert_eq!(*mutex.lock(), 2);
}

#[test]
fn test_node_mutex_many_waiters() {
    const THREADS: usize = 8;
    const ROUNDS: usize = 2_000;

    let mutex = NodeMutex::new(0usize);
    let mutex = &mutex;

    thread::scope(|s| {
        for _ in 0..THREADS {
            s.spawn(move || {
                for _ in 0..ROUNDS {
                    let mut guard = mutex.lock();
                    let seen = *guard;
                    thread::yield_now();
                    *guard = seen + 1;
                }
            });
        }
    });

    assert_eq!(*mutex.lock(), THREADS * ROUNDS);
    assert!(!mutex.is_locked());
}

#[test]
fn test_wait_on_u32_wake() {
    let flag = Arc::new(AtomicU32::new(0));
    let barrier = Arc::new(Barrier::new(2));
    let flag_thread = flag.clone();
    let barrier_thread = barrier.clone();

    let handle = thread::spawn(move || {
        barrier_thread.wait();
        while flag_thread.load(Ordering::SeqCst) == 0 {
            wait_on_u32(&flag_thread, 0);
        }
        flag_thread.load(Ordering::SeqCst)
    });

    barrier.wait();
    flag.store(1, Ordering::SeqCst);
    wake_all_u32(&flag);

    let value = handle.join().unwrap();
    assert_eq!(value, 1);
}

#[test]
fn test_wait_returns_when_value_differs() {
    let flag = AtomicU32::new(7);
    // Must not block: the word does not hold the expected value.
    wait_on_u32(&flag, 3);
    wake_one_u32(&flag);
    assert_eq!(flag.load(Ordering::SeqCst), 7);
}
