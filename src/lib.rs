//! # `handover` - Lock-Coupled Concurrent Lists
//!
//! A concurrent singly-linked list whose nodes are each guarded by their own
//! lock. Threads traverse, search, insert at the front and conditionally remove
//! elements at the same time, serializing only on the nodes they touch.
//!
//! ## Locking Protocol
//!
//! ### Hand-over-hand traversal
//! A walker always holds the lock of the node it is reading. To step forward it
//! locks the successor *before* releasing the current node, so no other thread
//! can unlink the successor in between.
//!
//! ### Two-lock removal
//! A node is unlinked only while both it and its predecessor are locked. Since
//! every walker locks nodes in chain order, a node whose lock is held can be
//! neither unlinked nor freed.
//!
//! ### Deadlock freedom
//! Locks are acquired strictly front to back and never in reverse, so no cycle
//! of waiting threads can form.
//!
//! ## Architecture
//!
//! 1. **Node locks** (`NodeMutex<T>`):
//!    - One 32-bit futex word per node
//!    - Brief backoff spin before parking
//!    - No poisoning; guards unlock during unwinding
//!
//! 2. **Node chain** (`CoupledList<T>`):
//!    - Valueless sentinel head, never removed
//!    - Each node exclusively owns its successor
//!    - Iterative destruction of arbitrarily long chains
//!
//! 3. **Fallible allocation** (`alloc::try_box_with`):
//!    - `try_push_front` reports exhaustion as `PushError` and returns the value
//!
//! ## Example
//!
//! ```rust
//! use handover::CoupledList;
//! use std::thread;
//!
//! let list = CoupledList::new();
//!
//! thread::scope(|s| {
//!     for t in 0..4 {
//!         let list = &list;
//!         s.spawn(move || {
//!             for i in 0..100 {
//!                 list.push_front(t * 100 + i);
//!             }
//!         });
//!     }
//! });
//!
//! let removed = list.remove_if(|&x| x % 2 == 1);
//! assert_eq!(removed, 200);
//! assert_eq!(list.find_first_of(|&x| x % 2 == 1), None);
//! ```

#![warn(missing_docs, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod alloc;
pub mod collections;
pub mod concurrency;

pub use alloc::AllocError;
pub use collections::{CoupledList, PushError};
pub use concurrency::{NodeMutex, NodeMutexGuard};

// Compile-time assertions for memory layout
const _: () = {
    use core::mem;

    // One state word per node lock.
    assert!(mem::size_of::<NodeMutex<()>>() == mem::size_of::<u32>());
};
