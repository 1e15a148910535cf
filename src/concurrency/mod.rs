//! Concurrency primitives backing the lock-coupled collections.
//!
//! Locks here are deliberately small: one is embedded in every list node, so
//! each `NodeMutex` costs a single 32-bit state word beside its data.

pub mod sync;

pub use sync::{NodeMutex, NodeMutexGuard};
