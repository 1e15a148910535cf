//! Lock-coupled collections.
//!
//! - `coupled_list`: unordered, insert-at-front singly-linked list with one
//!   lock per node and hand-over-hand traversal.

pub mod coupled_list;

pub use coupled_list::{CoupledList, PushError};
