//! `CoupledList` — a concurrent singly-linked list with hand-over-hand locking.
//!
//! Every node carries its own [`NodeMutex`](crate::concurrency::NodeMutex).
//! Walkers move down the chain by locking the successor before releasing the
//! predecessor, so at least one lock always covers the boundary between the
//! visited and unvisited parts of the list. Removal holds both the
//! predecessor's and the candidate's lock while it rewrites the link.
//!
//! Locks are only ever taken in chain order (head, first, second, ...), which
//! rules out lock-order cycles between threads.
//!
//! # Consistency
//!
//! Each link update is atomic with respect to other lock holders, but a walk
//! over many nodes is not a snapshot: it may observe some concurrent pushes and
//! removals and miss others. Pushes serialize on the head lock.

mod error;
mod node;


pub use error::PushError;

use core::convert::Infallible;
use core::fmt;
use core::ops::ControlFlow;

use crate::alloc::try_box_with;

use node::{Link, Node};

/// A thread-safe, insert-at-front singly-linked list with per-node locks.
///
/// Elements are stored most-recently-pushed first. All operations take
/// `&self`; share the list between threads with `Arc` or scoped threads.
///
/// # Example
///
/// ```rust
/// use handover::CoupledList;
///
/// let list = CoupledList::new();
/// list.push_front(3);
/// list.push_front(1);
/// list.push_front(4);
///
/// assert_eq!(list.find_first_of(|&x| x < 4), Some(1));
/// assert_eq!(list.remove_if(|&x| x == 1), 1);
///
/// let mut seen = Vec::new();
/// list.for_each(|&x| seen.push(x));
/// assert_eq!(seen, vec![4, 3]);
/// ```
pub struct CoupledList<T> {
    head: Node<T>,
}

impl<T> CoupledList<T> {
    /// Creates an empty list.
    pub const fn new() -> Self {
        Self {
            head: Node::sentinel(),
        }
    }

    /// Inserts `value` as the new first element.
    ///
    /// The node is allocated before the head lock is taken; the lock is held
    /// only for the two link writes.
    ///
    /// # Panics
    /// Aborts through `handle_alloc_error` if memory is exhausted, like any
    /// `Box` allocation. Use [`try_push_front`](Self::try_push_front) to
    /// observe the failure instead.
    pub fn push_front(&self, value: T) {
        self.link_front(Box::new(Node::new(value)));
    }

    /// Inserts `value` as the new first element, reporting allocation failure.
    ///
    /// # Errors
    /// Returns [`PushError`] holding `value` if no memory was available for
    /// the node. The list is not modified.
    pub fn try_push_front(&self, value: T) -> Result<(), PushError<T>> {
        let node = try_box_with(value, Node::new).map_err(|(value, cause)| {
            #[cfg(feature = "tracing")]
            tracing::warn!(size = core::mem::size_of::<Node<T>>(), "list node allocation failed");
            PushError::new(value, cause)
        })?;
        self.link_front(node);
        Ok(())
    }

    fn link_front(&self, mut node: Box<Node<T>>) {
        let mut head = self.head.lock();
        node.slot_mut().next = head.next.take();
        head.next = Link::new(node);
    }

    /// Calls `visitor` on every element, front to back.
    ///
    /// While `visitor` runs only the visited node's lock is held. If it
    /// panics, every lock held by the walk is released during unwinding.
    pub fn for_each<F>(&self, mut visitor: F)
    where
        F: FnMut(&T),
    {
        self.walk(|value| {
            visitor(value);
            ControlFlow::<Infallible>::Continue(())
        });
    }

    /// Calls `visitor` on every element, front to back, stopping at the first
    /// error.
    ///
    /// # Errors
    /// Returns the first error produced by `visitor`, after releasing all
    /// locks held by the walk.
    pub fn try_for_each<E, F>(&self, mut visitor: F) -> Result<(), E>
    where
        F: FnMut(&T) -> Result<(), E>,
    {
        match self.walk(|value| match visitor(value) {
            Ok(()) => ControlFlow::Continue(()),
            Err(e) => ControlFlow::Break(e),
        }) {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Returns a copy of the first element satisfying `predicate`.
    ///
    /// The copy is taken while the matching node is still locked. Nothing is
    /// held once this returns, so the element may already have been removed
    /// by another thread when the caller inspects the result.
    pub fn find_first_of<P>(&self, mut predicate: P) -> Option<T>
    where
        T: Clone,
        P: FnMut(&T) -> bool,
    {
        self.walk(|value| {
            if predicate(value) {
                ControlFlow::Break(value.clone())
            } else {
                ControlFlow::Continue(())
            }
        })
    }

    /// Unlinks and drops every element satisfying `predicate`, returning how
    /// many were removed.
    ///
    /// Each candidate is tested while both it and its predecessor are locked,
    /// and a matching node is spliced out before either lock is released.
    pub fn remove_if<P>(&self, mut predicate: P) -> usize
    where
        P: FnMut(&T) -> bool,
    {
        match self.try_remove_if(|value| Ok::<_, Infallible>(predicate(value))) {
            Ok(removed) => removed,
            Err(never) => match never {},
        }
    }

    /// Like [`remove_if`](Self::remove_if) with a fallible predicate.
    ///
    /// # Errors
    /// Returns the first error produced by `predicate`. Elements removed
    /// before the error stay removed; the candidate being tested is kept.
    pub fn try_remove_if<E, P>(&self, mut predicate: P) -> Result<usize, E>
    where
        P: FnMut(&T) -> Result<bool, E>,
    {
        let mut removed = 0;
        let mut current = self.head.lock();

        while let Some(mut candidate) = node::lock_next(&current) {
            let matched = match candidate.value.as_ref() {
                Some(value) => predicate(value)?,
                None => false,
            };

            if matched {
                // Both locks are held: splice the candidate out, then free it.
                let rest = candidate.next.take();
                let unlinked = core::mem::replace(&mut current.next, rest);
                drop(candidate);
                drop(unlinked);
                removed += 1;
                #[cfg(feature = "tracing")]
                tracing::trace!(removed, "unlinked list node");
            } else {
                current = candidate;
            }
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(removed, "remove pass finished");
        Ok(removed)
    }

    /// Returns `true` if the list has no elements.
    ///
    /// Only the head lock is taken; the answer may be stale by the time it is
    /// observed.
    pub fn is_empty(&self) -> bool {
        self.head.lock().next.is_none()
    }

    /// Removes every element.
    ///
    /// Nodes are unlinked one at a time under the usual two-lock rule, so
    /// concurrent walkers are never left holding a freed node.
    pub fn clear(&self) {
        self.remove_if(|_| true);
    }

    /// Consumes the list and returns its elements, front to back.
    pub fn into_vec(self) -> Vec<T> {
        let mut values = Vec::new();
        let mut link = self.head.into_slot().next;
        while let Some(node) = link.into_box() {
            let slot = node.into_slot();
            values.extend(slot.value);
            link = slot.next;
        }
        values
    }

    /// Hand-over-hand walk shared by the read-only operations.
    ///
    /// `f` runs with only the current node's lock held; the predecessor is
    /// released as soon as its successor has been locked.
    fn walk<B, F>(&self, mut f: F) -> Option<B>
    where
        F: FnMut(&T) -> ControlFlow<B>,
    {
        let mut current = self.head.lock();
        while let Some(next) = node::lock_next(&current) {
            current = next;
            if let Some(value) = current.value.as_ref() {
                if let ControlFlow::Break(found) = f(value) {
                    return Some(found);
                }
            }
        }
        None
    }
}

impl<T> Default for CoupledList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for CoupledList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        self.for_each(|value| {
            list.entry(value);
        });
        list.finish()
    }
}

impl<T> Extend<T> for CoupledList<T> {
    /// Pushes each item to the front, so the last item ends up first.
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.push_front(value);
        }
    }
}

impl<T> FromIterator<T> for CoupledList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = Self::new();
        list.extend(iter);
        list
    }
}
