//! The node chain: a sentinel head followed by individually locked nodes.
//!
//! Each node owns its successor through a [`Link`]. The link is an owning raw
//! pointer rather than a `Box` so that a walker may keep a shared reference to
//! a successor while the predecessor's link is moved during an unlink.

use core::marker::PhantomData;
use core::mem::ManuallyDrop;
use core::ptr::NonNull;

use crate::concurrency::{NodeMutex, NodeMutexGuard};

/// Everything a node's lock protects.
pub(super) struct Slot<T> {
    /// `None` only for the sentinel head.
    pub(super) value: Option<T>,
    pub(super) next: Link<T>,
}

/// One slot in the chain together with its lock.
pub(super) struct Node<T> {
    slot: NodeMutex<Slot<T>>,
}

/// A held node lock.
pub(super) type NodeGuard<'a, T> = NodeMutexGuard<'a, Slot<T>>;

impl<T> Node<T> {
    pub(super) const fn sentinel() -> Self {
        Self {
            slot: NodeMutex::new(Slot {
                value: None,
                next: Link::NONE,
            }),
        }
    }

    pub(super) fn new(value: T) -> Self {
        Self {
            slot: NodeMutex::new(Slot {
                value: Some(value),
                next: Link::NONE,
            }),
        }
    }

    #[inline]
    pub(super) fn lock(&self) -> NodeGuard<'_, T> {
        self.slot.lock()
    }

    #[cfg(test)]
    pub(super) fn is_locked(&self) -> bool {
        self.slot.is_locked()
    }

    #[inline]
    pub(super) fn slot_mut(&mut self) -> &mut Slot<T> {
        self.slot.get_mut()
    }

    pub(super) fn into_slot(self) -> Slot<T> {
        self.slot.into_inner()
    }
}

/// Locks the successor of the node held by `guard`.
///
/// This is the coupling step: the returned guard is acquired while `guard` is
/// still held, and its lifetime is tied to the list rather than to `guard`, so
/// the caller may release the predecessor afterwards.
#[inline]
pub(super) fn lock_next<'a, T>(guard: &NodeGuard<'a, T>) -> Option<NodeGuard<'a, T>> {
    let next = guard.next.as_ptr()?;
    // SAFETY: `next` is reachable from a node whose lock we hold, so it is
    // alive now. A node is only unlinked by a thread holding both its
    // predecessor's lock and its own, and only freed after that. Once we own
    // its lock it can therefore neither be unlinked nor freed until the
    // returned guard is dropped, whatever happens to the predecessor.
    let node: &'a Node<T> = unsafe { next.as_ref() };
    Some(node.lock())
}

/// Exclusive ownership of the rest of the chain.
pub(super) struct Link<T> {
    ptr: Option<NonNull<Node<T>>>,
    _owns: PhantomData<Box<Node<T>>>,
}

// Safety: `Link` is an owning pointer with the same semantics as `Option<Box<Node<T>>>`.
unsafe impl<T: Send> Send for Link<T> {}
unsafe impl<T: Send> Sync for Link<T> {}

impl<T> Link<T> {
    pub(super) const NONE: Self = Self {
        ptr: None,
        _owns: PhantomData,
    };

    pub(super) fn new(node: Box<Node<T>>) -> Self {
        Self {
            ptr: Some(NonNull::from(Box::leak(node))),
            _owns: PhantomData,
        }
    }

    #[inline]
    pub(super) fn is_none(&self) -> bool {
        self.ptr.is_none()
    }

    #[inline]
    pub(super) fn as_ptr(&self) -> Option<NonNull<Node<T>>> {
        self.ptr
    }

    /// Moves the chain out, leaving this link empty.
    #[inline]
    pub(super) fn take(&mut self) -> Self {
        Self {
            ptr: self.ptr.take(),
            _owns: PhantomData,
        }
    }

    /// Converts back into the owning box of the first node.
    ///
    /// Ownership passes to the box, so this link's destructor must not run.
    pub(super) fn into_box(self) -> Option<Box<Node<T>>> {
        let this = ManuallyDrop::new(self);
        // SAFETY: `ptr` came from `Box::leak` in `Link::new` and is owned by this link.
        this.ptr.map(|ptr| unsafe { Box::from_raw(ptr.as_ptr()) })
    }
}

impl<T> Drop for Link<T> {
    fn drop(&mut self) {
        // Iterative so that long chains cannot overflow the stack.
        let mut next = self.take().into_box();
        while let Some(mut node) = next {
            next = node.slot_mut().next.take().into_box();
        }
    }
}

const _: () = {
    use core::mem;

    assert!(mem::size_of::<Link<u64>>() == mem::size_of::<usize>());
};
