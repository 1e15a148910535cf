//! Fallible heap allocation.
//!
//! `Box::new` aborts the process when the global allocator fails. Collections
//! that want to report exhaustion to their caller allocate through
//! [`try_box_with`] instead.

use core::alloc::Layout;
use core::ptr::NonNull;

/// The error type for allocation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocError;

impl core::fmt::Display for AllocError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("memory allocation failed")
    }
}

impl std::error::Error for AllocError {}

/// Allocates a `Box<T>` built from `arg`, reporting failure instead of aborting.
///
/// Memory is requested first; `init` only runs once it is available. On
/// failure `arg` is handed back untouched.
///
/// # Errors
/// Returns `arg` together with `AllocError` if the global allocator is exhausted.
pub fn try_box_with<A, T>(arg: A, init: impl FnOnce(A) -> T) -> Result<Box<T>, (A, AllocError)> {
    let layout = Layout::new::<T>();
    if layout.size() == 0 {
        return Ok(Box::new(init(arg)));
    }

    // SAFETY: `layout` has a non-zero size.
    let raw = unsafe { std::alloc::alloc(layout) }.cast::<T>();
    let Some(ptr) = NonNull::new(raw) else {
        return Err((arg, AllocError));
    };

    // SAFETY: `ptr` comes from the global allocator with `Layout::new::<T>()`,
    // which is the layout `Box<T>` deallocates with, and is initialised first.
    unsafe {
        ptr.as_ptr().write(init(arg));
        Ok(Box::from_raw(ptr.as_ptr()))
    }
}
