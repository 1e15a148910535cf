use crate::alloc::AllocError;

/// Returned by [`CoupledList::try_push_front`](super::CoupledList::try_push_front)
/// when no memory could be obtained for the new node.
///
/// The list is left unmodified and the rejected value can be recovered with
/// [`into_inner`](Self::into_inner).
#[derive(Clone, PartialEq, Eq)]
pub struct PushError<T> {
    value: T,
    cause: AllocError,
}

impl<T> PushError<T> {
    pub(super) fn new(value: T, cause: AllocError) -> Self {
        Self { value, cause }
    }

    /// Returns the value that could not be inserted.
    pub fn into_inner(self) -> T {
        self.value
    }

    /// The underlying allocation failure.
    pub fn cause(&self) -> AllocError {
        self.cause
    }
}

impl<T> core::fmt::Debug for PushError<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PushError")
            .field("cause", &self.cause)
            .finish_non_exhaustive()
    }
}

impl<T> core::fmt::Display for PushError<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("failed to allocate a list node")
    }
}

impl<T> std::error::Error for PushError<T> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.cause)
    }
}
