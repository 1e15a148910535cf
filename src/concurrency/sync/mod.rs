//! Blocking primitives used by the lock-coupled collections.
//!
//! Waiting is done on a 32-bit word: the Linux futex syscall, Windows
//! `WaitOnAddress`, or a yielding spin on every other target.

pub mod node_mutex;

pub use node_mutex::{NodeMutex, NodeMutexGuard};

use core::sync::atomic::AtomicU32;
#[cfg(not(windows))]
use core::sync::atomic::Ordering;

#[cfg(windows)]
use windows_sys::Win32::System::Threading::{
    WaitOnAddress, WakeByAddressAll, WakeByAddressSingle,
};

#[cfg(target_os = "linux")]
use libc::{SYS_futex, FUTEX_PRIVATE_FLAG, FUTEX_WAIT, FUTEX_WAKE};

#[cfg(target_os = "linux")]
#[inline]
fn futex_wait(addr: *const u32, expected: u32) {
    // Spurious returns (EINTR, EAGAIN) are fine: every caller re-checks the word.
    unsafe {
        libc::syscall(
            SYS_futex,
            addr,
            FUTEX_WAIT | FUTEX_PRIVATE_FLAG,
            expected,
            core::ptr::null::<libc::timespec>(),
        );
    }
}

#[cfg(target_os = "linux")]
#[inline]
fn futex_wake(addr: *const u32, count: i32) {
    unsafe {
        libc::syscall(SYS_futex, addr, FUTEX_WAKE | FUTEX_PRIVATE_FLAG, count);
    }
}

/// Wakes all threads waiting on the given address.
#[inline]
pub fn wake_all_u32(addr: &AtomicU32) {
    #[cfg(windows)]
    unsafe {
        WakeByAddressAll(addr.as_ptr().cast::<core::ffi::c_void>());
    }
    #[cfg(target_os = "linux")]
    {
        futex_wake(addr.as_ptr(), i32::MAX);
    }
    #[cfg(not(any(windows, target_os = "linux")))]
    let _ = addr;
}

/// Wakes one thread waiting on the given address.
#[inline]
pub fn wake_one_u32(addr: &AtomicU32) {
    #[cfg(windows)]
    unsafe {
        WakeByAddressSingle(addr.as_ptr().cast::<core::ffi::c_void>());
    }
    #[cfg(target_os = "linux")]
    {
        futex_wake(addr.as_ptr(), 1);
    }
    #[cfg(not(any(windows, target_os = "linux")))]
    let _ = addr;
}

/// Blocks while the value at `addr` equals `expected`.
///
/// May return spuriously; callers must reload and re-check the value.
#[inline]
pub fn wait_on_u32(addr: &AtomicU32, expected: u32) {
    #[cfg(windows)]
    unsafe {
        let expected_ptr = (&expected as *const u32).cast::<core::ffi::c_void>();
        let size = core::mem::size_of::<u32>();
        WaitOnAddress(addr.as_ptr().cast::<core::ffi::c_void>(), expected_ptr, size, u32::MAX);
    }
    #[cfg(target_os = "linux")]
    {
        if addr.load(Ordering::Relaxed) == expected {
            futex_wait(addr.as_ptr(), expected);
        }
    }
    #[cfg(not(any(windows, target_os = "linux")))]
    while addr.load(Ordering::Acquire) == expected {
        std::thread::yield_now();
    }
}

#[cfg(test)]
mod tests;
