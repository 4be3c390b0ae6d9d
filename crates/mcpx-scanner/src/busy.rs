//! Re-entrancy guard for long-running operations

use std::sync::atomic::{AtomicBool, Ordering};

/// Holds a busy flag for as long as it lives
#[derive(Debug)]
pub struct BusyGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> BusyGuard<'a> {
    /// Set the flag, or return `None` if it is already set
    pub fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
