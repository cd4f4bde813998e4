//! Run-once guard for first-appearance side effects.

use std::sync::atomic::{AtomicBool, Ordering};

/// Executes a guarded action at most once per gate lifetime.
///
/// UI "became visible" events fire repeatedly; the first one through the
/// gate runs the action synchronously, every later one is a no-op. The
/// flag flips with a compare-and-set, so the guarantee holds even when
/// triggers race from multiple threads. A fresh screen session gets a
/// fresh gate rather than resetting an old one.
#[derive(Debug, Default)]
pub struct RunOnceGate {
    fired: AtomicBool,
}

impl RunOnceGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `action` if this is the first invocation. Returns whether the
    /// action ran.
    pub fn run_once<F: FnOnce()>(&self, action: F) -> bool {
        if self
            .fired
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            action();
            true
        } else {
            false
        }
    }

    pub fn has_fired(&self) -> bool {
        self.fired.load(Ordering::Acquire)
    }
}
