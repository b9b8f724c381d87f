//! Interrupt-to-task status signals.
//!
//! A [`StatusSignal`] bridges an interrupt handler (producer) to the
//! cooperative tick loop (consumer). The interrupt's only permitted action is
//! [`StatusSignal::signal_complete`]; all state mutation happens in the task
//! that observes the signal via [`StatusSignal::take`].

use core::sync::atomic::{AtomicBool, Ordering};

/// A two-state (pending/complete) token with single-producer/single-consumer
/// semantics.
///
/// At most one completion is stored per source: an interrupt that fires while
/// a completion is already latched is coalesced. Switch-bounce-class events
/// tolerate coalescing, and fault conditions are re-polled independently.
#[derive(Debug, Default)]
pub struct StatusSignal {
    complete: AtomicBool,
}

impl StatusSignal {
    /// Create a new signal in the pending (armed, not fired) state.
    pub const fn new() -> Self {
        Self {
            complete: AtomicBool::new(false),
        }
    }

    /// Mark the signal complete.
    ///
    /// Safe to call from interrupt context: this is a single flag write.
    #[inline]
    pub fn signal_complete(&self) {
        self.complete.store(true, Ordering::Release);
    }

    /// Consume a completion, if any, and re-arm the signal.
    ///
    /// Returns `true` exactly once per latched completion.
    #[inline]
    pub fn take(&self) -> bool {
        self.complete.swap(false, Ordering::AcqRel)
    }

    /// Check whether a completion is latched without consuming it.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.complete.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_pending() {
        let signal = StatusSignal::new();
        assert!(!signal.is_complete());
        assert!(!signal.take());
    }

    #[test]
    fn test_take_consumes_and_rearms() {
        let signal = StatusSignal::new();
        signal.signal_complete();
        assert!(signal.is_complete());
        assert!(signal.take());
        assert!(!signal.is_complete());
        assert!(!signal.take());
    }

    #[test]
    fn test_coalesces_multiple_completions() {
        let signal = StatusSignal::new();
        signal.signal_complete();
        signal.signal_complete();
        signal.signal_complete();
        assert!(signal.take());
        // The second and third completions were coalesced into the first.
        assert!(!signal.take());
    }
}
