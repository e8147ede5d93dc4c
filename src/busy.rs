use std::sync::atomic::{AtomicUsize, Ordering};

/// Capability for showing a "work in progress" affordance while a load or
/// write is outstanding. Calls are paired: every `show` is followed by one
/// `hide`.
pub trait BusyIndicator: Send + Sync {
    fn show(&self);
    fn hide(&self);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopBusyIndicator;

impl BusyIndicator for NoopBusyIndicator {
    fn show(&self) {}
    fn hide(&self) {}
}

/// Counts outstanding `show` calls. Busy while the count is non-zero.
#[derive(Debug, Default)]
pub struct BusyCounter {
    depth: AtomicUsize,
    shown: AtomicUsize,
}

impl BusyCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.depth.load(Ordering::Acquire) > 0
    }

    /// Total number of `show` calls so far.
    pub fn times_shown(&self) -> usize {
        self.shown.load(Ordering::Acquire)
    }
}

impl BusyIndicator for BusyCounter {
    fn show(&self) {
        self.shown.fetch_add(1, Ordering::AcqRel);
        self.depth.fetch_add(1, Ordering::AcqRel);
    }

    fn hide(&self) {
        // saturate at zero
        let _ = self
            .depth
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |d| d.checked_sub(1));
    }
}
