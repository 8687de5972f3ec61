use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use super::SyncError;

#[derive(Debug)]
struct FenceInner {
    completed: AtomicU64,
    signaled: AtomicU64,
}

/// Monotonic CPU/GPU completion counter.
///
/// The queue records a target value with [`Fence::begin_signal`] and later
/// publishes it with [`Fence::complete`] once the GPU has finished all work
/// submitted before the signal. Clones share the same counter, so a
/// completion callback can own one while the synchronizer holds another.
#[derive(Debug, Clone)]
pub struct Fence {
    inner: Arc<FenceInner>,
}

impl Fence {
    pub fn new(initial: u64) -> Self {
        Self {
            inner: Arc::new(FenceInner {
                completed: AtomicU64::new(initial),
                signaled: AtomicU64::new(initial),
            }),
        }
    }

    /// Highest value the GPU has reached.
    pub fn completed_value(&self) -> u64 {
        self.inner.completed.load(Ordering::Acquire)
    }

    /// Highest value a queue has been asked to signal.
    pub fn last_signaled(&self) -> u64 {
        self.inner.signaled.load(Ordering::Acquire)
    }

    /// Reserves `value` as the next signal. Values must strictly increase.
    pub fn begin_signal(&self, value: u64) -> Result<(), SyncError> {
        let last = self.last_signaled();
        if value <= last {
            return Err(SyncError::NonMonotonic { value, last });
        }
        self.inner.signaled.store(value, Ordering::Release);
        Ok(())
    }

    /// Publishes GPU completion up to `value`. Never moves backwards.
    pub fn complete(&self, value: u64) {
        self.inner.completed.fetch_max(value, Ordering::AcqRel);
    }

    pub fn is_complete(&self, value: u64) -> bool {
        self.completed_value() >= value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signal_values_must_increase() {
        let fence = Fence::new(0);
        fence.begin_signal(1).unwrap();
        fence.begin_signal(2).unwrap();

        assert_eq!(
            fence.begin_signal(2),
            Err(SyncError::NonMonotonic { value: 2, last: 2 })
        );
        assert!(fence.begin_signal(1).is_err());
        assert_eq!(fence.last_signaled(), 2);
    }

    #[test]
    fn completion_never_moves_backwards() {
        let fence = Fence::new(0);
        fence.complete(5);
        fence.complete(3);
        assert_eq!(fence.completed_value(), 5);
        assert!(fence.is_complete(4));
        assert!(!fence.is_complete(6));
    }

    #[test]
    fn clones_share_the_counter() {
        let fence = Fence::new(0);
        let callback_side = fence.clone();

        std::thread::spawn(move || callback_side.complete(1))
            .join()
            .unwrap();

        assert_eq!(fence.completed_value(), 1);
    }
}
