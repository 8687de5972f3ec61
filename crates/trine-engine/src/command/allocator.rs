use crate::sync::Fence;

use super::RecordError;

/// Backing storage for recorded commands.
///
/// The allocator remembers the fence value that covers its last submission
/// and refuses to reset until the GPU has passed it.
#[derive(Debug, Default)]
pub struct CommandAllocator {
    in_flight_until: Option<u64>,
    resets: u64,
}

/// Proof that an allocator was reset and is free for recording.
///
/// Holds the allocator mutably, so at most one list records into it.
#[derive(Debug)]
pub struct ResetAllocator<'a> {
    allocator: &'a mut CommandAllocator,
}

impl CommandAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fence value the GPU must reach before the next reset, if any.
    pub fn in_flight_until(&self) -> Option<u64> {
        self.in_flight_until
    }

    pub fn reset_count(&self) -> u64 {
        self.resets
    }

    /// Resets the allocator once `fence` shows its previous work completed.
    pub fn reset(&mut self, fence: &Fence) -> Result<ResetAllocator<'_>, RecordError> {
        if let Some(value) = self.in_flight_until {
            let completed = fence.completed_value();
            if completed < value {
                return Err(RecordError::AllocatorInFlight { value, completed });
            }
        }

        self.in_flight_until = None;
        self.resets += 1;
        Ok(ResetAllocator { allocator: self })
    }

    /// Records that work recorded from this allocator completes at `value`.
    pub(crate) fn mark_in_flight(&mut self, value: u64) {
        self.in_flight_until = Some(value);
    }
}

impl ResetAllocator<'_> {
    pub fn reset_count(&self) -> u64 {
        self.allocator.resets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_allocator_resets() {
        let fence = Fence::new(0);
        let mut allocator = CommandAllocator::new();
        assert_eq!(allocator.reset(&fence).unwrap().reset_count(), 1);
    }

    #[test]
    fn reset_waits_for_fence() {
        let fence = Fence::new(0);
        let mut allocator = CommandAllocator::new();
        allocator.mark_in_flight(1);

        assert_eq!(
            allocator.reset(&fence).unwrap_err(),
            RecordError::AllocatorInFlight {
                value: 1,
                completed: 0
            }
        );

        fence.complete(1);
        allocator.reset(&fence).unwrap();
        assert_eq!(allocator.in_flight_until(), None);
    }
}
