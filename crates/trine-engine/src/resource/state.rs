use std::collections::HashMap;

use thiserror::Error;

/// Identifies a GPU resource inside command lists.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ResourceId(pub u32);

/// Mutually exclusive usage states a resource moves between.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ResourceState {
    /// Back buffer owned by the presentation engine.
    Present,
    /// Writable as a color attachment.
    RenderTarget,
    /// Readable by the input assembler and shaders.
    GenericRead,
}

/// State transition for one resource.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct TransitionBarrier {
    pub resource: ResourceId,
    pub before: ResourceState,
    pub after: ResourceState,
}

impl TransitionBarrier {
    pub fn new(resource: ResourceId, before: ResourceState, after: ResourceState) -> Self {
        Self {
            resource,
            before,
            after,
        }
    }
}

#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum StateError {
    #[error("resource {0:?} is not tracked")]
    Untracked(ResourceId),

    #[error("barrier expects {resource:?} in {expected:?} but it is in {actual:?}")]
    Mismatch {
        resource: ResourceId,
        expected: ResourceState,
        actual: ResourceState,
    },
}

/// Queue-side record of each resource's current state.
#[derive(Debug, Clone, Default)]
pub struct StateTracker {
    states: HashMap<ResourceId, ResourceState>,
}

impl StateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, id: ResourceId, state: ResourceState) {
        self.states.insert(id, state);
    }

    pub fn forget(&mut self, id: ResourceId) {
        self.states.remove(&id);
    }

    pub fn state(&self, id: ResourceId) -> Option<ResourceState> {
        self.states.get(&id).copied()
    }

    /// Whether any tracked resource is currently in `state`.
    pub fn any_in(&self, state: ResourceState) -> bool {
        self.states.values().any(|s| *s == state)
    }

    /// Applies a barrier, rejecting it if `before` disagrees with the tracked state.
    pub fn apply(&mut self, barrier: &TransitionBarrier) -> Result<(), StateError> {
        let current = self
            .states
            .get_mut(&barrier.resource)
            .ok_or(StateError::Untracked(barrier.resource))?;

        if *current != barrier.before {
            return Err(StateError::Mismatch {
                resource: barrier.resource,
                expected: barrier.before,
                actual: *current,
            });
        }

        *current = barrier.after;
        Ok(())
    }
}
