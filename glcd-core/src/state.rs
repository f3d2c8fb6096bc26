//! Handle lifecycle
//!
//! ```text
//! Uninitialized ──init──▶ Ready ──bus failure / busy timeout──▶ Faulted
//!                           ▲                                     │
//!                           └────────────────init─────────────────┘
//! ```

/// Lifecycle state of a display handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HandleState {
    /// Created, reset sequence not yet run
    #[default]
    Uninitialized,
    /// Reset done and both controllers switched on
    Ready,
    /// A bus operation failed; only `init` is accepted
    Faulted,
}

/// Lifecycle events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HandleEvent {
    /// Reset sequence and power-on commands completed
    InitComplete,
    /// Bus I/O failed or busy flag never cleared
    BusFault,
}

impl HandleState {
    /// Process an event and return the next state
    pub fn transition(self, event: HandleEvent) -> Self {
        match event {
            HandleEvent::InitComplete => HandleState::Ready,
            HandleEvent::BusFault => HandleState::Faulted,
        }
    }

    pub fn is_ready(self) -> bool {
        self == HandleState::Ready
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle() {
        let state = HandleState::default();
        assert_eq!(state, HandleState::Uninitialized);
        assert!(!state.is_ready());

        let state = state.transition(HandleEvent::InitComplete);
        assert!(state.is_ready());

        let state = state.transition(HandleEvent::BusFault);
        assert_eq!(state, HandleState::Faulted);

        // Re-initializing recovers
        assert!(state.transition(HandleEvent::InitComplete).is_ready());
    }

    #[test]
    fn test_fault_before_init() {
        assert_eq!(
            HandleState::Uninitialized.transition(HandleEvent::BusFault),
            HandleState::Faulted
        );
    }
}
