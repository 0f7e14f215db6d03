//! Lifecycle State Machine
//!
//! Tracks how far bootstrap has progressed. `checkpoint` is the only mutator;
//! every other operation asks `require` first and becomes a logged no-op when
//! the state does not match.

use log::{debug, warn};
use std::fmt;

/// Bootstrap lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    Init,
    Invoke,
    Success,
    Failed,
}

impl LifecycleState {
    /// Check if no further transition is expected
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Failed)
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Init => "INIT",
            Self::Invoke => "INVOKE",
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
        };
        f.write_str(name)
    }
}

/// Lifecycle guard owned by the core context
#[derive(Debug)]
pub struct Lifecycle {
    state: LifecycleState,
    transitions: Vec<(LifecycleState, LifecycleState)>,
}

impl Lifecycle {
    /// Create a lifecycle in the `Init` state
    pub fn new() -> Self {
        Self {
            state: LifecycleState::Init,
            transitions: Vec::new(),
        }
    }

    /// Current state
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Set the state unconditionally
    pub fn checkpoint(&mut self, state: LifecycleState) {
        debug!("Lifecycle checkpoint: {} -> {}", self.state, state);
        self.transitions.push((self.state, state));
        self.state = state;
    }

    /// Check that the current state is `expected`, warning on mismatch
    pub fn require(&self, expected: LifecycleState, operation: &str) -> bool {
        if self.state == expected {
            return true;
        }
        warn!(
            "{} invoked while in state {} (requires {}); ignoring",
            operation, self.state, expected
        );
        false
    }

    /// Every checkpoint taken so far, oldest first
    pub fn transitions(&self) -> &[(LifecycleState, LifecycleState)] {
        &self.transitions
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}
