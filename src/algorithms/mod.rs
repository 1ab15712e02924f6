//! Admission algorithms
//!
//! The throttles consult an algorithm with the call history and the current
//! instant, and act on the returned [`AdmissionDecision`].

pub mod sliding_window;

pub use sliding_window::SlidingWindow;

use std::time::Duration;

/// Outcome of a single admission attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionDecision {
    /// The call was recorded in the history and may proceed now
    Allow,
    /// The window is full; re-evaluate after this delay. History is unchanged.
    WaitFor(Duration),
    /// The window is full and the throttle raises. History is unchanged.
    Reject,
}

impl AdmissionDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AdmissionDecision::Allow)
    }
}
