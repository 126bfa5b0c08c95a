/// Task state definitions for tracking freeze progress
///
/// This module defines all possible states a generation task can be in.
use crate::FreezeError;
use std::fmt;

/// Represents the current state of a task in the freeze process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskState {
    // ===== Active States =====
    /// Task is waiting in the work queue
    Queued,

    /// A named route is being turned into a URL
    Resolving,

    /// The URL is being requested from the application
    Fetching,

    // ===== Terminal Success State =====
    /// The response was written to disk
    Written,

    // ===== Terminal Skip States =====
    /// The application answered with a non-2xx status
    SkippedNonOk,

    /// The link points at another host and was not fetched
    SkippedExternal,

    // ===== Terminal Error State =====
    /// URL generation or writing failed
    Failed,
}

impl TaskState {
    /// Returns true if this is a terminal state (no further processing needed)
    pub fn is_terminal(&self) -> bool {
        !self.is_active()
    }

    /// Returns true if this is an active state (task may still be processed)
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Queued | Self::Resolving | Self::Fetching)
    }

    /// Returns true if this represents a successful completion
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Written)
    }

    /// Returns true if this represents a skip state
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::SkippedNonOk | Self::SkippedExternal)
    }

    /// Returns true if this represents an error state
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Failed)
    }

    /// Whether the state machine allows moving from `self` to `next`
    ///
    /// Raw URLs skip `Resolving`; external links are classified while still
    /// queued and never fetched.
    pub fn can_transition_to(&self, next: TaskState) -> bool {
        use TaskState::*;

        matches!(
            (self, next),
            (Queued, Resolving)
                | (Queued, Fetching)
                | (Queued, SkippedExternal)
                | (Resolving, Fetching)
                | (Resolving, Failed)
                | (Fetching, Written)
                | (Fetching, SkippedNonOk)
                | (Fetching, Failed)
        )
    }

    /// Moves to `next`, rejecting transitions the state machine does not allow
    pub fn advance(&mut self, next: TaskState) -> Result<(), FreezeError> {
        if !self.can_transition_to(next) {
            return Err(FreezeError::InvalidTransition {
                from: *self,
                to: next,
            });
        }
        *self = next;
        Ok(())
    }

    /// Stable lowercase name used in reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Resolving => "resolving",
            Self::Fetching => "fetching",
            Self::Written => "written",
            Self::SkippedNonOk => "skipped_non_ok",
            Self::SkippedExternal => "skipped_external",
            Self::Failed => "failed",
        }
    }

    /// Returns the terminal states, in report order
    pub fn terminal_states() -> [Self; 4] {
        [
            Self::Written,
            Self::SkippedNonOk,
            Self::SkippedExternal,
            Self::Failed,
        ]
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
