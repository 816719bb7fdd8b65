//! Lifecycle of a single generation attempt.

use serde::{Deserialize, Serialize};

/// Where an attempt is in its lifecycle.
///
/// ```text
/// Pending -> Admitted -> AwaitingResult -> Accepted | Rejected | Failed
///    \           \              \
///     +-----------+--------------+--> Cancelled
/// ```
///
/// Retries move an attempt from `AwaitingResult` back to `Admitted` when a
/// retried call is granted again. Terminal states never change.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum AttemptState {
    /// Created, not yet admitted by the rate limiter
    #[display("pending")]
    Pending,
    /// Admission granted, call about to be issued
    #[display("admitted")]
    Admitted,
    /// Backend call in progress
    #[display("awaiting result")]
    AwaitingResult,
    /// Result satisfied the acceptance predicate
    #[display("accepted")]
    Accepted,
    /// Result produced but turned down by the predicate
    #[display("rejected")]
    Rejected,
    /// Backend failure after retries, or a fatal failure
    #[display("failed")]
    Failed,
    /// Stopped at a suspension point after a winner was chosen
    #[display("cancelled")]
    Cancelled,
}

impl AttemptState {
    /// Whether this state is final.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            AttemptState::Accepted
                | AttemptState::Rejected
                | AttemptState::Failed
                | AttemptState::Cancelled
        )
    }

    /// Whether moving from `self` to `next` is a legal transition.
    ///
    /// # Examples
    ///
    /// ```
    /// use atelier_core::AttemptState;
    ///
    /// assert!(AttemptState::Pending.can_transition_to(AttemptState::Admitted));
    /// assert!(AttemptState::AwaitingResult.can_transition_to(AttemptState::Cancelled));
    /// assert!(!AttemptState::Accepted.can_transition_to(AttemptState::Cancelled));
    /// ```
    pub fn can_transition_to(self, next: AttemptState) -> bool {
        use AttemptState::*;
        match (self, next) {
            (from, _) if from.is_terminal() => false,
            (_, Cancelled) => true,
            (Pending, Admitted) => true,
            (Admitted, AwaitingResult) => true,
            (AwaitingResult, Admitted) => true,
            (AwaitingResult, Accepted | Rejected | Failed) => true,
            // Failures before admission: over-budget estimates, fatal setup
            (Pending | Admitted, Failed) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states_are_sticky() {
        for terminal in [
            AttemptState::Accepted,
            AttemptState::Rejected,
            AttemptState::Failed,
            AttemptState::Cancelled,
        ] {
            assert!(terminal.is_terminal());
            assert!(!terminal.can_transition_to(AttemptState::Cancelled));
            assert!(!terminal.can_transition_to(AttemptState::Pending));
        }
    }

    #[test]
    fn test_cancel_reachable_from_every_live_state() {
        for live in [
            AttemptState::Pending,
            AttemptState::Admitted,
            AttemptState::AwaitingResult,
        ] {
            assert!(live.can_transition_to(AttemptState::Cancelled));
        }
    }

    #[test]
    fn test_results_only_after_call() {
        assert!(!AttemptState::Pending.can_transition_to(AttemptState::Accepted));
        assert!(!AttemptState::Admitted.can_transition_to(AttemptState::Rejected));
        assert!(AttemptState::AwaitingResult.can_transition_to(AttemptState::Accepted));
    }
}
