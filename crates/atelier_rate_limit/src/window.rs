//! Sliding-window grant log.
//!
//! Pure bookkeeping with no locking or waiting: the limiter owns one
//! [`WindowState`] behind its mutex and asks it, for a given instant,
//! whether a grant is possible and if not how long to wait.

use atelier_core::RateBudget;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::Instant;

/// One recorded grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Grant {
    at: Instant,
    tokens: u64,
}

/// Grants within the trailing window plus the time of the latest grant.
///
/// The request log and the token log share timestamps, so both live in a
/// single deque; the request count is its length and the token sum is kept
/// alongside.
#[derive(Debug, Default)]
pub(crate) struct WindowState {
    grants: VecDeque<Grant>,
    token_sum: u64,
    last_grant: Option<Instant>,
}

impl WindowState {
    /// Drop grants that have left the window ending at `now`.
    ///
    /// A grant at `t` counts while `now - t < window`.
    pub(crate) fn prune(&mut self, now: Instant, window: Duration) {
        while let Some(oldest) = self.grants.front() {
            if now.saturating_duration_since(oldest.at) < window {
                break;
            }
            self.token_sum -= oldest.tokens;
            self.grants.pop_front();
        }
    }

    /// How long until a grant of `tokens` satisfies every window condition.
    ///
    /// Returns `None` if it can be granted at `now`. Assumes [`prune`] ran at
    /// `now` and that `tokens` fits the budget on its own. The returned wait
    /// is always non-zero.
    ///
    /// [`prune`]: WindowState::prune
    pub(crate) fn wait_for(&self, now: Instant, tokens: u64, budget: &RateBudget) -> Option<Duration> {
        let window = *budget.window();
        let expiry = |grant: &Grant| (grant.at + window).saturating_duration_since(now);

        let mut wait = Duration::ZERO;

        let max_requests = *budget.max_requests_per_window() as usize;
        if self.grants.len() >= max_requests {
            // The grant that must age out to bring the count below the cap
            let blocking = &self.grants[self.grants.len() - max_requests];
            wait = wait.max(expiry(blocking));
        }

        let max_tokens = *budget.max_tokens_per_window();
        if self.token_sum.saturating_add(tokens) > max_tokens {
            let mut remaining = self.token_sum;
            for grant in &self.grants {
                remaining -= grant.tokens;
                if remaining.saturating_add(tokens) <= max_tokens {
                    wait = wait.max(expiry(grant));
                    break;
                }
            }
        }

        if let Some(last) = self.last_grant {
            let spacing = (last + *budget.min_interval()).saturating_duration_since(now);
            wait = wait.max(spacing);
        }

        (!wait.is_zero()).then_some(wait)
    }

    /// Record a grant of `tokens` at `now`.
    pub(crate) fn record(&mut self, now: Instant, tokens: u64) {
        self.grants.push_back(Grant { at: now, tokens });
        self.token_sum += tokens;
        self.last_grant = Some(now);
    }

    /// Grants currently in the window.
    pub(crate) fn requests(&self) -> usize {
        self.grants.len()
    }

    /// Token estimates currently in the window.
    pub(crate) fn tokens(&self) -> u64 {
        self.token_sum
    }
}
