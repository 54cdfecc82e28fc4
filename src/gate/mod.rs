//! Cooldown gate suppressing upstream calls after a rate-limit signal.
//!
//! A single process-wide gate with two states:
//!
//! - **Open**: requests are allowed through.
//! - **Throttled**: the upstream signaled throttling; requests are blocked
//!   until the penalty window elapses.
//!
//! Recovery is lazy: the gate reopens on the first check after the window,
//! never via a timer or background task. The state is in-memory and resets on
//! application restart.

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};

/// Default penalty window after an upstream rate-limit signal.
const DEFAULT_PENALTY: Duration = Duration::from_secs(3600);

/// Gate state.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum GateState {
    /// Requests are allowed.
    Open,
    /// Requests are blocked until `resumes_at`.
    Throttled { resumes_at: DateTime<Utc> },
}

/// Outcome of a gate check.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum GateDecision {
    /// The request may proceed.
    Allow,
    /// The request is suppressed for `remaining` more time.
    Deny { remaining: Duration },
}

/// Process-wide cooldown gate.
///
/// Thread-safe; a single global lock guards the state (it is a singleton
/// cooldown, not per-symbol). All time-based transitions are evaluated
/// against the `now` passed in by the caller, which keeps the clock
/// injectable for tests.
pub struct CooldownGate {
    state: Mutex<GateState>,
    penalty: Duration,
}

impl CooldownGate {
    /// Create a gate with the default 1-hour penalty window.
    pub fn new() -> Self {
        Self::with_penalty(DEFAULT_PENALTY)
    }

    /// Create a gate with a custom penalty window.
    pub fn with_penalty(penalty: Duration) -> Self {
        Self {
            state: Mutex::new(GateState::Open),
            penalty,
        }
    }

    /// The penalty window applied by [`trip`](Self::trip).
    pub fn penalty(&self) -> Duration {
        self.penalty
    }

    /// Lock the state mutex, recovering from poison if necessary.
    ///
    /// Worst case after recovery is a slightly stale gate state, which is
    /// better than panicking.
    fn lock_state(&self) -> MutexGuard<'_, GateState> {
        self.state.lock().unwrap_or_else(|poisoned| {
            warn!("Cooldown gate mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Check whether a request may proceed at `now`.
    ///
    /// Reopens the gate when the penalty window has elapsed (lazy recovery),
    /// otherwise reports the remaining suppression time.
    pub fn check(&self, now: DateTime<Utc>) -> GateDecision {
        let mut state = self.lock_state();

        match *state {
            GateState::Open => GateDecision::Allow,
            GateState::Throttled { resumes_at } => {
                if now >= resumes_at {
                    info!("Cooldown gate: penalty window elapsed, reopening");
                    *state = GateState::Open;
                    GateDecision::Allow
                } else {
                    let remaining = (resumes_at - now).to_std().unwrap_or(Duration::ZERO);
                    debug!("Cooldown gate: throttled for {:?} more", remaining);
                    GateDecision::Deny { remaining }
                }
            }
        }
    }

    /// Record an upstream rate-limit signal at `now`.
    ///
    /// First trip wins: tripping while already throttled does not extend or
    /// shorten the existing window, which keeps a burst of throttled requests
    /// from pushing recovery out indefinitely.
    pub fn trip(&self, now: DateTime<Utc>) {
        let mut state = self.lock_state();

        match *state {
            GateState::Open => {
                let resumes_at = now
                    + chrono::Duration::from_std(self.penalty)
                        .unwrap_or_else(|_| chrono::Duration::seconds(3600));
                info!("Cooldown gate: tripped, suppressing requests until {}", resumes_at);
                *state = GateState::Throttled { resumes_at };
            }
            GateState::Throttled { resumes_at } => {
                debug!("Cooldown gate: already throttled until {}", resumes_at);
            }
        }
    }

}

impl Default for CooldownGate {
    fn default() -> Self {
        Self::new()
    }
}
