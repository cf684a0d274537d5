//! Model-fallback retry policy as an explicit state machine.
//!
//! The policy is a pure transition function over `(current try, outcome)`;
//! the driver in [`super::AnswerGenerator`] owns the sleeps and HTTP calls.
//! Keeping the transitions pure pins down the attempt accounting: every model
//! is tried at most `max_retries` times, then the next model starts fresh.

use crate::providers::AttemptOutcome;
use std::time::Duration;

/// Tunable knobs of the retry loop. Production uses the defaults; tests
/// shrink the delays to keep the suite fast.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Attempts per model before advancing to the next one.
    pub max_retries: u32,
    /// Added on top of an upstream retry-delay hint.
    pub rate_limit_pad: Duration,
    /// Wait used when a 429 body carries no parsable hint.
    pub rate_limit_floor: Duration,
    /// Flat pause between attempts after a transport-level failure.
    pub transport_pause: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries: max_retries.max(1),
            rate_limit_pad: Duration::from_secs(2),
            rate_limit_floor: Duration::from_secs(10),
            transport_pause: Duration::from_secs(3),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3)
    }
}

/// Where the fallback loop stands after an attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryState {
    /// Issue attempt `attempt` (0-based) against model `model` now.
    TryModel { model: usize, attempt: u32 },
    /// Sleep for `delay`, then issue attempt `attempt` against `model`.
    Wait {
        delay: Duration,
        model: usize,
        attempt: u32,
    },
    /// A usable answer came back.
    Success(String),
    /// Every model in the list was spent without an answer.
    Exhausted,
}

/// Pure transition: given the coordinates of the attempt that just finished
/// and its outcome, decide what happens next.
///
/// A 429 on the final attempt of the final model goes straight to
/// [`RetryState::Exhausted`] without honoring the backoff: no further attempt
/// follows, so the wait would only delay the caller's failure response.
pub fn transition(
    model: usize,
    attempt: u32,
    outcome: &AttemptOutcome,
    policy: &RetryPolicy,
    model_count: usize,
) -> RetryState {
    let next_model_exists = model + 1 < model_count;
    let attempts_left = attempt + 1 < policy.max_retries;

    match outcome {
        AttemptOutcome::Answer(text) => RetryState::Success(text.clone()),

        AttemptOutcome::RateLimited { retry_hint } => {
            let delay = retry_hint.map_or(policy.rate_limit_floor, |hint| {
                hint + policy.rate_limit_pad
            });
            if attempts_left {
                RetryState::Wait {
                    delay,
                    model,
                    attempt: attempt + 1,
                }
            } else if next_model_exists {
                // Last allowed attempt for this model: the backoff still
                // applies, then the next model starts at attempt zero.
                RetryState::Wait {
                    delay,
                    model: model + 1,
                    attempt: 0,
                }
            } else {
                RetryState::Exhausted
            }
        }

        // Unknown model or any other unexpected status: this model's retry
        // budget is abandoned immediately, no wait.
        AttemptOutcome::ModelNotFound | AttemptOutcome::Failed { .. } => {
            if next_model_exists {
                RetryState::TryModel {
                    model: model + 1,
                    attempt: 0,
                }
            } else {
                RetryState::Exhausted
            }
        }

        AttemptOutcome::Transport { .. } => {
            if attempts_left {
                RetryState::Wait {
                    delay: policy.transport_pause,
                    model,
                    attempt: attempt + 1,
                }
            } else if next_model_exists {
                RetryState::TryModel {
                    model: model + 1,
                    attempt: 0,
                }
            } else {
                RetryState::Exhausted
            }
        }
    }
}
