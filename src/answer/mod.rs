//! Grounded answer generation: prompt assembly plus the model-fallback
//! driver over the Gemini client.

pub mod prompt;
pub mod retry;

pub use prompt::{build_grounding_prompt, Language, REFUSAL_SENTENCE};
pub use retry::{transition, RetryPolicy, RetryState};

use crate::providers::{AttemptOutcome, GeminiClient};

/// The single failure kind surfaced to callers. Every exhaustion path,
/// whether rate limits, unknown models, or transport failures, collapses
/// into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerErrorKind {
    RateLimited,
}

/// Terminal output of one answer attempt. Either `text` holds a real answer
/// or `error_kind` is set — never both meaningfully.
#[derive(Debug, Clone)]
pub struct AnswerResult {
    pub text: String,
    pub error_kind: Option<AnswerErrorKind>,
}

impl AnswerResult {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self.error_kind, Some(AnswerErrorKind::RateLimited))
    }

    fn exhausted() -> Self {
        Self {
            text: String::new(),
            error_kind: Some(AnswerErrorKind::RateLimited),
        }
    }
}

/// Drives the retry state machine against an ordered model fallback list.
///
/// Attempts are strictly sequential: each transition depends on the previous
/// attempt's outcome, so nothing here is ever issued in parallel. An
/// in-flight backoff wait cannot be aborted once started.
pub struct AnswerGenerator {
    client: GeminiClient,
    models: Vec<String>,
    policy: RetryPolicy,
}

impl AnswerGenerator {
    pub fn new(client: GeminiClient, models: Vec<String>, policy: RetryPolicy) -> Self {
        Self {
            client,
            models,
            policy,
        }
    }

    /// Build the grounding prompt and run it through the fallback loop.
    pub async fn answer(
        &self,
        question: &str,
        url: Option<&str>,
        language: Language,
        context: &str,
    ) -> AnswerResult {
        let prompt = build_grounding_prompt(question, url, language, context);
        self.run_prompt(&prompt).await
    }

    /// Run a fully-rendered prompt through the model fallback loop.
    pub async fn run_prompt(&self, prompt: &str) -> AnswerResult {
        if self.models.is_empty() {
            return AnswerResult::exhausted();
        }

        let mut state = RetryState::TryModel {
            model: 0,
            attempt: 0,
        };

        loop {
            match state {
                RetryState::TryModel { model, attempt } => {
                    let model_name = &self.models[model];
                    let outcome = self.client.generate(model_name, prompt).await;
                    log_outcome(model_name, attempt, &outcome);
                    state = transition(model, attempt, &outcome, &self.policy, self.models.len());
                }
                RetryState::Wait {
                    delay,
                    model,
                    attempt,
                } => {
                    tokio::time::sleep(delay).await;
                    state = RetryState::TryModel { model, attempt };
                }
                RetryState::Success(text) => {
                    return AnswerResult {
                        text,
                        error_kind: None,
                    };
                }
                RetryState::Exhausted => {
                    tracing::warn!("all models exhausted without an answer");
                    return AnswerResult::exhausted();
                }
            }
        }
    }
}

fn log_outcome(model: &str, attempt: u32, outcome: &AttemptOutcome) {
    match outcome {
        AttemptOutcome::Answer(_) => {
            if attempt > 0 {
                tracing::info!(model, attempt, "model recovered after retries");
            }
        }
        AttemptOutcome::RateLimited { retry_hint } => {
            tracing::warn!(model, attempt, ?retry_hint, "rate limited");
        }
        AttemptOutcome::ModelNotFound => {
            tracing::warn!(model, "model not recognized upstream, advancing");
        }
        AttemptOutcome::Failed { status } => {
            tracing::warn!(model, attempt, status = *status, "unexpected upstream response");
        }
        AttemptOutcome::Transport { message } => {
            tracing::warn!(model, attempt, error = %message, "transport failure");
        }
    }
}
