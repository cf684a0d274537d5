//! Completion-API client layer.

mod gemini_types;

pub mod gemini;

pub use gemini::{AttemptOutcome, GeminiClient, DEFAULT_BASE_URL};
