//! Google Gemini `generateContent` client.
//!
//! One call maps to one [`AttemptOutcome`]; the retry and model-fallback
//! policy lives in `answer::retry`, which consumes these outcomes through a
//! pure transition function. Nothing here sleeps or retries.

use super::gemini_types::{
    Content, ErrorBody, GenerateContentRequest, GenerateContentResponse, GenerationConfig, Part,
    SafetySetting,
};
use reqwest::Client;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// All four harm categories run unblocked. Grounded answers about arbitrary
/// public websites trip the default filters too often.
const SAFETY_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

/// What one completion attempt produced, classified for the retry policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// HTTP 200 with non-empty answer text.
    Answer(String),
    /// HTTP 429; `retry_hint` is the upstream `RetryInfo` delay when the
    /// error body carried a parsable one.
    RateLimited { retry_hint: Option<Duration> },
    /// HTTP 404 — the model identifier is unknown upstream.
    ModelNotFound,
    /// Any other non-OK status, or an OK response without usable text.
    Failed { status: u16 },
    /// The request never completed (DNS, TLS, timeout, connection reset).
    Transport { message: String },
}

/// Wall-clock ceiling for one `generateContent` call. Generation latency
/// dominates, so this is far above the connect timeout.
const GENERATE_TIMEOUT_SECS: u64 = 120;

/// Pooled client shared by every attempt across the model fallback list.
fn build_generate_client() -> Client {
    Client::builder()
        .timeout(Duration::from_secs(GENERATE_TIMEOUT_SECS))
        .connect_timeout(Duration::from_secs(10))
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(60))
        .build()
        .unwrap_or_else(|_| Client::new())
}

pub struct GeminiClient {
    api_key: String,
    base_url: String,
    client: Client,
    temperature: f64,
    max_output_tokens: u32,
}

impl GeminiClient {
    pub fn new(api_key: &str, temperature: f64, max_output_tokens: u32) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, api_key, temperature, max_output_tokens)
    }

    /// Point the client at a different endpoint (tests use a local mock).
    pub fn with_base_url(
        base_url: &str,
        api_key: &str,
        temperature: f64,
        max_output_tokens: u32,
    ) -> Self {
        Self {
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            client: build_generate_client(),
            temperature,
            max_output_tokens,
        }
    }

    fn build_request(&self, prompt: &str) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
            },
            safety_settings: SAFETY_CATEGORIES
                .iter()
                .map(|category| SafetySetting {
                    category,
                    threshold: "BLOCK_NONE",
                })
                .collect(),
        }
    }

    /// Issue a single `generateContent` call and classify the result.
    pub async fn generate(&self, model: &str, prompt: &str) -> AttemptOutcome {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, model, self.api_key
        );
        let request = self.build_request(prompt);

        let response = match self.client.post(&url).json(&request).send().await {
            Ok(response) => response,
            Err(e) => {
                return AttemptOutcome::Transport {
                    message: e.to_string(),
                };
            }
        };

        let status = response.status().as_u16();
        if response.status().is_success() {
            if let Ok(parsed) = response.json::<GenerateContentResponse>().await
                && let Some(text) = extract_text(&parsed)
            {
                return AttemptOutcome::Answer(text);
            }
            // 200 without usable text falls through to the same abandon-model
            // path as any other unexpected status.
            return AttemptOutcome::Failed { status };
        }

        let body = response.text().await.unwrap_or_default();
        match status {
            429 => AttemptOutcome::RateLimited {
                retry_hint: parse_retry_delay(&body),
            },
            404 => AttemptOutcome::ModelNotFound,
            _ => AttemptOutcome::Failed { status },
        }
    }
}

fn extract_text(response: &GenerateContentResponse) -> Option<String> {
    if response.error.is_some() {
        return None;
    }
    let text = response
        .candidates
        .as_ref()?
        .first()?
        .content
        .parts
        .iter()
        .filter_map(|part| part.text.as_deref())
        .collect::<Vec<_>>()
        .join("\n");

    (!text.is_empty()).then_some(text)
}

/// Pull the `RetryInfo` delay hint out of a 429 error body.
///
/// The body looks like
/// `{"error":{"message":"...","details":[{"@type":".../RetryInfo","retryDelay":"7s"},...]}}`.
/// Returns `None` for anything unparsable; the retry policy then falls back
/// to its fixed floor.
pub(crate) fn parse_retry_delay(body: &str) -> Option<Duration> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    let details = parsed.error?.details;

    let retry_info = details.iter().find(|detail| {
        detail
            .get("@type")
            .and_then(|t| t.as_str())
            .is_some_and(|t| t.ends_with("RetryInfo"))
    })?;

    let delay = retry_info.get("retryDelay")?.as_str()?;
    let seconds: f64 = delay.strip_suffix('s').unwrap_or(delay).parse().ok()?;
    if !seconds.is_finite() || seconds < 0.0 {
        return None;
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    Some(Duration::from_millis((seconds * 1000.0).ceil() as u64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_with_safety_off_and_generation_config() {
        let client = GeminiClient::new("test-key", 0.7, 1024);
        let request = client.build_request("hello");
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(json["generationConfig"]["temperature"], 0.7);
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 1024);
        let settings = json["safetySettings"].as_array().unwrap();
        assert_eq!(settings.len(), 4);
        assert!(settings
            .iter()
            .all(|s| s["threshold"] == "BLOCK_NONE"));
    }

    #[test]
    fn extract_text_joins_parts() {
        let json = r#"{"candidates":[{"content":{"parts":[{"text":"Hello"},{"text":"there"}]}}]}"#;
        let response: GenerateContentResponse = serde_json::from_str(json).unwrap();
        assert_eq!(extract_text(&response), Some("Hello\nthere".to_string()));
    }

    #[test]
    fn extract_text_rejects_empty_and_error_responses() {
        let empty: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates":[{"content":{"parts":[]}}]}"#).unwrap();
        assert_eq!(extract_text(&empty), None);

        let error: GenerateContentResponse =
            serde_json::from_str(r#"{"error":{"message":"quota"}}"#).unwrap();
        assert_eq!(extract_text(&error), None);
    }

    #[test]
    fn parses_retry_delay_from_error_details() {
        let body = r#"{
            "error": {
                "code": 429,
                "message": "Resource has been exhausted",
                "details": [
                    {"@type": "type.googleapis.com/google.rpc.ErrorInfo", "reason": "RATE_LIMIT_EXCEEDED"},
                    {"@type": "type.googleapis.com/google.rpc.RetryInfo", "retryDelay": "7s"}
                ]
            }
        }"#;
        assert_eq!(parse_retry_delay(body), Some(Duration::from_secs(7)));
    }

    #[test]
    fn fractional_retry_delay_rounds_up_to_millis() {
        let body = r#"{"error":{"message":"x","details":[{"@type":"a/RetryInfo","retryDelay":"2.0005s"}]}}"#;
        assert_eq!(parse_retry_delay(body), Some(Duration::from_millis(2001)));
    }

    #[test]
    fn unparsable_bodies_yield_no_hint() {
        assert_eq!(parse_retry_delay(""), None);
        assert_eq!(parse_retry_delay("not json"), None);
        assert_eq!(parse_retry_delay(r#"{"error":{"message":"x"}}"#), None);
        assert_eq!(
            parse_retry_delay(
                r#"{"error":{"message":"x","details":[{"@type":"a/RetryInfo","retryDelay":"soon"}]}}"#
            ),
            None
        );
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let client = GeminiClient::with_base_url("http://localhost:9999/", "k", 0.7, 1024);
        assert_eq!(client.base_url, "http://localhost:9999");
    }
}
