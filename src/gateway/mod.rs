//! Axum-based HTTP gateway with body limits, request timeouts, and CORS.
//!
//! Handlers are thin: validation and status mapping here, pipeline logic in
//! the `scrape`, `retrieval`, and `answer` modules.

mod handlers;

use handlers::{
    handle_analyze, handle_chat, handle_create_session, handle_delete_all_sessions,
    handle_delete_session, handle_get_session, handle_health, handle_list_sessions,
    handle_update_messages,
};

use crate::answer::{AnswerGenerator, RetryPolicy};
use crate::config::Config;
use crate::error::{LlmError, SiteChatError};
use crate::providers::GeminiClient;
use crate::scrape;
use crate::sessions::{ChatMessage, SessionStore, SqliteSessionStore};
use anyhow::Result;
use axum::{
    Router,
    http::StatusCode,
    routing::{get, post, put},
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;

/// Maximum request body size (64KB)
pub const MAX_BODY_SIZE: usize = 65_536;
/// Request timeout (30s)
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Shared state for all axum handlers
#[derive(Clone)]
pub struct AppState {
    pub page_client: reqwest::Client,
    pub answerer: Arc<AnswerGenerator>,
    pub store: Arc<dyn SessionStore>,
    pub chunk_size: usize,
    pub full_content_limit: usize,
    pub top_k: usize,
    pub context_limit: usize,
}

/// Analyze request body
#[derive(serde::Deserialize)]
pub struct AnalyzeBody {
    pub url: Option<String>,
}

/// Chat request body. The client sends back the chunks it received from
/// analyze; the gateway itself holds no per-site state.
#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatBody {
    pub question: Option<String>,
    pub website_url: Option<String>,
    #[serde(default)]
    pub chunks: Vec<String>,
    #[serde(default)]
    pub full_content: String,
    pub language: Option<String>,
}

/// Session creation body
#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionBody {
    pub user_id: Option<String>,
    pub website_url: Option<String>,
    #[serde(default)]
    pub website_title: String,
    pub language: Option<String>,
}

/// Body for replacing a session's message list
#[derive(serde::Deserialize)]
pub struct UpdateMessagesBody {
    pub messages: Vec<ChatMessage>,
}

/// Query params for listing or bulk-deleting sessions
#[derive(serde::Deserialize)]
pub struct SessionsQuery {
    pub user_id: Option<String>,
    #[serde(default = "default_list_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

fn default_list_limit() -> usize {
    20
}

/// Assemble the router over a prepared state. Exposed separately so tests
/// can serve it from an ephemeral listener.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/api/analyze", post(handle_analyze))
        .route("/api/chat", post(handle_chat))
        .route(
            "/api/sessions",
            post(handle_create_session)
                .get(handle_list_sessions)
                .delete(handle_delete_all_sessions),
        )
        .route(
            "/api/sessions/{id}",
            get(handle_get_session).delete(handle_delete_session),
        )
        .route("/api/sessions/{id}/messages", put(handle_update_messages))
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(REQUEST_TIMEOUT_SECS),
        ))
        .layer(CorsLayer::permissive())
}

/// Build the shared handler state from configuration.
pub async fn build_state(config: &Config) -> crate::error::Result<AppState> {
    let api_key = config
        .resolve_api_key()
        .ok_or(SiteChatError::Llm(LlmError::MissingApiKey))?;
    let client = GeminiClient::new(
        &api_key,
        config.gemini.temperature,
        config.gemini.max_output_tokens,
    );
    let answerer = Arc::new(AnswerGenerator::new(
        client,
        config.gemini.models.clone(),
        RetryPolicy::new(config.gemini.max_retries),
    ));
    let store = SqliteSessionStore::open(&config.session_db_path()).await?;

    Ok(AppState {
        page_client: scrape::build_page_client(
            config.scrape.fetch_timeout_secs,
            &config.scrape.user_agent,
        ),
        answerer,
        store: Arc::new(store),
        chunk_size: config.scrape.chunk_size,
        full_content_limit: config.scrape.full_content_limit,
        top_k: config.retrieval.top_k,
        context_limit: config.retrieval.context_limit,
    })
}

/// Run the HTTP gateway.
pub async fn run_gateway(host: &str, port: u16, config: Config) -> Result<()> {
    let addr: SocketAddr = format!("{host}:{port}").parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    run_gateway_with_listener(listener, config).await
}

/// Run the HTTP gateway from a pre-bound listener.
pub async fn run_gateway_with_listener(
    listener: tokio::net::TcpListener,
    config: Config,
) -> Result<()> {
    let state = build_state(&config).await?;
    let addr = listener.local_addr()?;
    tracing::info!(%addr, "gateway listening");

    let app = build_router(state);
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn security_body_limit_is_64kb() {
        assert_eq!(MAX_BODY_SIZE, 65_536);
    }

    #[test]
    fn security_timeout_is_30_seconds() {
        assert_eq!(REQUEST_TIMEOUT_SECS, 30);
    }

    #[test]
    fn chat_body_defaults_optional_fields() {
        let parsed: ChatBody = serde_json::from_str(r#"{"question": "hi"}"#).unwrap();
        assert_eq!(parsed.question.as_deref(), Some("hi"));
        assert!(parsed.chunks.is_empty());
        assert!(parsed.full_content.is_empty());
        assert!(parsed.language.is_none());
    }

    #[test]
    fn chat_body_accepts_camel_case_fields() {
        let raw = r#"{
            "question": "q",
            "websiteUrl": "https://acme.example",
            "chunks": ["a", "b"],
            "fullContent": "a b",
            "language": "hi"
        }"#;
        let parsed: ChatBody = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.website_url.as_deref(), Some("https://acme.example"));
        assert_eq!(parsed.chunks.len(), 2);
        assert_eq!(parsed.language.as_deref(), Some("hi"));
    }

    #[test]
    fn sessions_query_defaults_pagination() {
        let parsed: SessionsQuery = serde_urlencoded::from_str("user_id=u1").unwrap();
        assert_eq!(parsed.user_id.as_deref(), Some("u1"));
        assert_eq!(parsed.limit, 20);
        assert_eq!(parsed.offset, 0);
    }
}
