use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use super::{
    AnalyzeBody, AppState, ChatBody, CreateSessionBody, SessionsQuery, UpdateMessagesBody,
};
use crate::answer::Language;
use crate::error::{ScrapeError, SessionError};
use crate::retrieval::{assemble_context, find_relevant_chunks};
use crate::scrape;

type JsonBody<T> = Result<Json<T>, axum::extract::rejection::JsonRejection>;

fn bad_request(message: impl Into<String>) -> Response {
    let err = json!({"error": message.into()});
    (StatusCode::BAD_REQUEST, Json(err)).into_response()
}

fn session_not_found(id: &str) -> Response {
    let err = SessionError::NotFound(id.to_string());
    (StatusCode::NOT_FOUND, Json(json!({"error": err.to_string()}))).into_response()
}

fn store_failure(error: &anyhow::Error) -> Response {
    let err = SessionError::Store(error.to_string());
    tracing::error!(error = %err, "session store failure");
    let body = json!({"error": "Session store failure"});
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

/// Cut `text` at a character count without splitting a code point.
fn clamp_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// GET /health
pub(super) async fn handle_health() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

/// POST /api/analyze — fetch a page and return its text and chunks.
pub(super) async fn handle_analyze(
    State(state): State<AppState>,
    body: JsonBody<AnalyzeBody>,
) -> Response {
    let Json(analyze) = match body {
        Ok(b) => b,
        Err(e) => return bad_request(format!("Invalid JSON: {e}")),
    };

    let Some(url) = analyze
        .url
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
    else {
        return bad_request("URL is required");
    };

    match scrape::analyze_url(&state.page_client, url, state.chunk_size).await {
        Ok(analysis) => {
            let body = json!({
                "success": true,
                "title": analysis.title,
                "pagesScraped": 1,
                "contentLength": analysis.content.chars().count(),
                "chunksCreated": analysis.chunks.len(),
                "chunks": analysis.chunks,
                "fullContent": clamp_chars(&analysis.content, state.full_content_limit),
            });
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e @ (ScrapeError::InvalidUrl(_) | ScrapeError::UpstreamStatus { .. })) => {
            bad_request(e.to_string())
        }
        Err(ScrapeError::Request(e)) => {
            tracing::error!(url, error = %e, "page fetch failed");
            let err = json!({"error": "Failed to fetch website"});
            (StatusCode::INTERNAL_SERVER_ERROR, Json(err)).into_response()
        }
    }
}

/// POST /api/chat — answer a question grounded in previously analyzed content.
pub(super) async fn handle_chat(
    State(state): State<AppState>,
    body: JsonBody<ChatBody>,
) -> Response {
    let Json(chat) = match body {
        Ok(b) => b,
        Err(e) => return bad_request(format!("Invalid JSON: {e}")),
    };

    let Some(question) = chat
        .question
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
    else {
        return bad_request("Question is required");
    };

    if chat.chunks.is_empty() && chat.full_content.trim().is_empty() {
        return bad_request("Website content is required");
    }

    let relevant = find_relevant_chunks(question, &chat.chunks, state.top_k);
    let relevant_count = relevant.len();
    let context = assemble_context(&relevant, &chat.full_content, state.context_limit);
    let language = Language::from_code(chat.language.as_deref().unwrap_or("en"));

    let result = state
        .answerer
        .answer(question, chat.website_url.as_deref(), language, &context)
        .await;

    if result.is_rate_limited() {
        let err = json!({
            "error": "RATE_LIMITED",
            "message": "API quota exceeded. Please wait a moment and try again.",
        });
        return (StatusCode::TOO_MANY_REQUESTS, Json(err)).into_response();
    }

    let answer = if result.text.trim().is_empty() {
        "I could not generate a response.".to_string()
    } else {
        result.text
    };
    let body = json!({"answer": answer, "relevantChunksUsed": relevant_count});
    (StatusCode::OK, Json(body)).into_response()
}

/// POST /api/sessions
pub(super) async fn handle_create_session(
    State(state): State<AppState>,
    body: JsonBody<CreateSessionBody>,
) -> Response {
    let Json(create) = match body {
        Ok(b) => b,
        Err(e) => return bad_request(format!("Invalid JSON: {e}")),
    };

    let Some(user_id) = create
        .user_id
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
    else {
        return bad_request("userId is required");
    };
    let Some(website_url) = create
        .website_url
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
    else {
        return bad_request("websiteUrl is required");
    };

    let language = create.language.as_deref().unwrap_or("en");
    match state
        .store
        .create_session(user_id, website_url, &create.website_title, language)
        .await
    {
        Ok(session) => (StatusCode::CREATED, Json(session)).into_response(),
        Err(e) => store_failure(&e),
    }
}

/// GET /api/sessions?user_id=&limit=&offset=
pub(super) async fn handle_list_sessions(
    State(state): State<AppState>,
    Query(query): Query<SessionsQuery>,
) -> Response {
    let Some(user_id) = query
        .user_id
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
    else {
        return bad_request("user_id is required");
    };

    match state
        .store
        .list_sessions(user_id, query.limit, query.offset)
        .await
    {
        Ok(sessions) => Json(json!({"sessions": sessions})).into_response(),
        Err(e) => store_failure(&e),
    }
}

/// GET /api/sessions/{id}
pub(super) async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    match state.store.get_session(&id).await {
        Ok(Some(session)) => Json(session).into_response(),
        Ok(None) => session_not_found(&id),
        Err(e) => store_failure(&e),
    }
}

/// PUT /api/sessions/{id}/messages
pub(super) async fn handle_update_messages(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: JsonBody<UpdateMessagesBody>,
) -> Response {
    let Json(update) = match body {
        Ok(b) => b,
        Err(e) => return bad_request(format!("Invalid JSON: {e}")),
    };

    match state.store.update_messages(&id, &update.messages).await {
        Ok(true) => Json(json!({"success": true})).into_response(),
        Ok(false) => session_not_found(&id),
        Err(e) => store_failure(&e),
    }
}

/// DELETE /api/sessions/{id}
pub(super) async fn handle_delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    match state.store.delete_session(&id).await {
        Ok(true) => Json(json!({"deleted": true})).into_response(),
        Ok(false) => session_not_found(&id),
        Err(e) => store_failure(&e),
    }
}

/// DELETE /api/sessions?user_id=
pub(super) async fn handle_delete_all_sessions(
    State(state): State<AppState>,
    Query(query): Query<SessionsQuery>,
) -> Response {
    let Some(user_id) = query
        .user_id
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
    else {
        return bad_request("user_id is required");
    };

    match state.store.delete_all_sessions(user_id).await {
        Ok(deleted) => Json(json!({"deleted": deleted})).into_response(),
        Err(e) => store_failure(&e),
    }
}
