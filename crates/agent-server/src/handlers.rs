//! HTTP Handlers

use std::convert::Infallible;

use axum::{
    Json, Router,
    body::Body,
    extract::{Query, State},
    http::{HeaderName, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use futures::StreamExt;
use serde::{Deserialize, Serialize};

use agent_core::{OutputEvent, StreamTranslator};
use web_research::Profile;

use crate::state::AppState;

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub prompt: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, error: impl Into<String>, code: &str) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            code: code.into(),
        }),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// Liveness probe
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".into(),
    })
}

/// Quick answers: search and answer tools
pub async fn simple_search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Response, ApiError> {
    stream_search(&state, Profile::Simple, params).await
}

/// Multi-step research: search, crawl, extract, format
pub async fn deep_search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Response, ApiError> {
    stream_search(&state, Profile::Deep, params).await
}

/// Stream a session's answer as plain text.
///
/// Failures before the first text or tool notice become an error status;
/// after that the status is already sent and errors are written into the body.
async fn stream_search(
    state: &AppState,
    profile: Profile,
    params: SearchParams,
) -> Result<Response, ApiError> {
    let prompt = params
        .prompt
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "No prompt provided", "MISSING_PROMPT"))?;

    let permit = state.stream_slots.clone().try_acquire_owned().map_err(|_| {
        tracing::warn!(%profile, "Stream ceiling reached, rejecting request");
        api_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "Too many searches in progress, please retry shortly",
            "TOO_MANY_STREAMS",
        )
    })?;

    tracing::info!(%profile, prompt, "Searching the web");

    let raw = state.session(profile).stream(prompt);
    let mut events = StreamTranslator::new(state.verbosity).translate(raw);

    // Diagnostics are held back until the first real output decides the status
    let mut held = Vec::new();
    loop {
        match events.next().await {
            Some(OutputEvent::StreamError(message)) => {
                tracing::error!(%profile, error = %message, "Search failed before streaming");
                return Err(api_error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Error processing request: {message}"),
                    "SEARCH_FAILED",
                ));
            }
            Some(event @ OutputEvent::Diagnostic(_)) => held.push(event),
            Some(event) => {
                held.push(event);
                break;
            }
            None => break,
        }
    }

    let body = futures::stream::iter(held)
        .chain(events)
        .map(move |event| {
            // The slot is released when the body is dropped
            let _slot = &permit;
            Ok::<_, Infallible>(encode(&event))
        });

    let mut response = Body::from_stream(body).into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    if profile == Profile::Deep {
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert(
            HeaderName::from_static("x-accel-buffering"),
            HeaderValue::from_static("no"),
        );
    }

    Ok(response)
}

/// Wire text for one output event
pub fn encode(event: &OutputEvent) -> String {
    match event {
        OutputEvent::TextChunk(text) => text.clone(),
        OutputEvent::ToolNotice(name) => format!("\n[Using tool: {name}]\n"),
        OutputEvent::StreamError(message) => format!("\nError during streaming: {message}\n"),
        OutputEvent::Diagnostic(message) => format!("\n[DEBUG: {message}]\n"),
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health_check))
        .route("/health", get(health_check))
        .route("/simple-search", get(simple_search))
        .route("/deep-search", get(deep_search))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_core::{
        Verbosity,
        mock::{ScriptedProvider, ScriptedTurn},
    };
    use axum::http::Request;
    use serde_json::json;
    use std::sync::Arc;
    use tower::ServiceExt;
    use web_research::{MockSearchProvider, ProfileOptions, build_session};

    fn state(turns: Vec<ScriptedTurn>, verbosity: Verbosity, slots: usize) -> (AppState, Arc<ScriptedProvider>) {
        let llm = Arc::new(ScriptedProvider::new(turns));
        let search = Arc::new(MockSearchProvider::new());
        let options = ProfileOptions::default();

        let simple = build_session(Profile::Simple, llm.clone(), search.clone(), &options).unwrap();
        let deep = build_session(Profile::Deep, llm.clone(), search, &options).unwrap();

        (AppState::new(simple, deep, slots, verbosity), llm)
    }

    async fn fetch(app: Router, uri: &str) -> (StatusCode, axum::http::HeaderMap, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, headers, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        let (state, _) = state(Vec::new(), Verbosity::Quiet, 1);

        for uri in ["/", "/health"] {
            let (status, _, body) = fetch(router(state.clone()), uri).await;
            assert_eq!(status, StatusCode::OK);
            let health: HealthResponse = serde_json::from_str(&body).unwrap();
            assert_eq!(health.status, "healthy");
        }
    }

    #[tokio::test]
    async fn test_missing_prompt_rejected() {
        let (state, llm) = state(Vec::new(), Verbosity::Quiet, 1);

        for uri in ["/simple-search", "/deep-search?prompt=", "/simple-search?prompt=%20%20"] {
            let (status, _, body) = fetch(router(state.clone()), uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            let error: ErrorResponse = serde_json::from_str(&body).unwrap();
            assert_eq!(error.error, "No prompt provided");
        }
        assert!(llm.requests().is_empty());
    }

    #[tokio::test]
    async fn test_simple_search_streams_text() {
        let (state, llm) = state(
            vec![
                ScriptedTurn::tool("web_answer", json!({"query": "capital of France"})),
                ScriptedTurn::text("Paris."),
            ],
            Verbosity::Quiet,
            2,
        );

        let (status, headers, body) =
            fetch(router(state), "/simple-search?prompt=capital%20of%20France").await;

        assert_eq!(status, StatusCode::OK);
        assert!(headers[header::CONTENT_TYPE].to_str().unwrap().starts_with("text/plain"));
        assert!(headers.get(header::CACHE_CONTROL).is_none());
        assert_eq!(body, "\n[Using tool: web_answer]\nParis.");
        assert_eq!(llm.requests()[0].tools, vec!["web_search", "web_answer"]);
    }

    #[tokio::test]
    async fn test_deep_search_headers() {
        let (state, llm) = state(vec![ScriptedTurn::text("Report")], Verbosity::Quiet, 1);

        let (status, headers, body) = fetch(router(state), "/deep-search?prompt=history").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CACHE_CONTROL], "no-cache");
        assert_eq!(headers["x-accel-buffering"], "no");
        assert_eq!(body, "Report");
        assert_eq!(
            llm.requests()[0].tools,
            vec!["web_search", "web_crawl", "web_extract", "format_research_response"]
        );
    }

    #[tokio::test]
    async fn test_failure_before_output_is_500() {
        let (state, _) = state(vec![ScriptedTurn::refused("engine down")], Verbosity::Quiet, 1);

        let (status, _, body) = fetch(router(state), "/simple-search?prompt=hi").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let error: ErrorResponse = serde_json::from_str(&body).unwrap();
        assert!(error.error.contains("engine down"));
    }

    #[tokio::test]
    async fn test_failure_before_output_is_500_with_diagnostics() {
        let (state, _) = state(vec![ScriptedTurn::refused("engine down")], Verbosity::Debug, 1);

        let (status, _, body) = fetch(router(state), "/deep-search?prompt=hi").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let error: ErrorResponse = serde_json::from_str(&body).unwrap();
        assert_eq!(error.code, "SEARCH_FAILED");
        assert!(error.error.contains("engine down"));
    }

    #[tokio::test]
    async fn test_failure_mid_stream_is_written_to_body() {
        let (state, _) = state(
            vec![ScriptedTurn::text("partial").then_fail("connection reset")],
            Verbosity::Quiet,
            1,
        );

        let (status, _, body) = fetch(router(state), "/simple-search?prompt=hi").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.starts_with("partial\nError during streaming: "));
        assert!(body.trim_end().ends_with("connection reset"));
    }

    #[tokio::test]
    async fn test_stream_ceiling() {
        let (state, llm) = state(vec![ScriptedTurn::text("unused")], Verbosity::Quiet, 1);
        let held = state.stream_slots.clone().try_acquire_owned().unwrap();

        let (status, _, body) = fetch(router(state.clone()), "/deep-search?prompt=busy").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        let error: ErrorResponse = serde_json::from_str(&body).unwrap();
        assert_eq!(error.code, "TOO_MANY_STREAMS");
        assert!(llm.requests().is_empty());

        drop(held);
        let (status, _, _) = fetch(router(state.clone()), "/deep-search?prompt=free").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(state.stream_slots.available_permits(), 1);
    }

    #[tokio::test]
    async fn test_debug_verbosity_adds_diagnostics() {
        let (state, _) = state(vec![ScriptedTurn::text("Hi")], Verbosity::Debug, 1);

        let (status, _, body) = fetch(router(state), "/simple-search?prompt=hello").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.starts_with("\n[DEBUG: turn 1 started]\n"));
        let answer = body.find("Hi").unwrap();
        assert!(body[..answer].contains("[DEBUG: "));
    }

    #[test]
    fn test_encode() {
        assert_eq!(encode(&OutputEvent::TextChunk("abc".into())), "abc");
        assert_eq!(
            encode(&OutputEvent::ToolNotice("web_crawl".into())),
            "\n[Using tool: web_crawl]\n"
        );
        assert_eq!(
            encode(&OutputEvent::StreamError("boom".into())),
            "\nError during streaming: boom\n"
        );
        assert_eq!(encode(&OutputEvent::Diagnostic("x".into())), "\n[DEBUG: x]\n");
    }
}
