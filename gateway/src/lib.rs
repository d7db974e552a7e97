//! HTTP surface of the level relay: routes, handlers, and shared state.

pub mod api;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::api::{ApiError, ErrorBody, HealthBody};
use levelsmith_core::{GenerationRequest, LevelRelay};

// Application state: one relay (and its model client), built at startup and
// never mutated.
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<LevelRelay>,
}

impl AppState {
    pub fn new(relay: LevelRelay) -> Self {
        Self {
            relay: Arc::new(relay),
        }
    }
}

/// Builds the router. Anything that is not an API route falls through to
/// files under `static_dir`, when one is given.
pub fn router(state: AppState, static_dir: Option<&str>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health_check))
        .route("/api/generate-level", post(generate_level));

    let app = match static_dir {
        Some(dir) => app.fallback_service(ServeDir::new(dir)),
        None => app,
    };

    app.layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// --- HANDLERS ---

async fn health_check() -> Json<HealthBody> {
    Json(HealthBody::ok())
}

async fn generate_level(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request = match parse_request(is_json(&headers), &body) {
        Ok(request) => request,
        Err(message) => {
            warn!(%message, "rejecting unreadable request body");
            let body = ErrorBody {
                error: "Invalid request body".to_string(),
                message,
            };
            return (StatusCode::BAD_REQUEST, Json(body)).into_response();
        }
    };

    info!(
        theme = ?request.theme,
        level = ?request.level,
        difficulty = ?request.difficulty,
        "level requested"
    );

    match state.relay.generate_level(&request).await {
        Ok(level) => Json(level).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// `application/json` or any `+json` media type, parameters ignored.
fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|essence| {
            let essence = essence.trim().to_ascii_lowercase();
            essence == "application/json" || essence.ends_with("+json")
        })
        .unwrap_or(false)
}

/// Reads the body without requiring any field. Bodies that are not declared
/// as JSON are skipped, as is an empty one: both are requests with nothing
/// specified.
fn parse_request(json: bool, body: &[u8]) -> Result<GenerationRequest, String> {
    if !json || body.iter().all(u8::is_ascii_whitespace) {
        return Ok(GenerationRequest::default());
    }
    match serde_json::from_slice::<Value>(body).map_err(|e| e.to_string())? {
        Value::Object(map) => {
            serde_json::from_value(Value::Object(map)).map_err(|e| e.to_string())
        }
        // Only an object can carry fields; anything else asks for nothing.
        _ => Ok(GenerationRequest::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content_type(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, value.parse().unwrap());
        headers
    }

    #[test]
    fn empty_body_is_an_unspecified_request() {
        let request = parse_request(true, b"").unwrap();
        assert!(request.theme.is_none());
        assert!(parse_request(true, b"  \n").unwrap().level.is_none());
    }

    #[test]
    fn non_object_json_is_an_unspecified_request() {
        assert!(parse_request(true, b"[1, 2]").unwrap().difficulty.is_none());
    }

    #[test]
    fn broken_json_is_rejected() {
        assert!(parse_request(true, b"{\"theme\": ").is_err());
    }

    #[test]
    fn undeclared_body_is_skipped() {
        let request = parse_request(false, b"not json").unwrap();
        assert!(request.theme.is_none());
        let request = parse_request(false, br#"{"theme":"ice"}"#).unwrap();
        assert!(request.theme.is_none());
    }

    #[test]
    fn recognises_json_media_types() {
        assert!(is_json(&content_type("application/json")));
        assert!(is_json(&content_type("Application/JSON; charset=utf-8")));
        assert!(is_json(&content_type("application/vnd.api+json")));
        assert!(!is_json(&content_type("text/plain")));
        assert!(!is_json(&HeaderMap::new()));
    }
}
