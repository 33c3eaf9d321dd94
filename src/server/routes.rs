use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use tower_http::services::ServeDir;

use crate::server::api::{self, ApiError, AppState};

pub struct HttpResponse {
    pub status_code: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl HttpResponse {
    pub fn json(status_code: u16, body: String) -> Self {
        Self {
            status_code,
            content_type: "application/json",
            body,
        }
    }
}

impl IntoResponse for HttpResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, [(header::CONTENT_TYPE, self.content_type)], self.body).into_response()
    }
}

/// API routes, with the static frontend bundle as the fallback for everything else.
pub fn router(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.static_dir);
    Router::new()
        .route("/api/health", get(health))
        .route("/api/reference/status", get(reference_status))
        .route("/api/reference/initialize", post(reference_initialize))
        .route("/api/seed/encode", post(seed_encode))
        .route("/api/seed/decode", post(seed_decode))
        .route("/api/bonuses", post(bonuses))
        .route("/api/calculate", post(calculate))
        .fallback_service(static_files)
        .with_state(state)
}

async fn health() -> HttpResponse {
    match api::health_payload() {
        Ok(payload) => HttpResponse::json(200, payload),
        Err(err) => error_response(500, &err.to_string()),
    }
}

async fn reference_status(State(state): State<AppState>) -> HttpResponse {
    respond(api::reference_status_payload(&state))
}

async fn reference_initialize(State(state): State<AppState>) -> HttpResponse {
    respond(api::reference_initialize_payload(&state).await)
}

async fn seed_encode(State(state): State<AppState>, body: String) -> HttpResponse {
    respond(api::seed_encode_payload(&state, &body))
}

async fn seed_decode(State(state): State<AppState>, body: String) -> HttpResponse {
    respond(api::seed_decode_payload(&state, &body).await)
}

async fn bonuses(State(state): State<AppState>, body: String) -> HttpResponse {
    respond(api::bonuses_payload(&state, &body).await)
}

async fn calculate(State(state): State<AppState>, body: String) -> HttpResponse {
    respond(api::calculate_payload(&state, &body).await)
}

fn respond(result: Result<String, ApiError>) -> HttpResponse {
    match result {
        Ok(payload) => HttpResponse::json(200, payload),
        Err(err) => error_response(err.status_code(), &err.to_string()),
    }
}

fn error_response(status_code: u16, message: &str) -> HttpResponse {
    HttpResponse::json(
        status_code,
        format!(
            "{{\n  \"status\": \"error\",\n  \"message\": {}\n}}",
            serde_json::to_string(message).unwrap_or_else(|_| "\"Unknown error\"".to_string())
        ),
    )
}
