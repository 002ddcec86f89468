//! REST API routes

use crate::config::{Language, Preferences, Theme};
use crate::media::{LookupError, ResolvedMedia};
use crate::session::{DownloadSession, SessionError, SessionStats};
use crate::AppState;
use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

/// Create API routes
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Mock lookup
        .route("/download", get(describe_api))
        .route("/download", post(resolve_download))
        .route("/health", get(health))
        // Sessions
        .route("/sessions", post(create_session))
        .route("/sessions/stats", get(session_stats))
        .route("/sessions/{id}", get(get_session))
        .route("/sessions/{id}", delete(remove_session))
        .route("/sessions/{id}/submit", post(submit_url))
        .route("/sessions/{id}/download", post(start_download))
        .route("/sessions/{id}/reset", post(reset_session))
        // Preferences
        .route("/preferences", get(get_preferences))
        .route("/preferences", put(update_preferences))
}

// ============ Download Endpoints ============

/// Successful lookup response
#[derive(Debug, Serialize)]
pub struct DownloadResponse {
    pub success: bool,
    pub data: ResolvedMedia,
}

/// Resolve an Instagram URL to mock media metadata
///
/// The body is parsed as JSON whatever its content type. Anything that is not
/// a JSON object is a server error; a missing or non-string `url` is reported
/// as an invalid URL.
async fn resolve_download(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<DownloadResponse>, AppError> {
    let body: serde_json::Value =
        serde_json::from_slice(&body).map_err(|e| AppError::Internal(e.to_string()))?;
    let fields = body
        .as_object()
        .ok_or_else(|| AppError::Internal(format!("expected a JSON object, got {}", body)))?;
    let url = fields
        .get("url")
        .and_then(serde_json::Value::as_str)
        .unwrap_or_default();

    let media = state.catalog.resolve(url)?;

    tokio::time::sleep(state.settings.simulation.lookup_delay()).await;
    info!("Resolved {} to mock media {}", url, media.media.id);

    Ok(Json(DownloadResponse {
        success: true,
        data: media,
    }))
}

/// Describe the API
async fn describe_api() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Instagram Downloader API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "download": "POST /api/download",
            "health": "GET /api/health",
            "sessions": "POST /api/sessions",
            "preferences": "GET /api/preferences",
            "progress": "GET /ws"
        }
    }))
}

/// Health check response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_seconds: i64,
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: (Utc::now() - state.started_at).num_seconds(),
    })
}

// ============ Session Endpoints ============

/// Open a new session
async fn create_session(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<DownloadSession>) {
    (StatusCode::CREATED, Json(state.sessions.create()))
}

/// Get session statistics
async fn session_stats(State(state): State<Arc<AppState>>) -> Json<SessionStats> {
    Json(state.sessions.stats())
}

/// Get a session snapshot
async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DownloadSession>, AppError> {
    state
        .sessions
        .get(&id)
        .map(Json)
        .ok_or_else(|| SessionError::NotFound.into())
}

/// Discard a session
async fn remove_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if state.sessions.remove(&id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(SessionError::NotFound.into())
    }
}

/// Submit a URL to a session in the input view
///
/// A missing or non-string `url` goes through validation as an empty input,
/// so the caller gets the localized message.
async fn submit_url(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Json<DownloadSession>, AppError> {
    let Json(body) = payload?;
    let url = body
        .get("url")
        .and_then(serde_json::Value::as_str)
        .unwrap_or_default();

    let session = state.sessions.submit(&id, url, state.language()).await?;
    Ok(Json(session))
}

/// Start download request
#[derive(Debug, Deserialize)]
pub struct StartDownloadRequest {
    pub quality: String,
}

/// Pick a format and start the simulated download
async fn start_download(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<StartDownloadRequest>, JsonRejection>,
) -> Result<Json<DownloadSession>, AppError> {
    let Json(req) = payload?;
    let session = state.sessions.start_download(&id, &req.quality)?;
    Ok(Json(session))
}

/// Return a session to the input view
async fn reset_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DownloadSession>, AppError> {
    let session = state.sessions.reset(&id)?;
    Ok(Json(session))
}

// ============ Preferences Endpoints ============

/// Preferences response
#[derive(Debug, Serialize)]
pub struct PreferencesResponse {
    pub language: Language,
    pub theme: Theme,
    pub direction: &'static str,
}

impl From<Preferences> for PreferencesResponse {
    fn from(prefs: Preferences) -> Self {
        Self {
            language: prefs.language,
            theme: prefs.theme,
            direction: prefs.language.direction(),
        }
    }
}

/// Get current preferences
async fn get_preferences(State(state): State<Arc<AppState>>) -> Json<PreferencesResponse> {
    Json((*state.preferences.read()).into())
}

/// Update preferences request
#[derive(Debug, Deserialize)]
pub struct UpdatePreferencesRequest {
    pub language: Option<Language>,
    pub theme: Option<Theme>,
}

/// Update preferences
async fn update_preferences(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UpdatePreferencesRequest>,
) -> Result<Json<PreferencesResponse>, AppError> {
    let mut prefs = state.preferences.write();

    let mut updated = *prefs;
    if let Some(language) = req.language {
        updated.language = language;
    }
    if let Some(theme) = req.theme {
        updated.theme = theme;
    }

    // In-memory copy only changes once the store accepted it
    state.preference_store.save(&updated)?;
    *prefs = updated;

    Ok(Json(updated.into()))
}

// ============ Error Handling ============

/// Application error type
#[derive(Debug)]
pub enum AppError {
    Internal(String),
    BadRequest(String),
    NotFound(String),
    Conflict(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Internal(msg) => {
                error!("Request failed: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
        };

        let body = Json(serde_json::json!({ "error": message }));
        (status, body).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<LookupError> for AppError {
    fn from(err: LookupError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::NotFound => AppError::NotFound(err.to_string()),
            SessionError::LookupTask(_) => AppError::Internal(err.to_string()),
            SessionError::InvalidUrl(_)
            | SessionError::UnknownFormat(_)
            | SessionError::Lookup(_) => AppError::BadRequest(err.to_string()),
            SessionError::WrongPhase { .. }
            | SessionError::LookupInProgress
            | SessionError::DownloadInProgress
            | SessionError::NotDownloading => AppError::Conflict(err.to_string()),
        }
    }
}
