use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use insta_downloader::config::{
    Language, MemoryPreferenceStore, PreferenceStore, Preferences, Settings, Theme,
};
use insta_downloader::{server, AppState};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tokio::time::{self, Instant};
use tower::ServiceExt;

const URL: &str = "https://instagram.com/p/ABC123/";

fn app() -> (Router, Arc<AppState>) {
    let state = Arc::new(
        AppState::new(Settings::default(), Box::new(MemoryPreferenceStore::new()))
            .expect("state"),
    );
    (server::router(Arc::clone(&state)), state)
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_empty(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn new_session(router: &Router) -> String {
    let (status, body) = send(router, post_empty("/api/sessions")).await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

// ============ /api/download ============

#[tokio::test(start_paused = true)]
async fn download_returns_mock_media_after_delay() {
    let (router, _) = app();
    let started = Instant::now();

    let (status, body) = send(&router, post_json("/api/download", json!({ "url": URL }))).await;

    assert_eq!(status, StatusCode::OK);
    assert!(started.elapsed() >= Duration::from_millis(1000));
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["id"], "ABC123");
    assert_eq!(body["data"]["originalUrl"], URL);
    assert_eq!(body["data"]["type"], "video");
    assert_eq!(body["data"]["author"], "@sample_user");
    assert_eq!(body["data"]["formats"].as_array().unwrap().len(), 4);
}

#[tokio::test(start_paused = true)]
async fn download_echoes_reel_id() {
    let (router, _) = app();
    let url = "https://instagram.com/reel/xyz_9-8/?x=1";

    let (status, body) = send(&router, post_json("/api/download", json!({ "url": url }))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], "xyz_9-8");
    assert_eq!(body["data"]["originalUrl"], url);
}

#[tokio::test]
async fn download_rejects_bad_urls() {
    let (router, _) = app();

    for payload in [
        json!({ "url": "ftp://instagram.com/p/ABC" }),
        json!({ "url": "" }),
        json!({ "url": 42 }),
        json!({}),
    ] {
        let (status, body) = send(&router, post_json("/api/download", payload.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{payload}");
        assert_eq!(body, json!({ "error": "Invalid Instagram URL" }));
    }
}

#[tokio::test]
async fn download_with_unparseable_body_is_internal_error() {
    let (router, _) = app();
    let request = Request::builder()
        .method("POST")
        .uri("/api/download")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, body) = send(&router, request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Internal server error" }));
}

#[tokio::test(start_paused = true)]
async fn download_parses_body_without_content_type() {
    let (router, _) = app();
    let request = Request::builder()
        .method("POST")
        .uri("/api/download")
        .body(Body::from(json!({ "url": URL }).to_string()))
        .unwrap();

    let (status, body) = send(&router, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], "ABC123");
}

#[tokio::test]
async fn download_with_non_object_body_is_internal_error() {
    let (router, _) = app();

    for payload in [Value::Null, json!([URL]), json!(URL)] {
        let (status, body) = send(&router, post_json("/api/download", payload.clone())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{payload}");
        assert_eq!(body, json!({ "error": "Internal server error" }));
    }
}

#[tokio::test]
async fn describes_the_api() {
    let (router, _) = app();

    let (status, body) = send(&router, get("/api/download")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Instagram Downloader API");
    assert_eq!(body["version"], "1.0.0");
    assert_eq!(body["endpoints"]["download"], "POST /api/download");
    assert_eq!(body["endpoints"]["health"], "GET /api/health");
}

#[tokio::test]
async fn health_reports_ok() {
    let (router, _) = app();

    let (status, body) = send(&router, get("/api/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["uptimeSeconds"].as_i64().unwrap() >= 0);
}

// ============ Sessions ============

#[tokio::test(start_paused = true)]
async fn session_walks_input_preview_downloading() {
    let (router, _) = app();
    let id = new_session(&router).await;

    let (status, body) = send(&router, get(&format!("/api/sessions/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["phase"], "input");

    let (status, body) = send(
        &router,
        post_json(&format!("/api/sessions/{id}/submit"), json!({ "url": URL })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["phase"], "preview");
    assert_eq!(body["loading"], false);
    assert_eq!(body["media"]["id"], "ABC123");
    assert_eq!(body["media"]["originalUrl"], URL);

    let (status, body) = send(
        &router,
        post_json(&format!("/api/sessions/{id}/download"), json!({ "quality": "720p" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["phase"], "downloading");
    assert_eq!(body["progress"], 0);
    assert_eq!(body["status"], "downloading");
    assert_eq!(body["fileName"], "instagram_ABC123_720p.mp4");

    let (status, _) = send(&router, post_empty(&format!("/api/sessions/{id}/reset"))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    time::sleep(Duration::from_millis(3100)).await;

    let (_, body) = send(&router, get(&format!("/api/sessions/{id}"))).await;
    assert_eq!(body["progress"], 100);
    assert_eq!(body["status"], "completed");

    let (status, body) = send(&router, post_empty(&format!("/api/sessions/{id}/reset"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["phase"], "input");
    assert_eq!(body["media"], Value::Null);
    assert_eq!(body["progress"], 0);
}

#[tokio::test]
async fn invalid_submission_stays_in_input() {
    let (router, _) = app();
    let id = new_session(&router).await;

    let (status, body) = send(
        &router,
        post_json(
            &format!("/api/sessions/{id}/submit"),
            json!({ "url": "https://example.com/p/ABC" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Please enter a valid Instagram URL");

    let (_, body) = send(&router, get(&format!("/api/sessions/{id}"))).await;
    assert_eq!(body["phase"], "input");
    assert_eq!(body["error"], "Please enter a valid Instagram URL");
}

#[tokio::test]
async fn submission_without_url_gets_localized_message() {
    let (router, _) = app();
    let id = new_session(&router).await;

    for payload in [json!({}), json!({ "url": 7 })] {
        let (status, body) = send(
            &router,
            post_json(&format!("/api/sessions/{id}/submit"), payload.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{payload}");
        assert_eq!(body["error"], "Please enter a valid Instagram URL");
    }

    let request = Request::builder()
        .method("POST")
        .uri(format!("/api/sessions/{id}/submit"))
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test(start_paused = true)]
async fn download_request_without_quality_is_bad_request() {
    let (router, _) = app();
    let id = new_session(&router).await;
    send(
        &router,
        post_json(&format!("/api/sessions/{id}/submit"), json!({ "url": URL })),
    )
    .await;

    let (status, body) = send(
        &router,
        post_json(&format!("/api/sessions/{id}/download"), json!({})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("quality"));

    let (_, body) = send(&router, get(&format!("/api/sessions/{id}"))).await;
    assert_eq!(body["phase"], "preview");
}

#[tokio::test(start_paused = true)]
async fn format_selection_errors() {
    let (router, _) = app();
    let id = new_session(&router).await;

    let (status, _) = send(
        &router,
        post_json(&format!("/api/sessions/{id}/download"), json!({ "quality": "720p" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    send(
        &router,
        post_json(&format!("/api/sessions/{id}/submit"), json!({ "url": URL })),
    )
    .await;

    let (status, body) = send(
        &router,
        post_json(&format!("/api/sessions/{id}/download"), json!({ "quality": "8K" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Unknown format: 8K");
}

#[tokio::test]
async fn unknown_sessions_are_not_found() {
    let (router, _) = app();

    let (status, body) = send(&router, get("/api/sessions/nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Session not found");

    let request = Request::builder()
        .method("DELETE")
        .uri("/api/sessions/nope")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&router, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn sessions_can_be_discarded_and_counted() {
    let (router, _) = app();
    let first = new_session(&router).await;
    new_session(&router).await;

    let (_, body) = send(&router, get("/api/sessions/stats")).await;
    assert_eq!(body, json!({ "sessions": 2, "active": 0 }));

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/api/sessions/{first}"))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&router, request).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = send(&router, get("/api/sessions/stats")).await;
    assert_eq!(body["sessions"], 1);
}

// ============ Preferences ============

#[tokio::test]
async fn preferences_update_and_localize_messages() {
    let (router, state) = app();

    let (status, body) = send(&router, get("/api/preferences")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "language": "en", "theme": "light", "direction": "ltr" }));

    let request = Request::builder()
        .method("PUT")
        .uri("/api/preferences")
        .header("content-type", "application/json")
        .body(Body::from(json!({ "language": "ar" }).to_string()))
        .unwrap();
    let (status, body) = send(&router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "language": "ar", "theme": "light", "direction": "rtl" }));
    assert_eq!(state.language(), Language::Ar);

    let id = new_session(&router).await;
    let (status, body) = send(
        &router,
        post_json(&format!("/api/sessions/{id}/submit"), json!({ "url": "nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], Language::Ar.invalid_url_message());
}

#[tokio::test]
async fn preferences_are_saved_through_the_store() {
    let store = Arc::new(MemoryPreferenceStore::new());

    struct Shared(Arc<MemoryPreferenceStore>);
    impl PreferenceStore for Shared {
        fn load(&self) -> anyhow::Result<Preferences> {
            self.0.load()
        }
        fn save(&self, prefs: &Preferences) -> anyhow::Result<()> {
            self.0.save(prefs)
        }
    }

    let state = Arc::new(
        AppState::new(Settings::default(), Box::new(Shared(Arc::clone(&store)))).unwrap(),
    );
    let router = server::router(state);

    let request = Request::builder()
        .method("PUT")
        .uri("/api/preferences")
        .header("content-type", "application/json")
        .body(Body::from(json!({ "theme": "dark" }).to_string()))
        .unwrap();
    let (status, _) = send(&router, request).await;

    assert_eq!(status, StatusCode::OK);
    let saved = store.stored().expect("saved");
    assert_eq!(saved.theme, Theme::Dark);
    assert_eq!(saved.language, Language::En);
}
