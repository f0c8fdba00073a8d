//! End-to-end verification tests against a stubbed classification
//! endpoint: a local HTTP server stands in for the hosted model, so
//! the full image -> verify -> submit path runs without the real
//! network service.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::{Json, Router};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use greenloop_common::config::Config;
use greenloop_web::services::WasteClassifier;
use greenloop_web::{build_router, AppState};

/// Spawn a stub that answers every request the way the hosted model
/// does, with `reply_text` as the candidate text. Returns its base
/// URL.
async fn spawn_stub_classifier(reply_text: &str) -> String {
    let reply = json!({
        "candidates": [{
            "content": { "parts": [{ "text": reply_text }] }
        }]
    });

    let app = Router::new().fallback(move || async move { Json(reply) });
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

async fn test_app_state(classifier_base_url: &str) -> AppState {
    let db_pool = sqlx::SqlitePool::connect(":memory:").await.unwrap();
    greenloop_web::db::init_tables(&db_pool).await.unwrap();

    let config = Config {
        port: 0,
        database_path: ":memory:".into(),
        classifier_api_key: None,
        places_api_key: None,
    };

    let classifier = WasteClassifier::new("test-key".to_string())
        .unwrap()
        .with_base_url(classifier_base_url);

    AppState::new(db_pool, &config)
        .unwrap()
        .with_classifier(classifier)
}

async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

/// Open a session and attach an image, returning the session id
async fn session_with_image(app: &Router) -> String {
    let (_, session) = post_json(
        app.clone(),
        "/api/session",
        json!({"email": "a@example.com"}),
    )
    .await;
    let session_id = session["session_id"].as_str().unwrap().to_string();

    let (status, _) = post_json(
        app.clone(),
        "/api/report/image",
        json!({
            "session_id": session_id,
            "image": "data:image/jpeg;base64,aGVsbG8=",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    session_id
}

#[tokio::test]
async fn valid_reply_verifies_and_submits() {
    let base_url =
        spawn_stub_classifier(r#"{"wasteType":"plastic","quantity":"2.5 kg","confidence":0.95}"#)
            .await;
    let app = build_router(test_app_state(&base_url).await);

    let session_id = session_with_image(&app).await;

    let (status, body) = post_json(
        app.clone(),
        "/api/report/verify",
        json!({"session_id": session_id}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["result"]["wasteType"], "plastic");
    assert_eq!(body["result"]["quantity"], "2.5 kg");
    assert_eq!(body["result"]["confidence"], 0.95);

    // The verified draft submits
    let (status, body) = post_json(
        app,
        "/api/report/submit",
        json!({"session_id": session_id, "location": "5th Avenue"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["report"]["waste_type"], "plastic");
    assert_eq!(body["report"]["amount"], "2.5 kg");
}

#[tokio::test]
async fn fenced_reply_verifies_like_unfenced() {
    let base_url = spawn_stub_classifier(
        "```json\n{\"wasteType\":\"metal\",\"quantity\":\"3 kg\",\"confidence\":0.8}\n```",
    )
    .await;
    let app = build_router(test_app_state(&base_url).await);

    let session_id = session_with_image(&app).await;

    let (status, body) = post_json(
        app,
        "/api/report/verify",
        json!({"session_id": session_id}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["result"]["wasteType"], "metal");
    assert_eq!(body["result"]["quantity"], "3 kg");
}

#[tokio::test]
async fn invalid_waste_type_fails_verification_and_blocks_submit() {
    let base_url =
        spawn_stub_classifier(r#"{"wasteType":"rubber","quantity":"1 kg","confidence":0.5}"#)
            .await;
    let app = build_router(test_app_state(&base_url).await);

    let session_id = session_with_image(&app).await;

    let (status, body) = post_json(
        app.clone(),
        "/api/report/verify",
        json!({"session_id": session_id}),
    )
    .await;

    // A failed verification is a domain outcome, not a transport error
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "failure");
    assert!(body["error"].as_str().unwrap().contains("rubber"));
    assert!(body.get("result").is_none() || body["result"].is_null());

    // The submission gate holds
    let (status, _) = post_json(
        app,
        "/api/report/submit",
        json!({"session_id": session_id, "location": "5th Avenue"}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn verify_without_image_is_rejected() {
    let base_url =
        spawn_stub_classifier(r#"{"wasteType":"plastic","quantity":"1 kg","confidence":0.9}"#)
            .await;
    let app = build_router(test_app_state(&base_url).await);

    let (_, session) = post_json(
        app.clone(),
        "/api/session",
        json!({"email": "a@example.com"}),
    )
    .await;
    let session_id = session["session_id"].as_str().unwrap().to_string();

    let (status, _) = post_json(
        app,
        "/api/report/verify",
        json!({"session_id": session_id}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}
