//! HTTP server & routing integration tests

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use greenloop_common::config::Config;
use greenloop_web::{build_router, AppState};

/// Create test app state with in-memory database and no API keys
async fn test_app_state() -> AppState {
    let db_pool = sqlx::SqlitePool::connect(":memory:").await.unwrap();
    greenloop_web::db::init_tables(&db_pool).await.unwrap();

    let config = Config {
        port: 0,
        database_path: ":memory:".into(),
        classifier_api_key: None,
        places_api_key: None,
    };

    AppState::new(db_pool, &config).unwrap()
}

#[tokio::test]
async fn home_page_serves_html() {
    let app = build_router(test_app_state().await);

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers().get("content-type").unwrap();
    assert!(content_type.to_str().unwrap().contains("text/html"));
}

#[tokio::test]
async fn report_page_serves_html() {
    let app = build_router(test_app_state().await);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/report")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let html = String::from_utf8(body.to_vec()).unwrap();
    assert!(html.contains("Report waste"));
    assert!(html.contains("Recent Reports"));
}

#[tokio::test]
async fn login_page_serves_html() {
    let app = build_router(test_app_state().await);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/login")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn unimplemented_nav_pages_are_404() {
    let app = build_router(test_app_state().await);

    for uri in ["/collect", "/rewards", "/leaderboard"] {
        let response = app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);
    }
}

#[tokio::test]
async fn health_reports_ok() {
    let app = build_router(test_app_state().await);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["module"], "greenloop-web");
}

#[tokio::test]
async fn verify_without_classifier_key_is_unavailable() {
    let app = build_router(test_app_state().await);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/report/verify")
                .header("content-type", "application/json")
                .body(Body::from(format!(
                    r#"{{"session_id":"{}"}}"#,
                    uuid::Uuid::new_v4()
                )))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn places_without_key_is_unavailable() {
    let app = build_router(test_app_state().await);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/places/search?query=5th+Avenue")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}
