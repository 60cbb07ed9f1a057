mod common;

use axum::http::{Method, StatusCode};
use common::*;
use serde_json::json;

#[tokio::test]
async fn integration_health() {
    let app = build_app(COOKIE_CONFIG).await;

    let response = send(&app, request(Method::GET, "/health", &[], None)).await;
    assert_status(&response, StatusCode::OK);
}

#[tokio::test]
async fn integration_metrics_count_session_operations() {
    let app = build_app(COOKIE_CONFIG).await;

    send(
        &app,
        request(Method::POST, "/session", &[], Some(json!({"user": "a"}))),
    )
    .await;
    send(&app, request(Method::GET, "/session", &[], None)).await;
    send(&app, request(Method::GET, "/whoami", &[], None)).await;

    let response = send(&app, request(Method::GET, "/metrics", &[], None)).await;
    assert_status(&response, StatusCode::OK);
    let content_type = response
        .headers()
        .get("Content-Type")
        .expect("content type missing")
        .to_str()
        .expect("content type not valid UTF-8")
        .to_string();
    assert!(content_type.starts_with("text/plain"));

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    let text = String::from_utf8(bytes.to_vec()).expect("metrics should be UTF-8");

    assert!(text.contains(r#"session_operations_total{operation="save",result="ok"} 1"#));
    assert!(text.contains(r#"session_operations_total{operation="load",result="empty"} 2"#));
    assert!(text.contains(
        r#"session_store_duration_seconds_count{operation="save",store="memory"} 1"#
    ));
    assert!(text.contains(r#"auth_requests_total{result="anonymous"} 1"#));
}
