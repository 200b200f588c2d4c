//! HTTP surface tests: the axum router driven with `tower::ServiceExt`.

#![cfg(feature = "axum-integration")]

mod common;

use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use common::{body, service_with, test_config};
use serde_json::{Value, json};
use tower::ServiceExt;
use url2pdf_api::factory::mock::MockBrowserFactory;
use url2pdf_api::integrations::axum::{MAX_BODY_BYTES, router};

fn app(factory: &MockBrowserFactory, origins: &[&str]) -> axum::Router {
    let (service, _store) = service_with(factory, &test_config());
    router(
        Arc::new(service),
        origins.iter().map(|o| o.to_string()).collect(),
    )
}

fn post_print(payload: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/print")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_status_endpoint() {
    let app = app(&MockBrowserFactory::new(), &["*"]);

    let response = app
        .oneshot(Request::get("/status").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({ "status": true }));
}

#[tokio::test]
async fn test_print_ok() {
    let app = app(&MockBrowserFactory::new(), &["*"]);

    let response = app
        .oneshot(post_print(body("https://example.com", "out.pdf")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/json"
    );
    let body = json_body(response).await;
    assert!(body["url"].as_str().unwrap().ends_with("/out.pdf"));
}

#[tokio::test]
async fn test_print_bad_request() {
    let factory = MockBrowserFactory::new();
    let app = app(&factory, &["*"]);

    let response = app
        .oneshot(post_print(br#"{"url":"ftp://example.com","file_name":"out.pdf"}"#.to_vec()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert!(body["message"].as_str().unwrap().contains("http"));
    assert_eq!(factory.creation_count(), 0);
}

#[tokio::test]
async fn test_malformed_json() {
    let app = app(&MockBrowserFactory::new(), &["*"]);

    let response = app
        .oneshot(post_print(b"{not json".to_vec()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(response).await["message"].is_string());
}

#[tokio::test]
async fn test_oversized_body_gets_json_error() {
    let factory = MockBrowserFactory::new();
    let app = app(&factory, &["*"]);

    let mut payload = body("https://example.com", "out.pdf");
    payload.extend(std::iter::repeat_n(b' ', MAX_BODY_BYTES + 6 * 1024));

    let response = app.oneshot(post_print(payload)).await.unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/json"
    );
    assert!(json_body(response).await["message"].is_string());
    assert_eq!(factory.creation_count(), 0);
}

#[tokio::test]
async fn test_out_of_range_scale_is_rejected() {
    let factory = MockBrowserFactory::new();
    let app = app(&factory, &["*"]);

    for scale in ["5", "0.05"] {
        let payload = format!(
            r#"{{"url":"https://example.com","file_name":"out.pdf","scale":{}}}"#,
            scale
        );
        let response = app
            .clone()
            .oneshot(post_print(payload.into_bytes()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "scale {}", scale);
        let message = json_body(response).await["message"].as_str().unwrap().to_string();
        assert!(message.contains("scale"), "{}", message);
    }
    assert_eq!(factory.creation_count(), 0);
}

#[tokio::test]
async fn test_print_server_error_is_generic() {
    let app = app(&MockBrowserFactory::always_fails("chrome not found at /opt"), &["*"]);

    let response = app
        .oneshot(post_print(body("https://example.com", "out.pdf")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(response).await, json!({ "message": "render failed" }));
}

#[tokio::test]
async fn test_wildcard_origin_header() {
    let app = app(&MockBrowserFactory::new(), &["*"]);

    let response = app
        .oneshot(
            Request::get("/status")
                .header(header::ORIGIN, "https://anywhere.example")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}

#[tokio::test]
async fn test_listed_origin_is_echoed() {
    let app = app(&MockBrowserFactory::new(), &["https://app.example.com"]);

    let response = app
        .clone()
        .oneshot(
            Request::get("/status")
                .header(header::ORIGIN, "https://app.example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "https://app.example.com"
    );
    assert_eq!(response.headers()[header::VARY], "origin");

    let response = app
        .oneshot(
            Request::get("/status")
                .header(header::ORIGIN, "https://evil.example")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none()
    );
}
