//! HTTP surface tests (router + handlers, no real printer)

use axum::body::Body;
use axum::http::{Request, StatusCode};
use hmac::{Hmac, Mac};
use http_body_util::BodyExt;
use sha2::Sha256;
use tower::ServiceExt;

use balcao_server::api;
use balcao_server::config::Config;
use balcao_server::state::AppState;

const SECRET: &str = "integration_test_secret";

fn test_state(secret: Option<&str>) -> AppState {
    AppState::new(&Config {
        http_port: 3420,
        default_printer: None,
        webhook_secret: secret.map(String::from),
        webhook_tolerance_secs: 300,
        spooler_timeout_ms: 1_000,
        environment: "development".into(),
    })
}

fn sign(data_id: &str, request_id: &str, ts: i64) -> String {
    let manifest = format!("id:{data_id};request-id:{request_id};ts:{ts};");
    let mut mac = Hmac::<Sha256>::new_from_slice(SECRET.as_bytes()).unwrap();
    mac.update(manifest.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

fn webhook_request(data_id: &str, signature_header: &str) -> Request<Body> {
    let body = serde_json::json!({
        "type": "payment",
        "data": { "id": data_id }
    });
    Request::builder()
        .method("POST")
        .uri("/webhook/mercadopago")
        .header("content-type", "application/json")
        .header("x-signature", signature_header)
        .header("x-request-id", "req-1")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_answers_ok() {
    let app = api::create_router(test_state(Some(SECRET)));
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
    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "balcao-server");
}

#[tokio::test]
async fn webhook_accepts_valid_signature() {
    let app = api::create_router(test_state(Some(SECRET)));
    let ts = chrono::Utc::now().timestamp();
    let v1 = sign("12345", "req-1", ts);
    let response = app
        .oneshot(webhook_request("12345", &format!("ts={ts},v1={v1}")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["ok"], true);
    assert_eq!(body["dataId"], "12345");
    assert_eq!(body["type"], "payment");
}

#[tokio::test]
async fn webhook_rejects_bad_signature() {
    let app = api::create_router(test_state(Some(SECRET)));
    let ts = chrono::Utc::now().timestamp();
    let response = app
        .oneshot(webhook_request(
            "12345",
            &format!("ts={ts},v1={}", "0".repeat(64)),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(body["ok"], false);
}

#[tokio::test]
async fn webhook_rejects_stale_timestamp() {
    let app = api::create_router(test_state(Some(SECRET)));
    let ts = chrono::Utc::now().timestamp() - 301;
    let v1 = sign("12345", "req-1", ts);
    let response = app
        .oneshot(webhook_request("12345", &format!("ts={ts},v1={v1}")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn webhook_rejects_missing_signature_header() {
    let app = api::create_router(test_state(Some(SECRET)));
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/webhook/mercadopago")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"data":{"id":"1"}}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn webhook_rejects_missing_request_id_header() {
    // a signature over the request-id-less manifest is still a reject
    let app = api::create_router(test_state(Some(SECRET)));
    let ts = chrono::Utc::now().timestamp();
    let manifest = format!("id:12345;ts:{ts};");
    let mut mac = Hmac::<Sha256>::new_from_slice(SECRET.as_bytes()).unwrap();
    mac.update(manifest.as_bytes());
    let v1 = hex::encode(mac.finalize().into_bytes());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/webhook/mercadopago")
                .header("content-type", "application/json")
                .header("x-signature", format!("ts={ts},v1={v1}"))
                .body(Body::from(r#"{"type":"payment","data":{"id":"12345"}}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn webhook_rejects_body_without_data_id() {
    let app = api::create_router(test_state(Some(SECRET)));
    let ts = chrono::Utc::now().timestamp();
    let manifest = format!("request-id:req-1;ts:{ts};");
    let mut mac = Hmac::<Sha256>::new_from_slice(SECRET.as_bytes()).unwrap();
    mac.update(manifest.as_bytes());
    let v1 = hex::encode(mac.finalize().into_bytes());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/webhook/mercadopago")
                .header("content-type", "application/json")
                .header("x-signature", format!("ts={ts},v1={v1}"))
                .header("x-request-id", "req-1")
                .body(Body::from(r#"{"type":"payment"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn webhook_without_secret_is_a_server_error() {
    let app = api::create_router(test_state(None));
    let ts = chrono::Utc::now().timestamp();
    let v1 = sign("12345", "req-1", ts);
    let response = app
        .oneshot(webhook_request("12345", &format!("ts={ts},v1={v1}")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn printers_endpoint_answers() {
    // Off Windows the list is empty but the endpoint still works;
    // on Windows it reflects the installed printers.
    let app = api::create_router(test_state(Some(SECRET)));
    let response = app
        .oneshot(
            Request::builder()
                .uri("/printers")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["ok"], true);
    assert!(body["printers"].is_array());
}
