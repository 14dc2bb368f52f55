use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use lumina_admin::config::ServerConfig;
use lumina_admin::server::{app, ServerState};

fn state() -> ServerState {
    ServerState::with_sample(ServerConfig::local("smoke-secret"))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn health_reports_seeded_resources() {
    let (status, body) = send(app(state()), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], "ok");
    assert!(body["resources"].as_u64().unwrap() >= 27);
}

#[tokio::test]
async fn lists_nested_collections() {
    let (status, body) = send(app(state()), get("/api/payment/transactions")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(5));

    let (status, body) = send(app(state()), get("/api/orders/ord-1003")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["customer"]["name"], "Sofia Marin");
}

#[tokio::test]
async fn unknown_resources_are_404() {
    let (status, body) = send(app(state()), get("/api/warehouses")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "error");

    let (status, _) = send(app(state()), get("/api/orders/ord-9999")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_patch_and_delete_round_trip() {
    let state = state();
    let mut events = state.events.subscribe();

    let (status, created) = send(
        app(state.clone()),
        json_request(
            "POST",
            "/api/orders",
            json!({"order_number": "LUM-2001", "total": 55.0, "status": "pending"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(events.recv().await.unwrap().event, "order_created");

    let (status, patched) = send(
        app(state.clone()),
        json_request("PATCH", &format!("/api/orders/{id}"), json!({"status": "shipped"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["status"], "shipped");
    assert_eq!(patched["order_number"], "LUM-2001");
    assert_eq!(events.recv().await.unwrap().event, "order_updated");

    let (status, body) = send(
        app(state.clone()),
        Request::builder()
            .method("DELETE")
            .uri(format!("/api/orders/{id}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok", "id": id}));
    assert_eq!(state.store.list_records("orders").unwrap().len(), 5);
}

#[tokio::test]
async fn bulk_patch_announces_orders_updated() {
    let state = state();
    let mut events = state.events.subscribe();
    let (status, body) = send(
        app(state.clone()),
        json_request(
            "PATCH",
            "/api/orders",
            json!({"ids": ["ord-1002", "ord-1004"], "changes": {"status": "shipped"}}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(2));
    let frame = events.recv().await.unwrap();
    assert_eq!(frame.event, "orders_updated");
}

#[tokio::test]
async fn malformed_bodies_are_rejected() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/orders")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(app(state()), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn refunds_settle_transactions() {
    let state = state();
    let (status, body) = send(
        app(state.clone()),
        json_request(
            "POST",
            "/api/payment/transactions/txn-1/refund",
            json!({"amount": 28.4, "reason": "Damaged jar"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "partially_refunded");
    assert_eq!(body["refund_reason"], "Damaged jar");

    let (status, body) = send(
        app(state.clone()),
        json_request("POST", "/api/payment/transactions/txn-1/refund", json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "refunded");

    let (status, _) = send(
        app(state),
        json_request("POST", "/api/payment/transactions/txn-1/refund", json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_issues_token_accepted_by_me() {
    let state = state();
    let (status, session) = send(
        app(state.clone()),
        json_request(
            "POST",
            "/api/auth/login",
            json!({"email": "ops@lumina.shop", "password": "hunter2"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = session["token"].as_str().unwrap();
    assert_eq!(session["operator"]["email"], "ops@lumina.shop");

    let request = Request::builder()
        .uri("/api/auth/me")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let (status, operator) = send(app(state.clone()), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(operator["name"], "ops");

    let (status, _) = send(app(state), get("/api/auth/me")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_checks_configured_password() {
    let mut config = ServerConfig::local("smoke-secret");
    config.admin_password = Some("correct horse".into());
    let state = ServerState::with_sample(config);

    let (status, _) = send(
        app(state.clone()),
        json_request("POST", "/api/auth/login", json!({"email": "ops@lumina.shop", "password": "wrong"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        app(state),
        json_request("POST", "/api/auth/login", json!({"email": "not-an-email", "password": ""})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn upload_accepts_multipart_file() {
    let boundary = "lumina-boundary";
    let body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"serum demo.mp4\"\r\nContent-Type: video/mp4\r\n\r\nfake-bytes\r\n--{boundary}--\r\n"
    );
    let request = Request::builder()
        .method("POST")
        .uri("/api/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();
    let state = state();
    let (status, receipt) = send(app(state.clone()), request).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(receipt["filename"].as_str().unwrap().ends_with("serum_demo.mp4"));
    assert_eq!(state.store.uploads().len(), 1);
}
