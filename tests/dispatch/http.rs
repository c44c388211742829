//! HTTP gateway integration tests.
//!
//! Starts an axum server and exercises it with reqwest.

use std::sync::Arc;

use serde_json::{json, Value};

use microplum::client;
use microplum::RpcClient;

use crate::support::{client as test_client, widget_service, WidgetStore};

/// Bind to port 0 and return the actual address.
async fn start_server(client: RpcClient) -> String {
    let app = client::router(Arc::new(client));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

async fn gateway() -> String {
    let (client, _transport) = test_client();
    widget_service(&client, &WidgetStore::seeded());
    start_server(client).await
}

#[tokio::test]
async fn health_lists_listen_pins() {
    let base = gateway().await;
    let resp = reqwest::get(format!("{base}/health")).await.unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["ok"], true);
    assert_eq!(
        body["listening"],
        json!(["cmd:*,environment:production,role:widget,version:v1"])
    );
}

#[tokio::test]
async fn act_returns_unwrapped_data() {
    let base = gateway().await;
    let resp = reqwest::Client::new()
        .post(format!("{base}/act"))
        .json(&json!({ "role": "widget", "cmd": "find", "id": "w1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["name"], "sprocket");
}

#[tokio::test]
async fn classified_failure_uses_its_status() {
    let base = gateway().await;
    let resp = reqwest::Client::new()
        .post(format!("{base}/act"))
        .json(&json!({ "role": "widget", "cmd": "launch" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 405);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "not_allowed");
    assert_eq!(body["error"]["message"], "Service not found.");
}

#[tokio::test]
async fn headers_become_the_caller() {
    let base = gateway().await;
    let resp = reqwest::Client::new()
        .post(format!("{base}/act"))
        .header("x-user-id", "user-42")
        .json(&json!({ "role": "widget", "cmd": "create", "input": { "id": "w8", "name": "pin" } }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["owner"], "user-42");
}

#[tokio::test]
async fn guest_cannot_remove() {
    let base = gateway().await;
    let resp = reqwest::Client::new()
        .post(format!("{base}/act"))
        .header("x-user-id", "guest")
        .json(&json!({ "role": "widget", "cmd": "remove", "id": "w1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 405);
}

#[tokio::test]
async fn transport_failure_is_bad_gateway() {
    let base = gateway().await;
    let resp = reqwest::Client::new()
        .post(format!("{base}/act"))
        .json(&json!({ "role": "ghost", "cmd": "find" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 502);
}

#[tokio::test]
async fn descriptor_without_cmd_is_bad_request() {
    let base = gateway().await;
    let resp = reqwest::Client::new()
        .post(format!("{base}/act"))
        .json(&json!({ "role": "widget" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}
