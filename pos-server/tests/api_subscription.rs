mod common;

use axum::body::Body;
use common::{TENANT, TestApp};
use http::{Method, Request, StatusCode, header};
use pos_server::services::testing::sign_hex;
use serde_json::json;

#[tokio::test]
async fn order_then_duplicate_confirmation_extends_once() {
    let app = TestApp::new().await;

    let (status, view) = app.get("/api/subscription/status", Some(TENANT)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["status"], "inactive");

    let (status, order) = app
        .json(Method::POST, "/api/subscription/create-order", Some(TENANT), json!({ "plan": "1-month" }))
        .await;
    assert_eq!(status, StatusCode::OK, "{order}");
    assert_eq!(order["amount"], 100);
    assert_eq!(order["currency"], "INR");
    let order_id = order["order_id"].as_str().unwrap().to_string();

    let secret = app.state.config.payment.key_secret.clone();
    let payload = json!({
        "razorpay_order_id": order_id,
        "razorpay_payment_id": "pay_1",
        "razorpay_signature": sign_hex(&secret, format!("{order_id}|pay_1").as_bytes()),
        "plan": "1-month",
    });

    let (status, first) = app
        .json(Method::POST, "/api/subscription/verify-payment", Some(TENANT), payload.clone())
        .await;
    assert_eq!(status, StatusCode::OK, "{first}");
    let (_, second) = app
        .json(Method::POST, "/api/subscription/verify-payment", Some(TENANT), payload)
        .await;

    // 第二次确认的 now 稍晚，结束时间最多前移几毫秒，不会叠加一个月
    let first_end = first["end_date"].as_i64().unwrap();
    let second_end = second["end_date"].as_i64().unwrap();
    assert!(second_end - first_end < 60_000);
    assert_eq!(first["id"], second["id"]);

    let (_, view) = app.get("/api/subscription/status", Some(TENANT)).await;
    assert_eq!(view["status"], "active");
    assert_eq!(view["plan"], "1-month");
}

#[tokio::test]
async fn forged_signature_changes_nothing() {
    let app = TestApp::new().await;
    let (status, err) = app
        .json(
            Method::POST,
            "/api/subscription/verify-payment",
            Some(TENANT),
            json!({
                "razorpay_order_id": "order_x",
                "razorpay_payment_id": "pay_x",
                "razorpay_signature": "00ff",
                "plan": "1-year",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["message"], "Invalid signature");

    let (_, view) = app.get("/api/subscription/status", Some(TENANT)).await;
    assert_eq!(view["status"], "inactive");

    let (status, _) = app
        .json(Method::POST, "/api/subscription/create-order", Some(TENANT), json!({ "plan": "lifetime" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn webhook_is_public_and_signed() {
    let app = TestApp::new().await;
    let (_, order) = app
        .json(Method::POST, "/api/subscription/create-order", Some(TENANT), json!({ "plan": "6-months" }))
        .await;
    let order_id = order["order_id"].as_str().unwrap();

    let body = json!({
        "event": "payment.authorized",
        "payload": { "payment": { "entity": { "id": "pay_7", "order_id": order_id } } }
    })
    .to_string();

    let send = |signature: String| {
        Request::builder()
            .method(Method::POST)
            .uri("/api/subscription/payment-webhook")
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-razorpay-signature", signature)
            .body(Body::from(body.clone()))
            .unwrap()
    };

    let (status, _) = app.send(send("deadbeef".into())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (_, view) = app.get("/api/subscription/status", Some(TENANT)).await;
    assert_eq!(view["status"], "inactive");

    let secret = app.state.config.payment.webhook_secret.clone();
    let (status, outcome) = app.send(send(sign_hex(&secret, body.as_bytes()))).await;
    assert_eq!(status, StatusCode::OK, "{outcome}");
    assert_eq!(outcome["applied"], true);

    let (_, view) = app.get("/api/subscription/status", Some(TENANT)).await;
    assert_eq!(view["status"], "active");
    assert_eq!(view["plan"], "6-months");
}
