//! Subscription API 模块
//!
//! `payment-webhook` 为公共路由，由 HMAC 签名保护。

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/subscription", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/status", get(handler::status))
        .route("/create-order", post(handler::create_order))
        .route("/verify-payment", post(handler::verify_payment))
        .route("/payment-webhook", post(handler::payment_webhook))
}
