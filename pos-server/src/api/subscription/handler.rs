//! Subscription API Handlers

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::HeaderMap,
};

use crate::api::extract::AppJson;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::Subscription;
use crate::services::subscription::{
    CreateOrderRequest, CreatedOrder, SubscriptionView, VerifyPaymentRequest, WebhookOutcome,
};
use crate::utils::AppResult;
use crate::utils::time::now_millis;

/// Gateway webhook signature header
pub const WEBHOOK_SIGNATURE_HEADER: &str = "x-razorpay-signature";

/// GET /api/subscription/status
pub async fn status(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<SubscriptionView>> {
    let view = state
        .subscriptions
        .status(&user.tenant_id, now_millis())
        .await?;
    Ok(Json(view))
}

/// POST /api/subscription/create-order
pub async fn create_order(
    State(state): State<ServerState>,
    user: CurrentUser,
    AppJson(payload): AppJson<CreateOrderRequest>,
) -> AppResult<Json<CreatedOrder>> {
    let order = state
        .subscriptions
        .create_order(&user.tenant_id, &payload.plan, now_millis())
        .await?;
    Ok(Json(order))
}

/// POST /api/subscription/verify-payment
pub async fn verify_payment(
    State(state): State<ServerState>,
    user: CurrentUser,
    AppJson(payload): AppJson<VerifyPaymentRequest>,
) -> AppResult<Json<Subscription>> {
    let subscription = state
        .subscriptions
        .verify_payment(&user.tenant_id, payload, now_millis())
        .await?;
    Ok(Json(subscription))
}

/// POST /api/subscription/payment-webhook
///
/// 签名基于原始请求体，所以这里不做 JSON 提取。
pub async fn payment_webhook(
    State(state): State<ServerState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<WebhookOutcome>> {
    let signature = headers
        .get(WEBHOOK_SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());
    let outcome = state
        .subscriptions
        .handle_webhook(&body, signature, now_millis())
        .await?;
    Ok(Json(outcome))
}
