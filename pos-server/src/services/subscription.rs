//! Subscription Service - 订阅支付与有效期合并
//!
//! 客户端确认 (verify-payment) 与网关 webhook 可能针对同一笔支付各触发一次。
//! 有效期按 `max(现有结束时间, now + 套餐时长)` 合并，重复处理不会叠加时长；
//! 套餐与支付引用字段以最后一次写入为准。

use std::collections::HashMap;
use std::sync::Arc;

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use shared::error::ErrorCode;
use shared::models::{SubscriptionPlan, SubscriptionStatus};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::gateway::{NewGatewayOrder, PaymentGateway};
use super::sequence::KeyedLocks;
use crate::core::PaymentConfig;
use crate::db::models::{PaymentRef, Subscription};
use crate::db::repository::SubscriptionRepository;
use crate::security_log;
use crate::utils::time::add_months_millis;
use crate::utils::{AppError, AppResult};

type HmacSha256 = Hmac<Sha256>;

/// Gateway receipt length limit
const MAX_RECEIPT_LEN: usize = 40;

// =============================================================================
// Signatures
// =============================================================================

fn verify_hmac_hex(secret: &str, message: &[u8], signature_hex: &str) -> bool {
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(message);
    // 常量时间比较
    match hex::decode(signature_hex.trim()) {
        Ok(sig) => mac.verify_slice(&sig).is_ok(),
        Err(_) => false,
    }
}

/// Client-side payment confirmation: HMAC-SHA256 over `order_id|payment_id`
pub fn verify_payment_signature(secret: &str, order_id: &str, payment_id: &str, signature: &str) -> bool {
    verify_hmac_hex(secret, format!("{order_id}|{payment_id}").as_bytes(), signature)
}

/// Webhook delivery: HMAC-SHA256 over the raw request body
pub fn verify_webhook_signature(secret: &str, body: &[u8], signature: &str) -> bool {
    verify_hmac_hex(secret, body, signature)
}

/// New end date never moves backwards
pub fn merge_end_date(existing: Option<i64>, computed: i64) -> i64 {
    existing.map_or(computed, |e| e.max(computed))
}

// =============================================================================
// Request / response types
// =============================================================================

/// Subscription status view
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionView {
    pub status: SubscriptionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<SubscriptionPlan>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateOrderRequest {
    pub plan: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatedOrder {
    pub order_id: String,
    pub amount: u64,
    pub currency: String,
}

/// POST /api/subscription/verify-payment
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VerifyPaymentRequest {
    #[serde(alias = "razorpayOrderId", alias = "razorpay_order_id")]
    pub order_id: String,
    #[serde(alias = "razorpayPaymentId", alias = "razorpay_payment_id")]
    pub payment_id: String,
    #[serde(alias = "razorpaySignature", alias = "razorpay_signature")]
    pub signature: String,
    pub plan: String,
}

#[derive(Debug, Deserialize)]
struct WebhookEvent {
    event: String,
    #[serde(default)]
    payload: WebhookPayload,
}

#[derive(Debug, Default, Deserialize)]
struct WebhookPayload {
    #[serde(default)]
    payment: Option<WebhookPayment>,
}

#[derive(Debug, Deserialize)]
struct WebhookPayment {
    entity: PaymentEntity,
}

#[derive(Debug, Deserialize)]
struct PaymentEntity {
    id: String,
    #[serde(default)]
    order_id: Option<String>,
}

/// Webhook processing result
#[derive(Debug, Clone, Serialize)]
pub struct WebhookOutcome {
    pub event: String,
    /// Whether the event changed subscription state
    pub applied: bool,
}

fn parse_plan(raw: &str) -> AppResult<SubscriptionPlan> {
    raw.parse::<SubscriptionPlan>()
        .map_err(|e| AppError::with_message(ErrorCode::InvalidPlan, e))
}

// =============================================================================
// SubscriptionService
// =============================================================================

#[derive(Clone)]
pub struct SubscriptionService {
    subscriptions: SubscriptionRepository,
    gateway: Arc<dyn PaymentGateway>,
    locks: Arc<KeyedLocks>,
    key_secret: String,
    webhook_secret: String,
    currency: String,
}

impl SubscriptionService {
    pub fn new(
        db: Surreal<Db>,
        gateway: Arc<dyn PaymentGateway>,
        locks: Arc<KeyedLocks>,
        config: &PaymentConfig,
    ) -> Self {
        Self {
            subscriptions: SubscriptionRepository::new(db),
            gateway,
            locks,
            key_secret: config.key_secret.clone(),
            webhook_secret: config.webhook_secret.clone(),
            currency: config.currency.clone(),
        }
    }

    /// 当前订阅状态；已过期的 active 订阅在此惰性标记为 expired
    pub async fn status(&self, tenant_id: &str, now: i64) -> AppResult<SubscriptionView> {
        let Some(sub) = self.subscriptions.find_latest(tenant_id).await? else {
            return Ok(SubscriptionView {
                status: SubscriptionStatus::Inactive,
                plan: None,
                end_date: None,
            });
        };

        let status = match sub.status {
            SubscriptionStatus::Active if sub.end_date < now => {
                if let Some(id) = &sub.id {
                    self.subscriptions.mark_expired(id, now).await?;
                }
                tracing::info!(tenant_id = %tenant_id, end_date = sub.end_date, "Subscription expired");
                SubscriptionStatus::Expired
            }
            other => other,
        };

        Ok(SubscriptionView {
            status,
            plan: Some(sub.plan),
            end_date: Some(sub.end_date),
        })
    }

    /// 在支付网关创建订单
    pub async fn create_order(&self, tenant_id: &str, plan: &str, now: i64) -> AppResult<CreatedOrder> {
        let plan = parse_plan(plan)?;
        let mut receipt = format!("subscription_{tenant_id}_{now}");
        if receipt.len() > MAX_RECEIPT_LEN {
            let mut cut = MAX_RECEIPT_LEN;
            while !receipt.is_char_boundary(cut) {
                cut -= 1;
            }
            receipt.truncate(cut);
        }

        let order = self
            .gateway
            .create_order(NewGatewayOrder {
                amount: plan.amount(),
                currency: self.currency.clone(),
                receipt,
                notes: HashMap::from([
                    ("restaurantId".to_string(), tenant_id.to_string()),
                    ("plan".to_string(), plan.as_str().to_string()),
                ]),
            })
            .await
            .map_err(|e| {
                tracing::error!(tenant_id = %tenant_id, error = %e, "Gateway order creation failed");
                AppError::gateway(e.to_string())
            })?;

        tracing::info!(tenant_id = %tenant_id, order_id = %order.id, plan = plan.as_str(), "Subscription order created");
        Ok(CreatedOrder {
            order_id: order.id,
            amount: order.amount,
            currency: order.currency,
        })
    }

    /// 客户端支付确认
    pub async fn verify_payment(
        &self,
        tenant_id: &str,
        req: VerifyPaymentRequest,
        now: i64,
    ) -> AppResult<Subscription> {
        let plan = parse_plan(&req.plan)?;
        if !verify_payment_signature(&self.key_secret, &req.order_id, &req.payment_id, &req.signature) {
            security_log!(
                "WARN",
                "payment_signature_mismatch",
                tenant_id = tenant_id.to_string(),
                order_id = req.order_id.clone()
            );
            return Err(AppError::with_message(ErrorCode::InvalidSignature, "Invalid signature"));
        }

        self.activate(
            tenant_id,
            plan,
            PaymentRef {
                order_id: Some(req.order_id),
                payment_id: Some(req.payment_id),
                signature: Some(req.signature),
            },
            now,
        )
        .await
    }

    /// 支付网关 webhook
    ///
    /// `payment.authorized` 从原订单 notes 解析租户与套餐并激活；
    /// `payment.failed` 只记录日志。
    pub async fn handle_webhook(&self, body: &[u8], signature: Option<&str>, now: i64) -> AppResult<WebhookOutcome> {
        let valid = signature.is_some_and(|sig| verify_webhook_signature(&self.webhook_secret, body, sig));
        if !valid {
            security_log!("WARN", "webhook_signature_mismatch", present = signature.is_some());
            return Err(AppError::with_message(ErrorCode::InvalidSignature, "Invalid signature"));
        }

        let event: WebhookEvent = serde_json::from_slice(body)
            .map_err(|e| AppError::with_message(ErrorCode::InvalidFormat, format!("Invalid webhook payload: {e}")))?;

        match event.event.as_str() {
            "payment.authorized" => {
                let entity = event
                    .payload
                    .payment
                    .map(|p| p.entity)
                    .ok_or_else(|| AppError::validation("Webhook payload missing payment entity"))?;
                let order_id = entity
                    .order_id
                    .ok_or_else(|| AppError::validation("Webhook payment has no order_id"))?;

                let order = self.gateway.fetch_order(&order_id).await.map_err(|e| {
                    tracing::error!(order_id = %order_id, error = %e, "Gateway order fetch failed");
                    AppError::gateway(e.to_string())
                })?;
                let tenant_id = order
                    .notes
                    .get("restaurantId")
                    .filter(|t| !t.is_empty())
                    .cloned()
                    .ok_or_else(|| AppError::validation("Order notes missing restaurantId"))?;
                let plan = match order.notes.get("plan").map(|p| p.parse::<SubscriptionPlan>()) {
                    Some(Ok(plan)) => plan,
                    _ => {
                        tracing::warn!(
                            order_id = %order_id,
                            plan = ?order.notes.get("plan"),
                            "Unknown plan in order notes, defaulting to 1-month"
                        );
                        SubscriptionPlan::OneMonth
                    }
                };

                self.activate(
                    &tenant_id,
                    plan,
                    PaymentRef {
                        order_id: Some(order_id),
                        payment_id: Some(entity.id),
                        signature: None,
                    },
                    now,
                )
                .await?;
                Ok(WebhookOutcome {
                    event: event.event,
                    applied: true,
                })
            }
            "payment.failed" => {
                let payment_id = event.payload.payment.map(|p| p.entity.id);
                tracing::warn!(payment_id = ?payment_id, "Payment failed webhook received");
                Ok(WebhookOutcome {
                    event: event.event,
                    applied: false,
                })
            }
            other => {
                tracing::debug!(event = %other, "Ignoring webhook event");
                Ok(WebhookOutcome {
                    event: event.event,
                    applied: false,
                })
            }
        }
    }

    /// 激活或延长订阅
    async fn activate(
        &self,
        tenant_id: &str,
        plan: SubscriptionPlan,
        payment: PaymentRef,
        now: i64,
    ) -> AppResult<Subscription> {
        let _guard = self.locks.lock(&format!("subscription:{tenant_id}")).await;
        let computed = add_months_millis(now, plan.months())?;

        let active = self
            .subscriptions
            .find_active(tenant_id)
            .await?
            .and_then(|s| s.id.clone().map(|id| (id, s)));

        let saved = match active {
            Some((id, existing)) => {
                let end_date = merge_end_date(Some(existing.end_date), computed);
                self.subscriptions.extend(&id, plan, end_date, payment, now).await?
            }
            None => {
                self.subscriptions
                    .create(Subscription {
                        id: None,
                        tenant_id: tenant_id.to_string(),
                        plan,
                        status: SubscriptionStatus::Active,
                        start_date: now,
                        end_date: computed,
                        payment_order_id: payment.order_id,
                        payment_id: payment.payment_id,
                        payment_signature: payment.signature,
                        created_at: now,
                        updated_at: now,
                    })
                    .await?
            }
        };

        tracing::info!(
            tenant_id = %tenant_id,
            plan = plan.as_str(),
            end_date = saved.end_date,
            "Subscription activated"
        );
        Ok(saved)
    }
}
