//! Payment gateway client (Razorpay Orders REST API, no SDK dependency)

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::PaymentConfig;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Gateway request failed: {0}")]
    Request(String),

    #[error("Gateway rejected request ({status}): {body}")]
    Rejected { status: u16, body: String },
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        GatewayError::Request(err.to_string())
    }
}

/// Order creation request
#[derive(Debug, Clone, Serialize)]
pub struct NewGatewayOrder {
    pub amount: u64,
    pub currency: String,
    pub receipt: String,
    pub notes: HashMap<String, String>,
}

/// Gateway order as returned by create / fetch
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    pub amount: u64,
    pub currency: String,
    #[serde(default, deserialize_with = "notes_map")]
    pub notes: HashMap<String, String>,
}

/// Razorpay returns `notes` as `[]` when empty
fn notes_map<'de, D>(d: D) -> Result<HashMap<String, String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Notes {
        Map(HashMap<String, serde_json::Value>),
        Other(serde_json::Value),
    }

    Ok(match Notes::deserialize(d)? {
        Notes::Map(m) => m
            .into_iter()
            .map(|(k, v)| {
                let v = match v {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                };
                (k, v)
            })
            .collect(),
        Notes::Other(_) => HashMap::new(),
    })
}

/// Payment gateway collaborator
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_order(&self, order: NewGatewayOrder) -> Result<GatewayOrder, GatewayError>;

    async fn fetch_order(&self, order_id: &str) -> Result<GatewayOrder, GatewayError>;
}

pub struct RazorpayGateway {
    client: reqwest::Client,
    api_base: String,
    key_id: String,
    key_secret: String,
}

impl RazorpayGateway {
    pub fn new(config: &PaymentConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            key_id: config.key_id.clone(),
            key_secret: config.key_secret.clone(),
        }
    }

    async fn parse(resp: reqwest::Response) -> Result<GatewayOrder, GatewayError> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp.json().await?)
    }
}

#[async_trait]
impl PaymentGateway for RazorpayGateway {
    async fn create_order(&self, order: NewGatewayOrder) -> Result<GatewayOrder, GatewayError> {
        let resp = self
            .client
            .post(format!("{}/orders", self.api_base))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&order)
            .send()
            .await?;
        Self::parse(resp).await
    }

    async fn fetch_order(&self, order_id: &str) -> Result<GatewayOrder, GatewayError> {
        let resp = self
            .client
            .get(format!("{}/orders/{}", self.api_base, order_id))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .send()
            .await?;
        Self::parse(resp).await
    }
}
