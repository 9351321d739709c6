//! In-memory collaborators for unit and integration tests

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::gateway::{GatewayError, GatewayOrder, NewGatewayOrder, PaymentGateway};
use super::storage::{ObjectStore, StorageError};

/// Object store backed by a map
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    fail_deletes: AtomicBool,
}

impl MemoryObjectStore {
    pub fn contains(&self, key: &str) -> bool {
        self.objects.lock().unwrap().contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.objects.lock().unwrap().is_empty()
    }

    /// Subsequent deletes return an error
    pub fn fail_deletes(&self) {
        self.fail_deletes.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn upload(&self, key: &str, bytes: Vec<u8>, _content_type: &str) -> Result<String, StorageError> {
        self.objects.lock().unwrap().insert(key.to_string(), bytes);
        Ok(format!("https://cdn.test/{key}"))
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StorageError::Delete(format!("refused: {key}")));
        }
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }
}

/// Gateway that keeps orders in memory
#[derive(Default)]
pub struct FakeGateway {
    orders: Mutex<HashMap<String, GatewayOrder>>,
    next_id: AtomicU64,
}

impl FakeGateway {
    pub fn order(&self, id: &str) -> Option<GatewayOrder> {
        self.orders.lock().unwrap().get(id).cloned()
    }

    /// Seed an order as if created by `create_order`
    pub fn insert_order(&self, id: &str, tenant_id: &str, plan: &str) {
        let order = GatewayOrder {
            id: id.to_string(),
            amount: 100,
            currency: "INR".to_string(),
            notes: HashMap::from([
                ("restaurantId".to_string(), tenant_id.to_string()),
                ("plan".to_string(), plan.to_string()),
            ]),
        };
        self.orders.lock().unwrap().insert(id.to_string(), order);
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_order(&self, order: NewGatewayOrder) -> Result<GatewayOrder, GatewayError> {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let created = GatewayOrder {
            id: format!("order_test{n}"),
            amount: order.amount,
            currency: order.currency,
            notes: order.notes,
        };
        self.orders
            .lock()
            .unwrap()
            .insert(created.id.clone(), created.clone());
        Ok(created)
    }

    async fn fetch_order(&self, order_id: &str) -> Result<GatewayOrder, GatewayError> {
        self.order(order_id).ok_or_else(|| GatewayError::Rejected {
            status: 400,
            body: format!("order {order_id} does not exist"),
        })
    }
}

/// Hex HMAC-SHA256, as the gateway computes it
pub fn sign_hex(secret: &str, message: &[u8]) -> String {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(message);
    hex::encode(mac.finalize().into_bytes())
}
