//! Subscription Repository

use shared::models::SubscriptionPlan;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{PaymentRef, Subscription};

const TABLE: &str = "subscription";

#[derive(Clone)]
pub struct SubscriptionRepository {
    base: BaseRepository,
}

impl SubscriptionRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Latest subscription by end date, any status
    pub async fn find_latest(&self, tenant_id: &str) -> RepoResult<Option<Subscription>> {
        let subs: Vec<Subscription> = self
            .base
            .db()
            .query(
                "SELECT * FROM subscription WHERE tenant_id = $tenant_id \
                 ORDER BY end_date DESC LIMIT 1",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .await?
            .take(0)?;
        Ok(subs.into_iter().next())
    }

    /// Canonical active subscription (latest end date)
    pub async fn find_active(&self, tenant_id: &str) -> RepoResult<Option<Subscription>> {
        let subs: Vec<Subscription> = self
            .base
            .db()
            .query(
                "SELECT * FROM subscription WHERE tenant_id = $tenant_id AND status = 'active' \
                 ORDER BY end_date DESC LIMIT 1",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .await?
            .take(0)?;
        Ok(subs.into_iter().next())
    }

    pub async fn mark_expired(&self, id: &RecordId, now: i64) -> RepoResult<Subscription> {
        let updated: Option<Subscription> = self
            .base
            .db()
            .query("UPDATE $id SET status = 'expired', updated_at = $now RETURN AFTER")
            .bind(("id", id.clone()))
            .bind(("now", now))
            .await?
            .take(0)?;
        updated.ok_or_else(|| RepoError::NotFound(format!("Subscription {} not found", id)))
    }

    pub async fn create(&self, sub: Subscription) -> RepoResult<Subscription> {
        let created: Option<Subscription> = self.base.db().create(TABLE).content(sub).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create subscription".to_string()))
    }

    /// Overwrite plan, end date and payment references
    pub async fn extend(
        &self,
        id: &RecordId,
        plan: SubscriptionPlan,
        end_date: i64,
        payment: PaymentRef,
        now: i64,
    ) -> RepoResult<Subscription> {
        let updated: Option<Subscription> = self
            .base
            .db()
            .query(
                "UPDATE $id SET plan = $plan, end_date = $end_date, \
                 payment_order_id = $order_id, payment_id = $payment_id, \
                 payment_signature = $signature, updated_at = $now RETURN AFTER",
            )
            .bind(("id", id.clone()))
            .bind(("plan", plan.as_str()))
            .bind(("end_date", end_date))
            .bind(("order_id", payment.order_id))
            .bind(("payment_id", payment.payment_id))
            .bind(("signature", payment.signature))
            .bind(("now", now))
            .await?
            .take(0)?;
        updated.ok_or_else(|| RepoError::NotFound(format!("Subscription {} not found", id)))
    }
}
