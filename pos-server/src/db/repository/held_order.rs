//! Held Order Repository

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::HeldOrder;

const TABLE: &str = "held_order";

#[derive(Clone)]
pub struct HeldOrderRepository {
    base: BaseRepository,
}

impl HeldOrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// HOLD orders of a table, oldest first
    pub async fn find_holding(&self, tenant_id: &str, table_key: &str) -> RepoResult<Vec<HeldOrder>> {
        let orders: Vec<HeldOrder> = self
            .base
            .db()
            .query(
                "SELECT * FROM held_order WHERE tenant_id = $tenant_id AND table_id = $table_id \
                 AND status = 'HOLD' ORDER BY created_at ASC, id ASC",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("table_id", table_key.to_string()))
            .await?
            .take(0)?;
        Ok(orders)
    }

    /// Create a held order
    pub async fn create(&self, order: HeldOrder) -> RepoResult<HeldOrder> {
        let created: Option<HeldOrder> = self.base.db().create(TABLE).content(order).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create held order".to_string()))
    }
}
