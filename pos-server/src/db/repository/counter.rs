//! Sequence Counter Repository
//!
//! One record per (tenant, counter name): `counter:[tenant_id, name]`.

use serde::Deserialize;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoError, RepoResult};

#[derive(Debug, Deserialize)]
struct CounterRow {
    seq: i64,
}

#[derive(Clone)]
pub struct CounterRepository {
    base: BaseRepository,
}

impl CounterRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Atomically increment and return the new value (first call returns 1)
    ///
    /// Single `UPSERT` statement: read-modify-write happens inside the datastore.
    pub async fn increment(&self, tenant_id: &str, name: &str) -> RepoResult<i64> {
        let row: Option<CounterRow> = self
            .base
            .db()
            .query(
                "UPSERT type::thing('counter', [$tenant_id, $name]) \
                 SET tenant_id = $tenant_id, name = $name, seq = (seq ?? 0) + 1 \
                 RETURN AFTER",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("name", name.to_string()))
            .await?
            .take(0)?;
        row.map(|r| r.seq)
            .ok_or_else(|| RepoError::Database(format!("Counter {} did not return a value", name)))
    }

    /// Current value without incrementing (0 when the counter does not exist)
    #[cfg(test)]
    pub async fn current(&self, tenant_id: &str, name: &str) -> RepoResult<i64> {
        let row: Option<CounterRow> = self
            .base
            .db()
            .query("SELECT seq FROM type::thing('counter', [$tenant_id, $name])")
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("name", name.to_string()))
            .await?
            .take(0)?;
        Ok(row.map(|r| r.seq).unwrap_or(0))
    }
}
