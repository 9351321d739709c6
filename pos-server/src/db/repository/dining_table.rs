//! Dining Table Repository

use serde::Deserialize;
use shared::models::TableStatus;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::DiningTable;

const TABLE: &str = "dining_table";

#[derive(Debug, Deserialize)]
struct NumberRow {
    table_number: i64,
}

#[derive(Clone)]
pub struct DiningTableRepository {
    base: BaseRepository,
}

impl DiningTableRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// All tables of a tenant, by number
    pub async fn find_all(&self, tenant_id: &str) -> RepoResult<Vec<DiningTable>> {
        let tables: Vec<DiningTable> = self
            .base
            .db()
            .query("SELECT * FROM dining_table WHERE tenant_id = $tenant_id ORDER BY table_number")
            .bind(("tenant_id", tenant_id.to_string()))
            .await?
            .take(0)?;
        Ok(tables)
    }

    /// Find table by id, scoped to tenant
    pub async fn find_by_id(&self, tenant_id: &str, id: &RecordId) -> RepoResult<Option<DiningTable>> {
        let tables: Vec<DiningTable> = self
            .base
            .db()
            .query("SELECT * FROM $id WHERE tenant_id = $tenant_id")
            .bind(("id", id.clone()))
            .bind(("tenant_id", tenant_id.to_string()))
            .await?
            .take(0)?;
        Ok(tables.into_iter().next())
    }

    /// Existing table numbers within `[low, high]`
    pub async fn find_numbers_in_range(
        &self,
        tenant_id: &str,
        low: i64,
        high: i64,
    ) -> RepoResult<Vec<i64>> {
        let rows: Vec<NumberRow> = self
            .base
            .db()
            .query(
                "SELECT table_number FROM dining_table WHERE tenant_id = $tenant_id \
                 AND table_number >= $low AND table_number <= $high ORDER BY table_number",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("low", low))
            .bind(("high", high))
            .await?
            .take(0)?;
        Ok(rows.into_iter().map(|r| r.table_number).collect())
    }

    /// Create a single table
    ///
    /// The UNIQUE (tenant_id, table_number) index turns a race into `Duplicate`.
    pub async fn create(&self, table: DiningTable) -> RepoResult<DiningTable> {
        if !self
            .find_numbers_in_range(&table.tenant_id, table.table_number, table.table_number)
            .await?
            .is_empty()
        {
            return Err(RepoError::Duplicate(format!(
                "Table number {} already exists",
                table.table_number
            )));
        }

        let created: Option<DiningTable> = self.base.db().create(TABLE).content(table).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create dining table".to_string()))
    }

    /// Insert all tables or none
    pub async fn create_many(&self, tables: Vec<DiningTable>) -> RepoResult<Vec<DiningTable>> {
        let Some(first) = tables.first() else {
            return Ok(Vec::new());
        };
        let tenant_id = first.tenant_id.clone();
        let low = tables.iter().map(|t| t.table_number).min().unwrap_or_default();
        let high = tables.iter().map(|t| t.table_number).max().unwrap_or_default();

        self.base
            .db()
            .query("BEGIN TRANSACTION; INSERT INTO dining_table $tables; COMMIT TRANSACTION;")
            .bind(("tables", tables))
            .await?
            .check()?;

        let created: Vec<DiningTable> = self
            .base
            .db()
            .query(
                "SELECT * FROM dining_table WHERE tenant_id = $tenant_id \
                 AND table_number >= $low AND table_number <= $high ORDER BY table_number",
            )
            .bind(("tenant_id", tenant_id))
            .bind(("low", low))
            .bind(("high", high))
            .await?
            .take(0)?;
        Ok(created)
    }

    /// Set table status
    pub async fn set_status(&self, id: &RecordId, status: TableStatus) -> RepoResult<DiningTable> {
        let updated: Option<DiningTable> = self
            .base
            .db()
            .query("UPDATE $id SET status = $status RETURN AFTER")
            .bind(("id", id.clone()))
            .bind(("status", status.as_str()))
            .await?
            .take(0)?;
        updated.ok_or_else(|| RepoError::NotFound(format!("Dining table {} not found", id)))
    }

    /// Hard delete; `false` when no such table for the tenant
    pub async fn delete(&self, tenant_id: &str, id: &RecordId) -> RepoResult<bool> {
        let deleted: Vec<DiningTable> = self
            .base
            .db()
            .query("DELETE $id WHERE tenant_id = $tenant_id RETURN BEFORE")
            .bind(("id", id.clone()))
            .bind(("tenant_id", tenant_id.to_string()))
            .await?
            .take(0)?;
        Ok(!deleted.is_empty())
    }
}
