//! Table Service - 桌台管理

use shared::error::ErrorCode;
use shared::models::TableStatus;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::db::models::serde_helpers::parse_record_id;
use crate::db::models::DiningTable;
use crate::db::repository::{DiningTableRepository, RepoError};
use crate::utils::{AppError, AppResult};

/// Bulk creation bounds
pub const MAX_BULK_QUANTITY: i64 = 50;

#[derive(Clone)]
pub struct TableService {
    tables: DiningTableRepository,
}

fn table_not_found() -> AppError {
    AppError::with_message(ErrorCode::TableNotFound, "Table not found")
}

fn number_exists(number: i64) -> AppError {
    AppError::with_message(
        ErrorCode::TableNumberExists,
        format!("Table number {number} already exists"),
    )
}

fn validate_number(number: i64) -> AppResult<()> {
    if number < 1 {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            "table_number must be a positive integer",
        ));
    }
    Ok(())
}

impl TableService {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            tables: DiningTableRepository::new(db),
        }
    }

    pub async fn list(&self, tenant_id: &str) -> AppResult<Vec<DiningTable>> {
        Ok(self.tables.find_all(tenant_id).await?)
    }

    pub async fn create(&self, tenant_id: &str, table_number: i64, now: i64) -> AppResult<DiningTable> {
        validate_number(table_number)?;
        let table = DiningTable {
            id: None,
            tenant_id: tenant_id.to_string(),
            table_number,
            status: TableStatus::Available,
            created_at: now,
        };
        let created = self.tables.create(table).await.map_err(|e| match e {
            RepoError::Duplicate(_) => number_exists(table_number),
            other => other.into(),
        })?;
        tracing::info!(tenant_id = %tenant_id, table_number, "Table created");
        Ok(created)
    }

    /// 批量创建 `[base, base + quantity - 1]`，全部成功或全部不创建
    ///
    /// 区间内任何已存在的桌号都会导致整体失败，错误详情
    /// `conflicting_numbers` 列出冲突桌号。
    pub async fn create_bulk(
        &self,
        tenant_id: &str,
        base_number: i64,
        quantity: i64,
        now: i64,
    ) -> AppResult<Vec<DiningTable>> {
        if !(1..=MAX_BULK_QUANTITY).contains(&quantity) {
            return Err(AppError::with_message(
                ErrorCode::ValueOutOfRange,
                format!("quantity must be between 1 and {MAX_BULK_QUANTITY}"),
            ));
        }
        validate_number(base_number)?;
        let last = base_number
            .checked_add(quantity - 1)
            .ok_or_else(|| AppError::with_message(ErrorCode::ValueOutOfRange, "table number overflow"))?;

        let conflicts = self.tables.find_numbers_in_range(tenant_id, base_number, last).await?;
        if !conflicts.is_empty() {
            return Err(AppError::with_message(
                ErrorCode::TableRangeConflict,
                "Some table numbers in this range already exist",
            )
            .with_detail("conflicting_numbers", conflicts));
        }

        let tables: Vec<DiningTable> = (base_number..=last)
            .map(|n| DiningTable {
                id: None,
                tenant_id: tenant_id.to_string(),
                table_number: n,
                status: TableStatus::Available,
                created_at: now,
            })
            .collect();

        let created = self.tables.create_many(tables).await.map_err(|e| match e {
            // 并发请求抢先插入了区间内的桌号
            RepoError::Duplicate(msg) => AppError::with_message(ErrorCode::TableRangeConflict, msg),
            other => other.into(),
        })?;
        tracing::info!(
            tenant_id = %tenant_id,
            base_number,
            quantity,
            "Tables created in bulk"
        );
        Ok(created)
    }

    /// 仅允许 `Available` / `Occupied`
    pub async fn set_status(&self, tenant_id: &str, raw_id: &str, status: &str) -> AppResult<DiningTable> {
        let status: TableStatus = status
            .parse()
            .map_err(|e: String| AppError::with_message(ErrorCode::InvalidTableStatus, e))?;
        let id = parse_record_id("dining_table", raw_id).ok_or_else(table_not_found)?;
        if self.tables.find_by_id(tenant_id, &id).await?.is_none() {
            return Err(table_not_found());
        }
        Ok(self.tables.set_status(&id, status).await?)
    }

    pub async fn delete(&self, tenant_id: &str, raw_id: &str) -> AppResult<()> {
        let id = parse_record_id("dining_table", raw_id).ok_or_else(table_not_found)?;
        if !self.tables.delete(tenant_id, &id).await? {
            return Err(table_not_found());
        }
        tracing::info!(tenant_id = %tenant_id, table = %id, "Table deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;

    const TENANT: &str = "tenant-a";

    async fn service() -> TableService {
        TableService::new(DbService::memory().await.unwrap().db)
    }

    fn numbers(tables: &[DiningTable]) -> Vec<i64> {
        tables.iter().map(|t| t.table_number).collect()
    }

    #[tokio::test]
    async fn duplicate_number_conflicts() {
        let svc = service().await;
        svc.create(TENANT, 5, 0).await.unwrap();
        let err = svc.create(TENANT, 5, 0).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::TableNumberExists);
        assert_eq!(err.http_status(), http::StatusCode::CONFLICT);

        // 其他租户可以使用相同桌号
        svc.create("tenant-b", 5, 0).await.unwrap();
    }

    #[tokio::test]
    async fn bulk_conflict_creates_nothing() {
        let svc = service().await;
        svc.create(TENANT, 12, 0).await.unwrap();

        let err = svc.create_bulk(TENANT, 10, 5, 0).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::TableRangeConflict);
        assert_eq!(err.http_status(), http::StatusCode::BAD_REQUEST);
        let details = err.details.unwrap();
        assert_eq!(details["conflicting_numbers"], serde_json::json!([12]));

        assert_eq!(numbers(&svc.list(TENANT).await.unwrap()), vec![12]);
    }

    #[tokio::test]
    async fn bulk_creates_contiguous_range() {
        let svc = service().await;
        let created = svc.create_bulk(TENANT, 1, 4, 0).await.unwrap();
        assert_eq!(numbers(&created), vec![1, 2, 3, 4]);
        assert!(created.iter().all(|t| t.status == TableStatus::Available));
    }

    #[tokio::test]
    async fn bulk_quantity_bounds() {
        let svc = service().await;
        for q in [0, 51, -3] {
            let err = svc.create_bulk(TENANT, 1, q, 0).await.unwrap_err();
            assert_eq!(err.http_status(), http::StatusCode::BAD_REQUEST);
        }
        assert_eq!(svc.create_bulk(TENANT, 100, 50, 0).await.unwrap().len(), 50);
    }

    #[tokio::test]
    async fn status_only_accepts_known_values() {
        let svc = service().await;
        let table = svc.create(TENANT, 1, 0).await.unwrap();
        let id = table.id.unwrap().to_string();

        let updated = svc.set_status(TENANT, &id, "Occupied").await.unwrap();
        assert_eq!(updated.status, TableStatus::Occupied);

        let err = svc.set_status(TENANT, &id, "Reserved").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidTableStatus);

        let err = svc.set_status("tenant-b", &id, "Available").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::TableNotFound);
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() {
        let svc = service().await;
        let table = svc.create(TENANT, 1, 0).await.unwrap();
        let id = table.id.unwrap().to_string();

        let err = svc.delete("tenant-b", &id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::TableNotFound);

        svc.delete(TENANT, &id).await.unwrap();
        let err = svc.delete(TENANT, &id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::TableNotFound);
    }
}
