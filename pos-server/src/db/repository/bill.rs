//! Bill Repository

use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use super::{BaseRepository, CountRow, RepoError, RepoResult};
use crate::db::models::{
    Bill, BillChanges, BillFilter, PaymentMethodBucket, StatusBucket,
};

const TABLE: &str = "bill";

#[derive(Clone)]
pub struct BillRepository {
    base: BaseRepository,
}

/// WHERE clause for a filter; every condition has a matching bound parameter
fn filter_clause(filter: &BillFilter) -> String {
    let mut conditions = vec!["tenant_id = $tenant_id"];
    if filter.status.is_some() {
        conditions.push("status = $status");
    }
    if filter.payment_status.is_some() {
        conditions.push("payment_status = $payment_status");
    }
    if filter.created_from.is_some() {
        conditions.push("created_at >= $created_from");
    }
    if filter.created_before.is_some() {
        conditions.push("created_at < $created_before");
    }
    if filter.min_amount.is_some() {
        conditions.push("total_amount >= $min_amount");
    }
    if filter.max_amount.is_some() {
        conditions.push("total_amount <= $max_amount");
    }
    conditions.join(" AND ")
}

impl BillRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find a bill owned by tenant
    pub async fn find_by_id(&self, tenant_id: &str, id: &RecordId) -> RepoResult<Option<Bill>> {
        let bills: Vec<Bill> = self
            .base
            .db()
            .query("SELECT * FROM $id WHERE tenant_id = $tenant_id")
            .bind(("id", id.clone()))
            .bind(("tenant_id", tenant_id.to_string()))
            .await?
            .take(0)?;
        Ok(bills.into_iter().next())
    }

    /// Filtered page, newest first, plus the total match count
    pub async fn list(
        &self,
        tenant_id: &str,
        filter: &BillFilter,
        limit: u64,
        offset: u64,
    ) -> RepoResult<(Vec<Bill>, u64)> {
        let clause = filter_clause(filter);
        let sql = format!(
            "SELECT * FROM bill WHERE {clause} ORDER BY created_at DESC LIMIT $limit START $start;\
             SELECT count() AS total FROM bill WHERE {clause} GROUP ALL;"
        );

        let mut query = self
            .base
            .db()
            .query(sql)
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("limit", limit))
            .bind(("start", offset));
        if let Some(status) = filter.status {
            query = query.bind(("status", status.as_str()));
        }
        if let Some(payment_status) = filter.payment_status {
            query = query.bind(("payment_status", payment_status.as_str()));
        }
        if let Some(from) = filter.created_from {
            query = query.bind(("created_from", from));
        }
        if let Some(before) = filter.created_before {
            query = query.bind(("created_before", before));
        }
        if let Some(min) = filter.min_amount {
            query = query.bind(("min_amount", min));
        }
        if let Some(max) = filter.max_amount {
            query = query.bind(("max_amount", max));
        }

        let mut result = query.await?;
        let bills: Vec<Bill> = result.take(0)?;
        let count: Option<CountRow> = result.take(1)?;
        let total = count.map(|c| c.total.max(0) as u64).unwrap_or(0);
        Ok((bills, total))
    }

    /// Aggregate bills created in `[from, before)`
    ///
    /// Both aggregations run under a SurrealQL `TIMEOUT`.
    pub async fn summary(
        &self,
        tenant_id: &str,
        from: i64,
        before: i64,
        timeout_ms: u64,
    ) -> RepoResult<(Vec<StatusBucket>, Vec<PaymentMethodBucket>)> {
        let sql = format!(
            "SELECT status, count() AS count, math::sum(total_amount) AS total_amount, \
                    math::mean(total_amount) AS average_amount \
             FROM bill \
             WHERE tenant_id = $tenant_id AND created_at >= $from AND created_at < $before \
             GROUP BY status TIMEOUT {timeout_ms}ms;\
             SELECT payment_method, count() AS count, math::sum(total_amount) AS total_amount \
             FROM bill \
             WHERE tenant_id = $tenant_id AND created_at >= $from AND created_at < $before \
                   AND status = 'COMPLETED' \
             GROUP BY payment_method TIMEOUT {timeout_ms}ms;"
        );

        let mut result = self
            .base
            .db()
            .query(sql)
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("from", from))
            .bind(("before", before))
            .await?;
        let by_status: Vec<StatusBucket> = result.take(0)?;
        let by_method: Vec<PaymentMethodBucket> = result.take(1)?;
        Ok((by_status, by_method))
    }

    /// Most recent ACTIVE bill for a table
    pub async fn find_active_for_table(
        &self,
        tenant_id: &str,
        table_key: &str,
    ) -> RepoResult<Option<Bill>> {
        let bills: Vec<Bill> = self
            .base
            .db()
            .query(
                "SELECT * FROM bill WHERE tenant_id = $tenant_id AND table_id = $table_id \
                 AND status = 'ACTIVE' ORDER BY created_at DESC LIMIT 1",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("table_id", table_key.to_string()))
            .await?
            .take(0)?;
        Ok(bills.into_iter().next())
    }

    /// Merge resolved changes into a bill
    pub async fn update(&self, id: &RecordId, changes: BillChanges) -> RepoResult<Bill> {
        let updated: Option<Bill> = self.base.db().update(id.clone()).merge(changes).await?;
        updated.ok_or_else(|| RepoError::NotFound(format!("Bill {} not found", id)))
    }

    /// Persist a consolidated bill and consume its held orders in one transaction
    ///
    /// Creates the bill, marks `held_ids` RESUMED and frees the table. Either all
    /// three writes commit or none do.
    pub async fn create_consolidated(
        &self,
        bill: Bill,
        held_ids: Vec<RecordId>,
        table_id: &RecordId,
    ) -> RepoResult<Bill> {
        let bill_id = RecordId::from_table_key(TABLE, uuid::Uuid::new_v4().simple().to_string());

        self.base
            .db()
            .query(
                "BEGIN TRANSACTION;\
                 CREATE $bill_id CONTENT $bill;\
                 UPDATE held_order SET status = 'RESUMED' WHERE id IN $held_ids AND status = 'HOLD';\
                 UPDATE $table_id SET status = 'Available';\
                 COMMIT TRANSACTION;",
            )
            .bind(("bill_id", bill_id.clone()))
            .bind(("bill", bill))
            .bind(("held_ids", held_ids))
            .bind(("table_id", table_id.clone()))
            .await?
            .check()?;

        let created: Option<Bill> = self.base.db().select(bill_id.clone()).await?;
        created.ok_or_else(|| RepoError::Database(format!("Bill {} missing after commit", bill_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::BillStatus;

    #[test]
    fn filter_clause_is_conjunctive() {
        let filter = BillFilter {
            status: Some(BillStatus::Completed),
            min_amount: Some(10.0),
            ..Default::default()
        };
        assert_eq!(
            filter_clause(&filter),
            "tenant_id = $tenant_id AND status = $status AND total_amount >= $min_amount"
        );
    }

    #[test]
    fn empty_filter_only_scopes_tenant() {
        assert_eq!(filter_clause(&BillFilter::default()), "tenant_id = $tenant_id");
    }
}
