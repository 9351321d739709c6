//! Billing Service - 挂单结账、账单查询与修改
//!
//! 结账 (consolidation) 将桌台上所有 HOLD 挂单合并为一张已支付账单：
//!
//! 1. 加载 HOLD 挂单 (按创建时间升序)
//! 2. 合并行项目，累加小计与两项税额
//! 3. 折扣率与支付方式取第一张挂单
//! 4. 分配账单号，单事务写入账单 / 挂单 RESUMED / 桌台 Available

use std::sync::Arc;

use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::error::ErrorCode;
use shared::models::{BillStatus, HeldOrderStatus, PaymentMethod, PaymentStatus, TableStatus};
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use super::sequence::{BILL_NUMBER_COUNTER, KeyedLocks, SequenceService};
use crate::db::models::serde_helpers::{parse_record_id, record_key};
use crate::db::models::{
    Bill, BillChanges, BillFilter, BillPatch, DiningTable, HeldOrder, HeldOrderCreate, LineItem,
    PaymentMethodBucket, StatusBucket,
};
use crate::db::repository::{BillRepository, DiningTableRepository, HeldOrderRepository};
use crate::utils::money::{self, Totals, to_decimal, to_f64};
use crate::utils::time::{day_end_millis, day_start_millis, parse_date};
use crate::utils::types::{Page, Pagination};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, validate_optional_text, validate_percentage, validate_price,
    validate_quantity, validate_required_text,
};
use crate::utils::{AppError, AppResult};

/// Separator between held-order name labels on a bill
const NAMES_SEPARATOR: &str = " | ";

// =============================================================================
// Query types
// =============================================================================

/// GET /api/bills query string
///
/// 金额与分页参数无法解析时忽略；日期无法解析时忽略。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BillListQuery {
    pub status: Option<String>,
    #[serde(alias = "paymentStatus")]
    pub payment_status: Option<String>,
    #[serde(alias = "startDate")]
    pub start_date: Option<String>,
    #[serde(alias = "endDate")]
    pub end_date: Option<String>,
    #[serde(alias = "minAmount")]
    pub min_amount: Option<String>,
    #[serde(alias = "maxAmount")]
    pub max_amount: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl BillListQuery {
    /// Resolve into a filter; dates are interpreted in `tz`, end date inclusive
    pub fn to_filter(&self, tz: Tz) -> AppResult<BillFilter> {
        let status = self
            .status
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.parse::<BillStatus>().map_err(AppError::validation))
            .transpose()?;
        let payment_status = self
            .payment_status
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.parse::<PaymentStatus>().map_err(AppError::validation))
            .transpose()?;

        let date = |raw: &Option<String>| raw.as_deref().and_then(|s| parse_date(s, tz).ok());
        let amount = |raw: &Option<String>| {
            raw.as_deref()
                .and_then(|s| s.trim().parse::<f64>().ok())
                .filter(|v| v.is_finite())
        };

        Ok(BillFilter {
            status,
            payment_status,
            created_from: date(&self.start_date).map(|d| day_start_millis(d, tz)),
            created_before: date(&self.end_date).map(|d| day_end_millis(d, tz)),
            min_amount: amount(&self.min_amount),
            max_amount: amount(&self.max_amount),
        })
    }

    pub fn pagination(&self) -> Pagination {
        let num = |raw: &Option<String>| raw.as_deref().and_then(|s| s.trim().parse::<u32>().ok());
        Pagination::new(num(&self.page), num(&self.limit))
    }
}

/// GET /api/bills/summary query string
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SummaryQuery {
    #[serde(alias = "startDate")]
    pub start_date: Option<String>,
    #[serde(alias = "endDate")]
    pub end_date: Option<String>,
}

/// Resolved summary date range (inclusive dates)
#[derive(Debug, Clone, Serialize)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

/// Summary response
#[derive(Debug, Clone, Serialize)]
pub struct BillSummary {
    pub bills_summary: Vec<StatusBucket>,
    pub payment_summary: Vec<PaymentMethodBucket>,
    pub date_range: DateRange,
}

// =============================================================================
// BillingService
// =============================================================================

#[derive(Clone)]
pub struct BillingService {
    bills: BillRepository,
    held_orders: HeldOrderRepository,
    tables: DiningTableRepository,
    sequence: SequenceService,
    locks: Arc<KeyedLocks>,
    timezone: Tz,
    summary_timeout_ms: u64,
}

fn bill_not_found() -> AppError {
    AppError::with_message(ErrorCode::BillNotFound, "Bill not found")
}

fn table_not_found() -> AppError {
    AppError::with_message(ErrorCode::TableNotFound, "Table not found")
}

fn parse_payment_method(raw: &str) -> AppResult<PaymentMethod> {
    raw.parse::<PaymentMethod>().map_err(|_| {
        AppError::with_message(
            ErrorCode::PaymentInvalidMethod,
            format!("Invalid payment method: {raw}. Expected one of CASH, CARD, UPI, OTHER"),
        )
    })
}

fn validate_items(items: &[LineItem]) -> AppResult<()> {
    for item in items {
        validate_required_text(&item.item, "item", MAX_NAME_LEN)?;
        validate_quantity(item.quantity, "quantity")?;
        validate_price(item.price, "price")?;
    }
    Ok(())
}

/// Merge held orders into bill fields (items, totals, discount, method, names)
///
/// Orders are taken in the given order; the first supplies discount and payment hint.
fn merge_held_orders(orders: &[HeldOrder]) -> (Vec<LineItem>, Totals, Decimal, PaymentMethod, String) {
    let items: Vec<LineItem> = orders.iter().flat_map(|o| o.items.iter().cloned()).collect();

    let subtotal: Decimal = orders.iter().map(|o| to_decimal(o.subtotal)).sum();
    let tax_a: Decimal = orders.iter().map(|o| to_decimal(o.tax_a)).sum();
    let tax_b: Decimal = orders.iter().map(|o| to_decimal(o.tax_b)).sum();

    let first = orders.first();
    let discount_pct = first
        .map(|o| to_decimal(o.discount_percentage))
        .unwrap_or(Decimal::ZERO);
    let hint = first.and_then(|o| o.payment_mode.as_deref());
    let method = match hint.map(str::parse::<PaymentMethod>) {
        Some(Ok(m)) => m,
        _ => {
            tracing::warn!(hint = ?hint, "Unrecognized payment hint on held order, recording OTHER");
            PaymentMethod::Other
        }
    };

    let names = orders
        .iter()
        .filter_map(|o| o.names.as_deref())
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .collect::<Vec<_>>()
        .join(NAMES_SEPARATOR);

    let totals = Totals::compute(subtotal, tax_a, tax_b, discount_pct);
    (items, totals, discount_pct, method, names)
}

impl BillingService {
    pub fn new(
        db: Surreal<Db>,
        locks: Arc<KeyedLocks>,
        timezone: Tz,
        summary_timeout_ms: u64,
    ) -> Self {
        Self {
            bills: BillRepository::new(db.clone()),
            held_orders: HeldOrderRepository::new(db.clone()),
            tables: DiningTableRepository::new(db.clone()),
            sequence: SequenceService::new(db, locks.clone()),
            locks,
            timezone,
            summary_timeout_ms,
        }
    }

    async fn load_table(&self, tenant_id: &str, raw_id: &str) -> AppResult<(RecordId, DiningTable)> {
        let id = parse_record_id("dining_table", raw_id).ok_or_else(table_not_found)?;
        let table = self
            .tables
            .find_by_id(tenant_id, &id)
            .await?
            .ok_or_else(table_not_found)?;
        Ok((id, table))
    }

    async fn load_bill(&self, tenant_id: &str, raw_id: &str) -> AppResult<(RecordId, Bill)> {
        let id = parse_record_id("bill", raw_id).ok_or_else(bill_not_found)?;
        let bill = self
            .bills
            .find_by_id(tenant_id, &id)
            .await?
            .ok_or_else(bill_not_found)?;
        Ok((id, bill))
    }

    // ========== Consolidation ==========

    /// 结账: 合并桌台所有 HOLD 挂单为一张已支付账单
    pub async fn consolidate(&self, tenant_id: &str, raw_table_id: &str, now: i64) -> AppResult<Bill> {
        let (table_id, table) = self.load_table(tenant_id, raw_table_id).await?;
        let table_key = record_key(&table_id);

        // 同一桌台的结账串行执行，避免同一组挂单被合并两次
        let _guard = self
            .locks
            .lock(&format!("consolidate:{tenant_id}:{table_key}"))
            .await;

        let held = self.held_orders.find_holding(tenant_id, &table_key).await?;
        if held.is_empty() {
            return Err(AppError::with_message(
                ErrorCode::HeldOrderNotFound,
                "No held orders found for this table",
            ));
        }

        let (items, totals, discount_pct, method, names) = merge_held_orders(&held);
        let held_ids: Vec<RecordId> = held.iter().filter_map(|o| o.id.clone()).collect();

        let bill_number = self
            .sequence
            .next_sequence(tenant_id, BILL_NUMBER_COUNTER)
            .await?;

        let bill = Bill {
            id: None,
            bill_number,
            tenant_id: tenant_id.to_string(),
            table_id: table_key,
            table_number: table.table_number,
            items,
            subtotal: to_f64(totals.subtotal),
            tax_a: to_f64(totals.tax_a),
            tax_b: to_f64(totals.tax_b),
            discount_percentage: to_f64(discount_pct),
            discount_amount: to_f64(totals.discount_amount),
            total_amount: to_f64(totals.total_amount),
            status: BillStatus::Completed,
            payment_status: PaymentStatus::Paid,
            payment_method: Some(method),
            names,
            created_at: now,
            updated_at: now,
        };

        let created = self
            .bills
            .create_consolidated(bill, held_ids, &table_id)
            .await
            .inspect_err(|e| {
                tracing::error!(
                    tenant_id = %tenant_id,
                    bill_number,
                    error = %e,
                    "Consolidation rolled back; bill number burned"
                );
            })?;

        tracing::info!(
            tenant_id = %tenant_id,
            table_number = table.table_number,
            bill_number,
            held_orders = held.len(),
            total_amount = created.total_amount,
            "Bill consolidated"
        );
        Ok(created)
    }

    // ========== Held orders ==========

    /// 新建挂单，桌台置为 Occupied
    pub async fn create_held_order(
        &self,
        tenant_id: &str,
        raw_table_id: &str,
        payload: HeldOrderCreate,
        now: i64,
    ) -> AppResult<HeldOrder> {
        let (table_id, _) = self.load_table(tenant_id, raw_table_id).await?;

        if payload.items.is_empty() {
            return Err(AppError::new(ErrorCode::HeldOrderEmpty));
        }
        validate_items(&payload.items)?;
        validate_optional_text(&payload.names, "names", MAX_NOTE_LEN)?;
        validate_optional_text(&payload.payment_mode, "payment_mode", MAX_NAME_LEN)?;
        let discount_pct = payload.discount_percentage.unwrap_or(0.0);
        validate_percentage(discount_pct, "discount_percentage")?;
        for (value, field) in [
            (payload.subtotal, "subtotal"),
            (payload.tax_a, "tax_a"),
            (payload.tax_b, "tax_b"),
        ] {
            if let Some(v) = value {
                validate_price(v, field)?;
            }
        }

        // 未提供金额时按 5% / 5% 税率计算
        let subtotal = payload
            .subtotal
            .map(to_decimal)
            .unwrap_or_else(|| money::line_subtotal(payload.items.iter().map(|i| (i.price, i.quantity))));
        let default_tax = money::round(subtotal * money::TAX_COMPONENT_RATE);
        let tax_a = payload.tax_a.map(to_decimal).unwrap_or(default_tax);
        let tax_b = payload.tax_b.map(to_decimal).unwrap_or(default_tax);

        let order = HeldOrder {
            id: None,
            tenant_id: tenant_id.to_string(),
            table_id: record_key(&table_id),
            items: payload.items,
            subtotal: to_f64(subtotal),
            tax_a: to_f64(tax_a),
            tax_b: to_f64(tax_b),
            discount_percentage: discount_pct,
            payment_mode: payload.payment_mode,
            status: HeldOrderStatus::Hold,
            names: payload.names,
            created_at: now,
        };

        let created = self.held_orders.create(order).await?;
        self.tables.set_status(&table_id, TableStatus::Occupied).await?;
        tracing::debug!(tenant_id = %tenant_id, table = %table_id, "Held order created");
        Ok(created)
    }

    pub async fn list_held_orders(&self, tenant_id: &str, raw_table_id: &str) -> AppResult<Vec<HeldOrder>> {
        let (table_id, _) = self.load_table(tenant_id, raw_table_id).await?;
        Ok(self
            .held_orders
            .find_holding(tenant_id, &record_key(&table_id))
            .await?)
    }

    // ========== Queries ==========

    pub async fn list(&self, tenant_id: &str, query: &BillListQuery) -> AppResult<Page<Bill>> {
        let filter = query.to_filter(self.timezone)?;
        let pagination = query.pagination();
        let (items, total) = self
            .bills
            .list(tenant_id, &filter, u64::from(pagination.limit), pagination.offset())
            .await?;
        Ok(Page {
            items,
            total,
            page: pagination.page,
            total_pages: pagination.total_pages(total),
        })
    }

    /// 汇总: 按状态分组 + 已完成账单按支付方式分组
    pub async fn summary(&self, tenant_id: &str, query: &SummaryQuery) -> AppResult<BillSummary> {
        let (Some(start), Some(end)) = (query.start_date.as_deref(), query.end_date.as_deref()) else {
            return Err(AppError::with_message(
                ErrorCode::RequiredField,
                "start_date and end_date are required",
            ));
        };
        let start = parse_date(start, self.timezone)?;
        let end = parse_date(end, self.timezone)?;
        if end < start {
            return Err(AppError::validation("end_date must not be before start_date"));
        }

        let (mut by_status, mut by_method) = self
            .bills
            .summary(
                tenant_id,
                day_start_millis(start, self.timezone),
                day_end_millis(end, self.timezone),
                self.summary_timeout_ms,
            )
            .await?;

        for b in &mut by_status {
            b.total_amount = to_f64(to_decimal(b.total_amount));
            b.average_amount = to_f64(to_decimal(b.average_amount));
        }
        for b in &mut by_method {
            b.total_amount = to_f64(to_decimal(b.total_amount));
        }

        Ok(BillSummary {
            bills_summary: by_status,
            payment_summary: by_method,
            date_range: DateRange {
                start: start.format("%Y-%m-%d").to_string(),
                end: end.format("%Y-%m-%d").to_string(),
            },
        })
    }

    pub async fn get(&self, tenant_id: &str, raw_id: &str) -> AppResult<Bill> {
        Ok(self.load_bill(tenant_id, raw_id).await?.1)
    }

    /// 桌台当前 ACTIVE 账单
    pub async fn active_bill(&self, tenant_id: &str, raw_table_id: &str) -> AppResult<Bill> {
        let (table_id, _) = self.load_table(tenant_id, raw_table_id).await?;
        self.bills
            .find_active_for_table(tenant_id, &record_key(&table_id))
            .await?
            .ok_or_else(|| AppError::with_message(ErrorCode::BillNotFound, "No active bill for this table"))
    }

    // ========== Updates ==========

    /// 部分更新
    ///
    /// - `items` 变化时按 5% / 5% 重算全部金额 (折扣率取补丁值或原值)
    /// - 仅折扣率变化时基于原小计与税额重算折扣与总额
    /// - 设置 `payment_method` 会同时将账单置为 PAID / COMPLETED
    pub async fn update(&self, tenant_id: &str, raw_id: &str, patch: BillPatch, now: i64) -> AppResult<Bill> {
        if let Some(items) = &patch.items {
            validate_items(items)?;
        }
        if let Some(pct) = patch.discount_percentage {
            validate_percentage(pct, "discount_percentage")?;
        }
        validate_optional_text(&patch.names, "names", MAX_NOTE_LEN)?;
        let method = patch.payment_method.as_deref().map(parse_payment_method).transpose()?;

        let (id, bill) = self.load_bill(tenant_id, raw_id).await?;
        let discount_pct = to_decimal(patch.discount_percentage.unwrap_or(bill.discount_percentage));

        let mut changes = BillChanges {
            updated_at: now,
            names: patch.names,
            ..Default::default()
        };

        let totals = match patch.items {
            Some(items) => {
                let totals = Totals::from_lines(items.iter().map(|i| (i.price, i.quantity)), discount_pct);
                changes.items = Some(items);
                Some(totals)
            }
            None if patch.discount_percentage.is_some() => Some(Totals::compute(
                to_decimal(bill.subtotal),
                to_decimal(bill.tax_a),
                to_decimal(bill.tax_b),
                discount_pct,
            )),
            None => None,
        };
        if let Some(t) = totals {
            changes.subtotal = Some(to_f64(t.subtotal));
            changes.tax_a = Some(to_f64(t.tax_a));
            changes.tax_b = Some(to_f64(t.tax_b));
            changes.discount_amount = Some(to_f64(t.discount_amount));
            changes.total_amount = Some(to_f64(t.total_amount));
            changes.discount_percentage = Some(to_f64(discount_pct));
        }

        if let Some(method) = method {
            changes.payment_method = Some(method);
            changes.payment_status = Some(PaymentStatus::Paid);
            changes.status = Some(BillStatus::Completed);
        }

        let updated = self.bills.update(&id, changes).await?;
        tracing::info!(tenant_id = %tenant_id, bill_number = updated.bill_number, "Bill updated");
        Ok(updated)
    }

    /// 设置支付方式，账单置为 PAID / COMPLETED
    pub async fn set_payment_method(
        &self,
        tenant_id: &str,
        raw_id: &str,
        method: &str,
        now: i64,
    ) -> AppResult<Bill> {
        let method = parse_payment_method(method)?;
        let (id, _) = self.load_bill(tenant_id, raw_id).await?;
        let changes = BillChanges {
            payment_method: Some(method),
            payment_status: Some(PaymentStatus::Paid),
            status: Some(BillStatus::Completed),
            updated_at: now,
            ..Default::default()
        };
        let updated = self.bills.update(&id, changes).await?;
        tracing::info!(
            tenant_id = %tenant_id,
            bill_number = updated.bill_number,
            payment_method = %method,
            "Bill payment method set"
        );
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;

    const TENANT: &str = "tenant-a";
    const NOW: i64 = 1_700_000_000_000;

    struct Fixture {
        service: BillingService,
        tables: DiningTableRepository,
        held: HeldOrderRepository,
        bills: BillRepository,
    }

    async fn fixture() -> Fixture {
        crate::utils::logger::init_test_logger();
        let db = DbService::memory().await.unwrap().db;
        Fixture {
            service: BillingService::new(db.clone(), Arc::new(KeyedLocks::new()), Tz::UTC, 10_000),
            tables: DiningTableRepository::new(db.clone()),
            held: HeldOrderRepository::new(db.clone()),
            bills: BillRepository::new(db),
        }
    }

    async fn table(f: &Fixture, number: i64) -> String {
        let created = f
            .tables
            .create(DiningTable {
                id: None,
                tenant_id: TENANT.into(),
                table_number: number,
                status: TableStatus::Occupied,
                created_at: NOW,
            })
            .await
            .unwrap();
        created.id.unwrap().to_string()
    }

    fn held_order(table_key: &str, created_at: i64, pct: f64, mode: Option<&str>, names: Option<&str>) -> HeldOrder {
        HeldOrder {
            id: None,
            tenant_id: TENANT.into(),
            table_id: table_key.into(),
            items: vec![LineItem {
                item: format!("dish-{created_at}"),
                quantity: 1,
                price: 50.0,
            }],
            subtotal: 50.0,
            tax_a: 2.5,
            tax_b: 2.5,
            discount_percentage: pct,
            payment_mode: mode.map(String::from),
            status: HeldOrderStatus::Hold,
            names: names.map(String::from),
            created_at,
        }
    }

    fn key_of(id: &str) -> String {
        record_key(&parse_record_id("dining_table", id).unwrap())
    }

    #[tokio::test]
    async fn consolidation_sums_and_discounts() {
        let f = fixture().await;
        let table_id = table(&f, 7).await;
        let key = key_of(&table_id);
        // 插入顺序与创建时间相反，验证按 created_at 排序
        f.held.create(held_order(&key, NOW + 10, 0.0, Some("card"), Some("Bob"))).await.unwrap();
        f.held.create(held_order(&key, NOW, 10.0, Some("upi"), Some("Alice"))).await.unwrap();

        let bill = f.service.consolidate(TENANT, &table_id, NOW + 20).await.unwrap();

        assert_eq!(bill.bill_number, 1);
        assert_eq!(bill.subtotal, 100.0);
        assert_eq!(bill.tax_a, 5.0);
        assert_eq!(bill.tax_b, 5.0);
        assert_eq!(bill.discount_percentage, 10.0);
        assert_eq!(bill.discount_amount, 11.0);
        assert_eq!(bill.total_amount, 99.0);
        assert_eq!(bill.status, BillStatus::Completed);
        assert_eq!(bill.payment_status, PaymentStatus::Paid);
        assert_eq!(bill.payment_method, Some(PaymentMethod::Upi));
        assert_eq!(bill.names, "Alice | Bob");
        assert_eq!(bill.table_number, 7);
        let items: Vec<_> = bill.items.iter().map(|i| i.item.clone()).collect();
        assert_eq!(items, vec![format!("dish-{NOW}"), format!("dish-{}", NOW + 10)]);

        // 挂单全部消耗，桌台释放
        assert!(f.held.find_holding(TENANT, &key).await.unwrap().is_empty());
        let id = parse_record_id("dining_table", &table_id).unwrap();
        let t = f.tables.find_by_id(TENANT, &id).await.unwrap().unwrap();
        assert_eq!(t.status, TableStatus::Available);
    }

    #[tokio::test]
    async fn consolidation_without_held_orders_is_not_found() {
        let f = fixture().await;
        let table_id = table(&f, 3).await;

        let err = f.service.consolidate(TENANT, &table_id, NOW).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::HeldOrderNotFound);
        assert_eq!(err.http_status(), http::StatusCode::NOT_FOUND);

        let (bills, total) = f.bills.list(TENANT, &BillFilter::default(), 10, 0).await.unwrap();
        assert!(bills.is_empty());
        assert_eq!(total, 0);
    }

    #[tokio::test]
    async fn consolidation_of_unknown_table_is_not_found() {
        let f = fixture().await;
        let err = f.service.consolidate(TENANT, "dining_table:missing", NOW).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::TableNotFound);
    }

    #[tokio::test]
    async fn other_tenant_cannot_consolidate() {
        let f = fixture().await;
        let table_id = table(&f, 1).await;
        f.held
            .create(held_order(&key_of(&table_id), NOW, 0.0, None, None))
            .await
            .unwrap();
        let err = f.service.consolidate("tenant-b", &table_id, NOW).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::TableNotFound);
    }

    #[tokio::test]
    async fn unknown_payment_hint_becomes_other_and_numbers_increase() {
        let f = fixture().await;
        let table_id = table(&f, 2).await;
        let key = key_of(&table_id);

        f.held.create(held_order(&key, NOW, 0.0, Some("wallet"), None)).await.unwrap();
        let first = f.service.consolidate(TENANT, &table_id, NOW).await.unwrap();
        assert_eq!(first.payment_method, Some(PaymentMethod::Other));
        assert_eq!(first.names, "");

        f.held.create(held_order(&key, NOW + 1, 0.0, None, None)).await.unwrap();
        let second = f.service.consolidate(TENANT, &table_id, NOW + 2).await.unwrap();
        assert_eq!(second.bill_number, first.bill_number + 1);
    }

    #[tokio::test]
    async fn held_order_totals_default_to_five_percent_taxes() {
        let f = fixture().await;
        let table_id = table(&f, 4).await;
        let order = f
            .service
            .create_held_order(
                TENANT,
                &table_id,
                HeldOrderCreate {
                    items: vec![LineItem {
                        item: "Paneer".into(),
                        quantity: 2,
                        price: 100.0,
                    }],
                    subtotal: None,
                    tax_a: None,
                    tax_b: None,
                    discount_percentage: None,
                    payment_mode: Some("cash".into()),
                    names: None,
                },
                NOW,
            )
            .await
            .unwrap();
        assert_eq!(order.subtotal, 200.0);
        assert_eq!(order.tax_a, 10.0);
        assert_eq!(order.tax_b, 10.0);
        assert_eq!(order.status, HeldOrderStatus::Hold);
    }

    #[tokio::test]
    async fn empty_held_order_is_rejected() {
        let f = fixture().await;
        let table_id = table(&f, 5).await;
        let err = f
            .service
            .create_held_order(
                TENANT,
                &table_id,
                HeldOrderCreate {
                    items: vec![],
                    subtotal: None,
                    tax_a: None,
                    tax_b: None,
                    discount_percentage: None,
                    payment_mode: None,
                    names: None,
                },
                NOW,
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::HeldOrderEmpty);
    }

    async fn consolidated_bill(f: &Fixture) -> Bill {
        let table_id = table(f, 9).await;
        f.held
            .create(held_order(&key_of(&table_id), NOW, 0.0, Some("cash"), None))
            .await
            .unwrap();
        f.service.consolidate(TENANT, &table_id, NOW).await.unwrap()
    }

    #[tokio::test]
    async fn update_with_items_recomputes_totals() {
        let f = fixture().await;
        let bill = consolidated_bill(&f).await;
        let id = bill.id.unwrap().to_string();

        let patch = BillPatch {
            items: Some(vec![LineItem {
                item: "Thali".into(),
                quantity: 2,
                price: 50.0,
            }]),
            discount_percentage: Some(10.0),
            ..Default::default()
        };
        let updated = f.service.update(TENANT, &id, patch, NOW + 1).await.unwrap();
        assert_eq!(updated.subtotal, 100.0);
        assert_eq!(updated.tax_a, 5.0);
        assert_eq!(updated.tax_b, 5.0);
        assert_eq!(updated.discount_amount, 11.0);
        assert_eq!(updated.total_amount, 99.0);
        assert_eq!(updated.bill_number, bill.bill_number);
    }

    #[tokio::test]
    async fn update_rejects_invalid_payment_method() {
        let f = fixture().await;
        let bill = consolidated_bill(&f).await;
        let id = bill.id.unwrap().to_string();
        let patch = BillPatch {
            payment_method: Some("CHEQUE".into()),
            ..Default::default()
        };
        let err = f.service.update(TENANT, &id, patch, NOW).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::PaymentInvalidMethod);
    }

    #[tokio::test]
    async fn set_payment_method_marks_paid() {
        let f = fixture().await;
        let bill = consolidated_bill(&f).await;
        let id = bill.id.unwrap().to_string();
        let updated = f.service.set_payment_method(TENANT, &id, "card", NOW).await.unwrap();
        assert_eq!(updated.payment_method, Some(PaymentMethod::Card));
        assert_eq!(updated.payment_status, PaymentStatus::Paid);
        assert_eq!(updated.status, BillStatus::Completed);

        let err = f.service.set_payment_method(TENANT, &id, "barter", NOW).await.unwrap_err();
        assert_eq!(err.http_status(), http::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn update_of_missing_bill_is_not_found() {
        let f = fixture().await;
        let err = f
            .service
            .update(TENANT, "bill:nope", BillPatch::default(), NOW)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::BillNotFound);
    }

    #[tokio::test]
    async fn list_filters_and_paginates() {
        let f = fixture().await;
        for n in 0..3 {
            let table_id = table(&f, 20 + n).await;
            f.held
                .create(held_order(&key_of(&table_id), NOW, 0.0, None, None))
                .await
                .unwrap();
            f.service.consolidate(TENANT, &table_id, NOW + n).await.unwrap();
        }

        let query = BillListQuery {
            limit: Some("2".into()),
            min_amount: Some("abc".into()),
            ..Default::default()
        };
        let page = f.service.list(TENANT, &query).await.unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.items.len(), 2);
        // 最新的在前
        assert!(page.items[0].created_at >= page.items[1].created_at);

        let query = BillListQuery {
            min_amount: Some("1000".into()),
            ..Default::default()
        };
        assert_eq!(f.service.list(TENANT, &query).await.unwrap().total, 0);
    }

    #[tokio::test]
    async fn summary_requires_valid_dates() {
        let f = fixture().await;
        let err = f.service.summary(TENANT, &SummaryQuery::default()).await.unwrap_err();
        assert_eq!(err.http_status(), http::StatusCode::BAD_REQUEST);

        let query = SummaryQuery {
            start_date: Some("yesterday".into()),
            end_date: Some("2024-01-01".into()),
        };
        let err = f.service.summary(TENANT, &query).await.unwrap_err();
        assert_eq!(err.http_status(), http::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn summary_groups_by_status_and_method() {
        let f = fixture().await;
        consolidated_bill(&f).await;

        let day = chrono::DateTime::from_timestamp_millis(NOW).unwrap().date_naive();
        let query = SummaryQuery {
            start_date: Some(day.format("%Y-%m-%d").to_string()),
            end_date: Some(day.format("%Y-%m-%d").to_string()),
        };
        let summary = f.service.summary(TENANT, &query).await.unwrap();
        assert_eq!(summary.bills_summary.len(), 1);
        assert_eq!(summary.bills_summary[0].status, BillStatus::Completed);
        assert_eq!(summary.bills_summary[0].count, 1);
        assert_eq!(summary.bills_summary[0].total_amount, 55.0);
        assert_eq!(summary.payment_summary.len(), 1);
        assert_eq!(summary.payment_summary[0].payment_method, Some(PaymentMethod::Cash));
    }

    #[test]
    fn list_query_end_date_is_inclusive() {
        let query = BillListQuery {
            start_date: Some("2024-03-01".into()),
            end_date: Some("2024-03-01".into()),
            ..Default::default()
        };
        let filter = query.to_filter(Tz::UTC).unwrap();
        let (from, before) = (filter.created_from.unwrap(), filter.created_before.unwrap());
        assert_eq!(before - from, 24 * 60 * 60 * 1000);
    }

    #[test]
    fn list_query_ignores_unparseable_bounds() {
        let query = BillListQuery {
            start_date: Some("not-a-date".into()),
            max_amount: Some("ten".into()),
            ..Default::default()
        };
        let filter = query.to_filter(Tz::UTC).unwrap();
        assert!(filter.created_from.is_none());
        assert!(filter.max_amount.is_none());
    }
}
