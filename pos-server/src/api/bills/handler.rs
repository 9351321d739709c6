//! Bill API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::api::extract::{AppJson, AppQuery};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Bill, BillPatch, PaymentMethodUpdate};
use crate::services::billing::{BillListQuery, BillSummary, SummaryQuery};
use crate::utils::AppResult;
use crate::utils::time::now_millis;
use crate::utils::types::Page;

/// GET /api/bills - 分页查询账单
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
    AppQuery(query): AppQuery<BillListQuery>,
) -> AppResult<Json<Page<Bill>>> {
    let page = state.billing.list(&user.tenant_id, &query).await?;
    Ok(Json(page))
}

/// GET /api/bills/summary - 日期范围汇总
pub async fn summary(
    State(state): State<ServerState>,
    user: CurrentUser,
    AppQuery(query): AppQuery<SummaryQuery>,
) -> AppResult<Json<BillSummary>> {
    let summary = state.billing.summary(&user.tenant_id, &query).await?;
    Ok(Json(summary))
}

/// GET /api/bills/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<Bill>> {
    let bill = state.billing.get(&user.tenant_id, &id).await?;
    Ok(Json(bill))
}

/// POST /api/bills/:tableId/save - 合并挂单生成账单
pub async fn consolidate(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(table_id): Path<String>,
) -> AppResult<(StatusCode, Json<Bill>)> {
    let bill = state
        .billing
        .consolidate(&user.tenant_id, &table_id, now_millis())
        .await?;
    Ok((StatusCode::CREATED, Json(bill)))
}

/// PATCH /api/bills/:id - 部分更新
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    AppJson(patch): AppJson<BillPatch>,
) -> AppResult<Json<Bill>> {
    let bill = state
        .billing
        .update(&user.tenant_id, &id, patch, now_millis())
        .await?;
    Ok(Json(bill))
}

/// PATCH /api/bills/:id/payment-method
pub async fn set_payment_method(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    AppJson(payload): AppJson<PaymentMethodUpdate>,
) -> AppResult<Json<Bill>> {
    let bill = state
        .billing
        .set_payment_method(&user.tenant_id, &id, &payload.payment_method, now_millis())
        .await?;
    Ok(Json(bill))
}
