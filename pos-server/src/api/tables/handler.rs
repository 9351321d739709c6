//! Dining Table API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::api::extract::AppJson;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{
    Bill, DiningTable, DiningTableBulkCreate, DiningTableCreate, DiningTableStatusUpdate,
    HeldOrder, HeldOrderCreate,
};
use crate::utils::AppResult;
use crate::utils::time::now_millis;

/// GET /api/tables - 获取所有桌台 (按桌号排序)
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<DiningTable>>> {
    let tables = state.tables.list(&user.tenant_id).await?;
    Ok(Json(tables))
}

/// POST /api/tables - 创建桌台
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    AppJson(payload): AppJson<DiningTableCreate>,
) -> AppResult<(StatusCode, Json<DiningTable>)> {
    let table = state
        .tables
        .create(&user.tenant_id, payload.table_number, now_millis())
        .await?;
    Ok((StatusCode::CREATED, Json(table)))
}

/// POST /api/tables/bulk - 批量创建 (全部成功或全部失败)
pub async fn create_bulk(
    State(state): State<ServerState>,
    user: CurrentUser,
    AppJson(payload): AppJson<DiningTableBulkCreate>,
) -> AppResult<(StatusCode, Json<Vec<DiningTable>>)> {
    let tables = state
        .tables
        .create_bulk(&user.tenant_id, payload.base_number, payload.quantity, now_millis())
        .await?;
    Ok((StatusCode::CREATED, Json(tables)))
}

/// PATCH /api/tables/:id/status
pub async fn set_status(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    AppJson(payload): AppJson<DiningTableStatusUpdate>,
) -> AppResult<Json<DiningTable>> {
    let table = state
        .tables
        .set_status(&user.tenant_id, &id, &payload.status)
        .await?;
    Ok(Json(table))
}

/// DELETE /api/tables/:id
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    state.tables.delete(&user.tenant_id, &id).await?;
    Ok(Json(true))
}

/// GET /api/tables/:id/active-bill
pub async fn active_bill(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<Bill>> {
    let bill = state.billing.active_bill(&user.tenant_id, &id).await?;
    Ok(Json(bill))
}

/// GET /api/tables/:id/held-orders - 当前挂单
pub async fn list_held_orders(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<HeldOrder>>> {
    let orders = state.billing.list_held_orders(&user.tenant_id, &id).await?;
    Ok(Json(orders))
}

/// POST /api/tables/:id/held-orders - 新建挂单
pub async fn create_held_order(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    AppJson(payload): AppJson<HeldOrderCreate>,
) -> AppResult<(StatusCode, Json<HeldOrder>)> {
    let order = state
        .billing
        .create_held_order(&user.tenant_id, &id, payload, now_millis())
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}
