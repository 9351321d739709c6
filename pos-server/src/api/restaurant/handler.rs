//! Restaurant profile handlers

use axum::{Json, extract::State};

use crate::api::extract::AppJson;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Restaurant, RestaurantUpsert};
use crate::utils::AppResult;
use crate::utils::time::now_millis;

/// GET /api/restaurant
pub async fn get(State(state): State<ServerState>, user: CurrentUser) -> AppResult<Json<Restaurant>> {
    let restaurant = state.catalog.restaurant(&user.tenant_id).await?;
    Ok(Json(restaurant))
}

/// PUT /api/restaurant - 创建或覆盖餐厅信息
pub async fn upsert(
    State(state): State<ServerState>,
    user: CurrentUser,
    AppJson(payload): AppJson<RestaurantUpsert>,
) -> AppResult<Json<Restaurant>> {
    let restaurant = state
        .catalog
        .save_restaurant(&user.tenant_id, payload, now_millis())
        .await?;
    Ok(Json(restaurant))
}
