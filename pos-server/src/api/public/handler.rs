//! Public API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::core::ServerState;
use crate::services::catalog::{Availability, PublicMenu};
use crate::utils::AppResult;
use crate::utils::time::now_millis;

/// GET /api/public/menu/:tenantId
pub async fn menu(
    State(state): State<ServerState>,
    Path(tenant_id): Path<String>,
) -> AppResult<Json<PublicMenu>> {
    let menu = state.catalog.public_menu(&tenant_id, now_millis()).await?;
    Ok(Json(menu))
}

/// GET /api/public/products/:id/availability
pub async fn availability(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Availability>> {
    let availability = state.catalog.check_availability(&id, now_millis()).await?;
    Ok(Json(availability))
}
