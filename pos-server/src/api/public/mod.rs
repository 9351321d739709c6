//! Public API 模块 (无需认证)
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/public/menu/:tenantId | GET | 公开菜单 (仅可售菜品) |
//! | /api/public/products/:id/availability | GET | 菜品可售状态 |

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/public", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/menu/{tenant_id}", get(handler::menu))
        .route("/products/{id}/availability", get(handler::availability))
}
