//! Dining Table API 模块

mod handler;

use axum::{
    Router,
    routing::{delete, get, patch, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/tables", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/bulk", post(handler::create_bulk))
        .route("/{id}", delete(handler::delete))
        .route("/{id}/status", patch(handler::set_status))
        .route("/{id}/active-bill", get(handler::active_bill))
        .route(
            "/{id}/held-orders",
            get(handler::list_held_orders).post(handler::create_held_order),
        )
}
