//! Bill API 模块

mod handler;

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/bills", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/summary", get(handler::summary))
        .route("/{id}", get(handler::get_by_id).patch(handler::update))
        // `{id}` here is the table whose held orders are consolidated
        .route("/{id}/save", post(handler::consolidate))
        .route("/{id}/payment-method", patch(handler::set_payment_method))
}
