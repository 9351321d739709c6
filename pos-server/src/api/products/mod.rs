//! Product API 模块
//!
//! 创建 / 更新使用 multipart 表单 (文本字段 + 可选 `image` 文件)。

mod handler;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, patch, put},
};

use crate::core::ServerState;
use crate::services::catalog::MAX_IMAGE_SIZE;

/// Multipart body ceiling; oversized images still reach validation and get `FileTooLarge`
const MAX_FORM_BODY: usize = MAX_IMAGE_SIZE * 2;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/products", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/{id}", put(handler::update).delete(handler::delete))
        .route("/{id}/stock", patch(handler::set_stock))
        .layer(DefaultBodyLimit::max(MAX_FORM_BODY))
}
