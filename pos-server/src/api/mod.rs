//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`bills`] - 账单查询、合并、修改
//! - [`tables`] - 桌台管理、挂单
//! - [`products`] - 菜品管理、库存
//! - [`restaurant`] - 餐厅信息
//! - [`public`] - 公开菜单 (无需认证)
//! - [`subscription`] - 订阅与支付回调

pub mod extract;

pub mod bills;
pub mod health;
pub mod products;
pub mod public;
pub mod restaurant;
pub mod subscription;
pub mod tables;

use std::time::{Duration, Instant};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware::{self, Next},
    response::Response,
};
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::auth::require_auth;
use crate::core::ServerState;
use crate::core::state::LOCAL_IMAGES_PREFIX;

// Re-export common types for handlers
pub use crate::utils::{AppError, AppResult};
pub use extract::{AppJson, AppQuery};

/// HTTP 请求日志中间件
async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());
    let started = Instant::now();

    let response = next.run(request).await;

    tracing::info!(
        target: "http_access",
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        latency_ms = started.elapsed().as_millis() as u64,
        "request"
    );
    response
}

/// Build the Axum router (without state)
pub fn routes() -> Router<ServerState> {
    Router::<ServerState>::new()
        .merge(health::router())
        .merge(bills::router())
        .merge(tables::router())
        .merge(products::router())
        .merge(restaurant::router())
        .merge(public::router())
        .merge(subscription::router())
}

/// 组装完整应用: 路由 + 认证 + Tower HTTP 中间件
pub fn build_app(state: ServerState) -> Router {
    let request_timeout = Duration::from_millis(state.config.request_timeout_ms);
    let images_dir = state.local_images_dir();

    // JWT 认证中间件 - require_auth 内部会跳过公共路由
    let mut app = routes()
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state);

    if let Some(dir) = images_dir {
        app = app.nest_service(LOCAL_IMAGES_PREFIX, ServeDir::new(dir));
    }

    app.layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(CorsLayer::permissive())
            .layer(CompressionLayer::new())
            .layer(TimeoutLayer::new(request_timeout)),
    )
    // HTTP 请求日志中间件
    .layer(middleware::from_fn(log_request))
}
