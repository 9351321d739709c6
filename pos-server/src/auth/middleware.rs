//! 认证中间件
//!
//! 为 JWT 认证提供 Axum 中间件

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::AppError;
use crate::auth::{CurrentUser, JwtError, JwtService};
use crate::core::ServerState;
use crate::security_log;

/// 公共 API 前缀 (无需认证)
const PUBLIC_API_PREFIXES: &[&str] = &["/api/public/"];

/// 公共 API 路径 (无需认证)
const PUBLIC_API_PATHS: &[&str] = &["/api/subscription/payment-webhook"];

/// 校验令牌并构建 [`CurrentUser`]
pub fn authenticate(
    jwt_service: &JwtService,
    token: &str,
    uri: &http::Uri,
) -> Result<CurrentUser, AppError> {
    let claims = jwt_service.validate_token(token).map_err(|e| {
        security_log!(
            "WARN",
            "auth_failed",
            error = format!("{}", e),
            uri = format!("{:?}", uri)
        );
        match e {
            JwtError::ExpiredToken => AppError::token_expired(),
            _ => AppError::invalid_token("Invalid token"),
        }
    })?;

    CurrentUser::try_from(claims).map_err(|e| {
        security_log!("WARN", "auth_malformed", error = format!("{}", e));
        AppError::invalid_token(format!("Malformed JWT claims: {}", e))
    })
}

fn is_public_api(path: &str) -> bool {
    PUBLIC_API_PATHS.contains(&path) || PUBLIC_API_PREFIXES.iter().any(|p| path.starts_with(p))
}

/// 认证中间件 - 要求用户登录
///
/// 从 `Authorization: Bearer <token>` 头提取并验证 JWT。
/// 验证成功后将 [`CurrentUser`] 注入请求扩展。
///
/// # 跳过认证的路径
///
/// - `OPTIONS *` (CORS 预检)
/// - 非 `/api/` 路径 (`/health`, `/images/*`)
/// - `/api/public/*` (公开菜单、可用性查询)
/// - `/api/subscription/payment-webhook` (由 HMAC 签名保护)
///
/// # 错误处理
///
/// | 错误 | HTTP 状态码 |
/// |------|------------|
/// | 无 Authorization 头 | 401 Unauthorized |
/// | 令牌过期 | 401 TokenExpired |
/// | 无效令牌 | 401 InvalidToken |
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = req.uri().path();

    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    // 非 API 路由跳过认证 (让它们正常返回 404)
    if !path.starts_with("/api/") || is_public_api(path) {
        return Ok(next.run(req).await);
    }

    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => JwtService::extract_from_header(header)
            .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?,
        None => {
            security_log!("WARN", "auth_missing", uri = format!("{:?}", req.uri()));
            return Err(AppError::unauthorized());
        }
    };

    let user = authenticate(state.get_jwt_service(), token, req.uri())?;
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}
