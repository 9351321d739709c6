//! 认证模块
//!
//! - [`JwtService`] - 令牌校验
//! - [`CurrentUser`] - 租户主体 (handler 提取器)
//! - [`require_auth`] - 路由级认证中间件

mod extractor;
pub mod jwt;
pub mod middleware;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use middleware::{authenticate, require_auth};
