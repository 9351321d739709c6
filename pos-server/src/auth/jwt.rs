//! JWT 令牌服务
//!
//! 令牌由外部认证服务签发；本服务只校验并解析出租户主体。
//! `generate_token` 供测试和运维工具使用。

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JWT 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// HS256 共享密钥
    pub secret: String,
    /// 令牌签发者
    pub issuer: String,
    /// 令牌受众
    pub audience: String,
}

/// 存储在令牌中的 JWT Claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// 用户 ID (Subject)
    pub sub: String,
    /// 租户 (餐厅) ID
    pub tenant_id: String,
    /// 过期时间戳
    pub exp: i64,
    /// 签发时间戳
    pub iat: i64,
    /// 签发者
    pub iss: String,
    /// 受众
    pub aud: String,
}

/// JWT 错误
#[derive(Error, Debug)]
pub enum JwtError {
    #[error("无效令牌: {0}")]
    InvalidToken(String),

    #[error("令牌已过期")]
    ExpiredToken,

    #[error("无效签名")]
    InvalidSignature,

    #[error("令牌生成失败: {0}")]
    GenerationFailed(String),
}

/// JWT 令牌服务
#[derive(Clone)]
pub struct JwtService {
    pub config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("issuer", &self.config.issuer)
            .field("audience", &self.config.audience)
            .finish_non_exhaustive()
    }
}

impl JwtService {
    /// 使用指定配置创建新的 JWT 服务
    pub fn with_config(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// 为租户用户生成令牌
    pub fn generate_token(
        &self,
        user_id: &str,
        tenant_id: &str,
        ttl: Duration,
    ) -> Result<String, JwtError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            tenant_id: tenant_id.to_string(),
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::GenerationFailed(e.to_string()))
    }

    /// 验证并解码令牌
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&self.config.audience]);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_required_spec_claims(&["sub", "exp", "iat", "iss", "aud"]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
                ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                _ => JwtError::InvalidToken(e.to_string()),
            }
        })?;

        Ok(token_data.claims)
    }

    /// 从 Authorization 头提取令牌
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header.strip_prefix("Bearer ")
    }
}

/// 当前用户上下文 (从 JWT Claims 解析)
///
/// 由认证中间件创建，注入到请求处理函数。所有数据访问都以 `tenant_id` 作用域。
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// 用户 ID
    pub id: String,
    /// 租户 ID
    pub tenant_id: String,
}

impl TryFrom<Claims> for CurrentUser {
    type Error = JwtError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        if claims.tenant_id.trim().is_empty() {
            return Err(JwtError::InvalidToken("missing tenant_id claim".into()));
        }
        Ok(Self {
            id: claims.sub,
            tenant_id: claims.tenant_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> JwtService {
        JwtService::with_config(JwtConfig {
            secret: "unit-test-secret-key-with-enough-length".into(),
            issuer: "pos-auth".into(),
            audience: "pos-server".into(),
        })
    }

    #[test]
    fn roundtrip_carries_tenant() {
        let svc = service();
        let token = svc
            .generate_token("user-1", "tenant-a", Duration::minutes(5))
            .unwrap();
        let user = CurrentUser::try_from(svc.validate_token(&token).unwrap()).unwrap();
        assert_eq!(user.id, "user-1");
        assert_eq!(user.tenant_id, "tenant-a");
    }

    #[test]
    fn expired_token_is_rejected() {
        let svc = service();
        let token = svc
            .generate_token("user-1", "tenant-a", Duration::minutes(-10))
            .unwrap();
        assert!(matches!(svc.validate_token(&token), Err(JwtError::ExpiredToken)));
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let base = service().config;
        let other = JwtService::with_config(JwtConfig {
            secret: "a-completely-different-secret-value!!".into(),
            ..base
        });
        let token = other
            .generate_token("user-1", "tenant-a", Duration::minutes(5))
            .unwrap();
        assert!(matches!(
            service().validate_token(&token),
            Err(JwtError::InvalidSignature)
        ));
    }

    #[test]
    fn empty_tenant_claim_is_rejected() {
        let svc = service();
        let token = svc.generate_token("user-1", " ", Duration::minutes(5)).unwrap();
        let claims = svc.validate_token(&token).unwrap();
        assert!(CurrentUser::try_from(claims).is_err());
    }

    #[test]
    fn bearer_prefix() {
        assert_eq!(JwtService::extract_from_header("Bearer abc"), Some("abc"));
        assert_eq!(JwtService::extract_from_header("Basic abc"), None);
    }
}
