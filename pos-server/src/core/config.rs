use chrono_tz::Tz;

use crate::auth::JwtConfig;
use crate::core::ServerError;
use crate::utils::time::parse_timezone;

/// 服务器配置
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./data | 工作目录 (数据库、日志、本地图片) |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | DB_NAMESPACE / DB_NAME | pos / pos | SurrealDB 命名空间 / 数据库 |
/// | BUSINESS_TIMEZONE | UTC | 日期过滤使用的业务时区 |
/// | SUMMARY_TIMEOUT_MS | 10000 | 账单汇总聚合查询超时 |
/// | REQUEST_TIMEOUT_MS | 30000 | 请求超时(毫秒) |
/// | LOG_LEVEL / LOG_JSON | info / false | 日志级别 / JSON 输出 |
/// | JWT_SECRET / JWT_ISSUER / JWT_AUDIENCE | - | JWT 校验 |
/// | PAYMENT_KEY_ID / PAYMENT_KEY_SECRET | - | 支付网关凭证 |
/// | PAYMENT_WEBHOOK_SECRET | - | Webhook 签名密钥 |
/// | PAYMENT_API_BASE | https://api.razorpay.com/v1 | 支付网关地址 |
/// | PAYMENT_CURRENCY | INR | 订阅币种 |
/// | S3_BUCKET / S3_PUBLIC_BASE_URL | 未设置 | 未设置时图片存本地并挂载 /images |
///
/// 非 development 环境下所有密钥必须设置。
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 运行环境: development | staging | production
    pub environment: String,
    pub db_namespace: String,
    pub db_name: String,
    /// 业务时区 (日期范围过滤)
    pub business_timezone: Tz,
    /// 汇总聚合查询超时 (毫秒)
    pub summary_timeout_ms: u64,
    /// 请求超时时间 (毫秒)
    pub request_timeout_ms: u64,
    pub log_level: String,
    pub log_json: bool,
    /// JWT 认证配置
    pub jwt: JwtConfig,
    pub payment: PaymentConfig,
    pub storage: StorageConfig,
}

/// 支付网关配置
#[derive(Debug, Clone)]
pub struct PaymentConfig {
    pub key_id: String,
    /// Basic-auth secret; also the HMAC key for client-side payment verification
    pub key_secret: String,
    /// HMAC key for webhook bodies
    pub webhook_secret: String,
    pub api_base: String,
    pub currency: String,
}

/// 对象存储配置
#[derive(Debug, Clone, Default)]
pub struct StorageConfig {
    pub s3_bucket: Option<String>,
    /// Public URL prefix for uploaded objects; defaults to the bucket's virtual-host URL
    pub s3_public_base_url: Option<String>,
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.into())
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_opt(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.trim().is_empty())
}

impl Config {
    /// Secret that must be set outside development
    fn require_secret(name: &str, environment: &str) -> Result<String, ServerError> {
        match env_opt(name) {
            Some(v) => Ok(v),
            None if environment == "development" => {
                tracing::warn!("{} not set, using development placeholder", name);
                Ok(format!("dev-{name}-not-for-production"))
            }
            None => Err(ServerError::Config(format!(
                "{name} must be set in {environment} environment"
            ))),
        }
    }

    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值；缺少生产密钥时返回错误
    pub fn from_env() -> Result<Self, ServerError> {
        let environment = env_or("ENVIRONMENT", "development");

        let jwt_secret = Self::require_secret("JWT_SECRET", &environment)?;
        if environment != "development" && jwt_secret.len() < 32 {
            return Err(ServerError::Config(
                "JWT_SECRET must be at least 32 characters long".into(),
            ));
        }

        Ok(Self {
            work_dir: env_or("WORK_DIR", "./data"),
            http_port: env_parse("HTTP_PORT", 3000),
            db_namespace: env_or("DB_NAMESPACE", "pos"),
            db_name: env_or("DB_NAME", "pos"),
            business_timezone: parse_timezone(&env_or("BUSINESS_TIMEZONE", "UTC")),
            summary_timeout_ms: env_parse("SUMMARY_TIMEOUT_MS", 10_000),
            request_timeout_ms: env_parse("REQUEST_TIMEOUT_MS", 30_000),
            log_level: env_or("LOG_LEVEL", "info"),
            log_json: env_parse("LOG_JSON", false),
            jwt: JwtConfig {
                secret: jwt_secret,
                issuer: env_or("JWT_ISSUER", "pos-auth"),
                audience: env_or("JWT_AUDIENCE", "pos-server"),
            },
            payment: PaymentConfig {
                key_id: Self::require_secret("PAYMENT_KEY_ID", &environment)?,
                key_secret: Self::require_secret("PAYMENT_KEY_SECRET", &environment)?,
                webhook_secret: Self::require_secret("PAYMENT_WEBHOOK_SECRET", &environment)?,
                api_base: env_or("PAYMENT_API_BASE", "https://api.razorpay.com/v1"),
                currency: env_or("PAYMENT_CURRENCY", "INR"),
            },
            storage: StorageConfig {
                s3_bucket: env_opt("S3_BUCKET"),
                s3_public_base_url: env_opt("S3_PUBLIC_BASE_URL"),
            },
            environment,
        })
    }

    /// 测试配置: 固定密钥, UTC, 临时工作目录
    #[cfg(any(test, feature = "test-support"))]
    pub fn for_tests(work_dir: impl Into<String>) -> Self {
        Self {
            work_dir: work_dir.into(),
            http_port: 0,
            environment: "test".into(),
            db_namespace: "pos".into(),
            db_name: "test".into(),
            business_timezone: Tz::UTC,
            summary_timeout_ms: 10_000,
            request_timeout_ms: 30_000,
            log_level: "warn".into(),
            log_json: false,
            jwt: JwtConfig {
                secret: "test-secret-key-that-is-at-least-32-bytes".into(),
                issuer: "pos-auth".into(),
                audience: "pos-server".into(),
            },
            payment: PaymentConfig {
                key_id: "rzp_test_key".into(),
                key_secret: "test-key-secret".into(),
                webhook_secret: "test-webhook-secret".into(),
                api_base: "http://127.0.0.1:9/v1".into(),
                currency: "INR".into(),
            },
            storage: StorageConfig::default(),
        }
    }

    /// 数据库目录
    pub fn database_dir(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.work_dir).join("database")
    }

    /// 日志目录
    pub fn log_dir(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.work_dir).join("logs")
    }

    /// 本地图片目录 (未配置 S3 时使用)
    pub fn images_dir(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.work_dir).join("images")
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
