use std::sync::Arc;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::auth::JwtService;
use crate::core::{Config, ServerError};
use crate::db::DbService;
use crate::services::{
    BillingService, CatalogService, KeyedLocks, LocalObjectStore, ObjectStore, PaymentGateway,
    RazorpayGateway, S3ObjectStore, SubscriptionService, TableService,
};

/// Public URL prefix for images served from the local store
pub const LOCAL_IMAGES_PREFIX: &str = "/images";

/// 服务器状态 - 持有所有服务的共享引用
///
/// 所有字段都是廉价 Clone (Arc 或内部 Arc)。
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Arc<Config> | 配置项 (不可变) |
/// | db | Surreal<Db> | 嵌入式数据库 |
/// | jwt_service | Arc<JwtService> | JWT 校验 |
/// | billing | BillingService | 挂单 / 账单 |
/// | catalog | CatalogService | 菜品 / 公开菜单 / 餐厅信息 |
/// | tables | TableService | 桌台 |
/// | subscriptions | SubscriptionService | 订阅 |
#[derive(Clone)]
pub struct ServerState {
    pub config: Arc<Config>,
    pub db: Surreal<Db>,
    pub jwt_service: Arc<JwtService>,
    pub billing: BillingService,
    pub catalog: CatalogService,
    pub tables: TableService,
    pub subscriptions: SubscriptionService,
}

impl ServerState {
    /// 用给定的数据库与外部协作方组装状态
    ///
    /// 测试中传入内存数据库与假实现。
    pub fn new(
        config: Config,
        db: Surreal<Db>,
        store: Arc<dyn ObjectStore>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        // 序列号、账单合并、订阅激活共享同一组进程内锁
        let locks = Arc::new(KeyedLocks::new());
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));

        Self {
            billing: BillingService::new(
                db.clone(),
                locks.clone(),
                config.business_timezone,
                config.summary_timeout_ms,
            ),
            catalog: CatalogService::new(db.clone(), store),
            tables: TableService::new(db.clone()),
            subscriptions: SubscriptionService::new(db.clone(), gateway, locks, &config.payment),
            jwt_service,
            db,
            config: Arc::new(config),
        }
    }

    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 数据库 (work_dir/database)
    /// 2. 对象存储 (配置 S3_BUCKET 时用 S3，否则 work_dir/images)
    /// 3. 支付网关客户端
    pub async fn initialize(config: &Config) -> Result<Self, ServerError> {
        let db = DbService::open(&config.database_dir(), &config.db_namespace, &config.db_name)
            .await?
            .db;

        let store: Arc<dyn ObjectStore> = match &config.storage.s3_bucket {
            Some(bucket) => Arc::new(
                S3ObjectStore::from_env(bucket.clone(), config.storage.s3_public_base_url.clone()).await,
            ),
            None => {
                let dir = config.images_dir();
                std::fs::create_dir_all(&dir)?;
                tracing::info!(dir = %dir.display(), "Using local image storage");
                Arc::new(LocalObjectStore::new(dir, LOCAL_IMAGES_PREFIX))
            }
        };

        let gateway: Arc<dyn PaymentGateway> = Arc::new(RazorpayGateway::new(&config.payment));

        Ok(Self::new(config.clone(), db, store, gateway))
    }

    /// 本地图片存储时返回需要挂载的目录
    pub fn local_images_dir(&self) -> Option<std::path::PathBuf> {
        self.config
            .storage
            .s3_bucket
            .is_none()
            .then(|| self.config.images_dir())
    }

    pub fn get_jwt_service(&self) -> &JwtService {
        &self.jwt_service
    }
}
