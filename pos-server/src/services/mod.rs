//! 服务层 - 业务逻辑
//!
//! # 服务列表
//!
//! - [`BillingService`] - 挂单、账单合并、账单查询与修改
//! - [`CatalogService`] - 商品、库存、公开菜单、餐厅信息
//! - [`TableService`] - 桌台管理
//! - [`SubscriptionService`] - 订阅支付与有效期
//! - [`SequenceService`] - 租户内序列号
//!
//! 外部协作方 (对象存储、支付网关) 以 trait 注入，见 [`storage`] 与 [`gateway`]。

pub mod billing;
pub mod catalog;
pub mod gateway;
pub mod sequence;
pub mod storage;
pub mod subscription;
pub mod tables;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use billing::{BillListQuery, BillSummary, BillingService, SummaryQuery};
pub use catalog::{CatalogService, ImageUpload, ProductForm};
pub use gateway::{GatewayError, GatewayOrder, NewGatewayOrder, PaymentGateway, RazorpayGateway};
pub use sequence::{KeyedLocks, SequenceService};
pub use storage::{LocalObjectStore, ObjectStore, S3ObjectStore, StorageError};
pub use subscription::SubscriptionService;
pub use tables::TableService;
