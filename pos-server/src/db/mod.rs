//! Database Module
//!
//! Embedded SurrealDB (RocksDB on disk, in-memory for tests) and schema bootstrap

pub mod models;
pub mod repository;

use std::path::Path;

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem, RocksDb};

use crate::core::ServerError;

/// Tables, tenant indexes and uniqueness constraints
///
/// All tables are schemaless; typed access goes through `db::models`.
const SCHEMA: &str = r#"
DEFINE TABLE IF NOT EXISTS bill SCHEMALESS;
DEFINE INDEX IF NOT EXISTS bill_tenant_created ON bill FIELDS tenant_id, created_at;
DEFINE INDEX IF NOT EXISTS bill_tenant_number ON bill FIELDS tenant_id, bill_number UNIQUE;
DEFINE INDEX IF NOT EXISTS bill_tenant_table ON bill FIELDS tenant_id, table_id, status;

DEFINE TABLE IF NOT EXISTS held_order SCHEMALESS;
DEFINE INDEX IF NOT EXISTS held_order_tenant_table ON held_order FIELDS tenant_id, table_id, status;

DEFINE TABLE IF NOT EXISTS dining_table SCHEMALESS;
DEFINE INDEX IF NOT EXISTS dining_table_tenant_number ON dining_table FIELDS tenant_id, table_number UNIQUE;

DEFINE TABLE IF NOT EXISTS product SCHEMALESS;
DEFINE INDEX IF NOT EXISTS product_tenant ON product FIELDS tenant_id;

DEFINE TABLE IF NOT EXISTS counter SCHEMALESS;

DEFINE TABLE IF NOT EXISTS subscription SCHEMALESS;
DEFINE INDEX IF NOT EXISTS subscription_tenant ON subscription FIELDS tenant_id, status;

DEFINE TABLE IF NOT EXISTS restaurant SCHEMALESS;
"#;

/// Database service, owns the SurrealDB handle
#[derive(Clone)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// Open (or create) the on-disk database and apply the schema
    pub async fn open(path: &Path, namespace: &str, database: &str) -> Result<Self, ServerError> {
        std::fs::create_dir_all(path)?;
        let path_str = path
            .to_str()
            .ok_or_else(|| ServerError::Config(format!("Non UTF-8 database path: {:?}", path)))?;

        let db = Surreal::new::<RocksDb>(path_str).await?;
        let service = Self::init(db, namespace, database).await?;
        tracing::info!(path = %path_str, "Database connection established (SurrealDB RocksDB)");
        Ok(service)
    }

    /// In-memory database (tests)
    pub async fn memory() -> Result<Self, ServerError> {
        let db = Surreal::new::<Mem>(()).await?;
        Self::init(db, "pos", "test").await
    }

    async fn init(db: Surreal<Db>, namespace: &str, database: &str) -> Result<Self, ServerError> {
        db.use_ns(namespace).use_db(database).await?;
        db.query(SCHEMA).await?.check()?;
        tracing::debug!("Database schema applied");
        Ok(Self { db })
    }
}
