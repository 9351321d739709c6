//! Repository Module
//!
//! Tenant-scoped CRUD over SurrealDB tables. Every query filters on `tenant_id`.

// Billing
pub mod bill;
pub mod counter;
pub mod held_order;

// Location
pub mod dining_table;

// Catalog
pub mod product;
pub mod restaurant;

// Subscription
pub mod subscription;

// Re-exports
pub use bill::BillRepository;
pub use counter::CounterRepository;
pub use dining_table::DiningTableRepository;
pub use held_order::HeldOrderRepository;
pub use product::ProductRepository;
pub use restaurant::RestaurantRepository;
pub use subscription::SubscriptionRepository;

use serde::Deserialize;
use shared::error::AppError;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        let msg = err.to_string();
        // UNIQUE index violation
        if msg.contains("already contains") {
            RepoError::Duplicate(msg)
        } else {
            RepoError::Database(msg)
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::not_found(msg),
            RepoError::Duplicate(msg) => AppError::conflict(msg),
            RepoError::Validation(msg) => AppError::validation(msg),
            RepoError::Database(msg) => AppError::database(msg),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// `SELECT count() AS total ... GROUP ALL`
#[derive(Debug, Deserialize)]
pub(crate) struct CountRow {
    pub total: i64,
}

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }
}
