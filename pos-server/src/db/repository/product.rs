//! Product Repository

use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use super::{BaseRepository, CountRow, RepoError, RepoResult};
use crate::db::models::{Product, ProductUpdate};

const TABLE: &str = "product";

#[derive(Clone)]
pub struct ProductRepository {
    base: BaseRepository,
}

impl ProductRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Owner listing, newest first
    pub async fn find_all(&self, tenant_id: &str) -> RepoResult<Vec<Product>> {
        let products: Vec<Product> = self
            .base
            .db()
            .query("SELECT * FROM product WHERE tenant_id = $tenant_id ORDER BY created_at DESC")
            .bind(("tenant_id", tenant_id.to_string()))
            .await?
            .take(0)?;
        Ok(products)
    }

    /// Menu listing, by category then item name
    pub async fn find_for_menu(&self, tenant_id: &str) -> RepoResult<Vec<Product>> {
        let products: Vec<Product> = self
            .base
            .db()
            .query(
                "SELECT * FROM product WHERE tenant_id = $tenant_id \
                 ORDER BY category ASC, item_name ASC",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .await?
            .take(0)?;
        Ok(products)
    }

    /// Find product owned by tenant
    pub async fn find_by_id(&self, tenant_id: &str, id: &RecordId) -> RepoResult<Option<Product>> {
        let products: Vec<Product> = self
            .base
            .db()
            .query("SELECT * FROM $id WHERE tenant_id = $tenant_id")
            .bind(("id", id.clone()))
            .bind(("tenant_id", tenant_id.to_string()))
            .await?
            .take(0)?;
        Ok(products.into_iter().next())
    }

    /// Find product regardless of tenant (public availability check)
    pub async fn find_public(&self, id: &RecordId) -> RepoResult<Option<Product>> {
        let product: Option<Product> = self.base.db().select(id.clone()).await?;
        Ok(product)
    }

    /// Number of the tenant's products whose image is stored under `key`
    pub async fn count_image_refs(&self, tenant_id: &str, key: &str) -> RepoResult<i64> {
        let row: Option<CountRow> = self
            .base
            .db()
            .query(
                "SELECT count() AS total FROM product \
                 WHERE tenant_id = $tenant_id AND image_key = $key GROUP ALL",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("key", key.to_string()))
            .await?
            .take(0)?;
        Ok(row.map(|r| r.total).unwrap_or(0))
    }

    pub async fn create(&self, product: Product) -> RepoResult<Product> {
        let created: Option<Product> = self.base.db().create(TABLE).content(product).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create product".to_string()))
    }

    pub async fn update(&self, id: &RecordId, data: ProductUpdate) -> RepoResult<Product> {
        let updated: Option<Product> = self.base.db().update(id.clone()).merge(data).await?;
        updated.ok_or_else(|| RepoError::NotFound(format!("Product {} not found", id)))
    }

    /// Set stock flag and window; `None` clears the window
    pub async fn set_stock(
        &self,
        id: &RecordId,
        in_stock: bool,
        out_of_stock_until: Option<i64>,
        now: i64,
    ) -> RepoResult<Product> {
        let updated: Option<Product> = self
            .base
            .db()
            .query(
                "UPDATE $id SET in_stock = $in_stock, out_of_stock_until = $until, \
                 updated_at = $now RETURN AFTER",
            )
            .bind(("id", id.clone()))
            .bind(("in_stock", in_stock))
            .bind(("until", out_of_stock_until))
            .bind(("now", now))
            .await?
            .take(0)?;
        updated.ok_or_else(|| RepoError::NotFound(format!("Product {} not found", id)))
    }

    /// Hard delete
    pub async fn delete(&self, id: &RecordId) -> RepoResult<()> {
        let _: Option<Product> = self.base.db().delete(id.clone()).await?;
        Ok(())
    }
}
