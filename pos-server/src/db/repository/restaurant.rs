//! Restaurant Repository

use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::Restaurant;

const TABLE: &str = "restaurant";

#[derive(Clone)]
pub struct RestaurantRepository {
    base: BaseRepository,
}

impl RestaurantRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    fn record(tenant_id: &str) -> RecordId {
        RecordId::from_table_key(TABLE, tenant_id)
    }

    pub async fn find(&self, tenant_id: &str) -> RepoResult<Option<Restaurant>> {
        let found: Option<Restaurant> = self.base.db().select(Self::record(tenant_id)).await?;
        Ok(found)
    }

    /// Create or replace the tenant's profile
    pub async fn upsert(&self, profile: Restaurant) -> RepoResult<Restaurant> {
        let saved: Option<Restaurant> = self
            .base
            .db()
            .upsert(Self::record(&profile.tenant_id))
            .content(profile)
            .await?;
        saved.ok_or_else(|| RepoError::Database("Failed to save restaurant".to_string()))
    }
}
