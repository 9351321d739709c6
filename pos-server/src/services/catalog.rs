//! Catalog Service - 菜品管理、库存窗口与公开菜单
//!
//! 图片上传委托给 [`ObjectStore`]；旧图片删除失败只记录日志。

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use sha2::{Digest, Sha256};
use shared::error::ErrorCode;
use shared::models::{PricingType, StockDuration};
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use super::storage::ObjectStore;
use crate::db::models::serde_helpers::parse_record_id;
use crate::db::models::{
    Product, ProductCreate, ProductUpdate, ProductVariant, PublicMenuItem, Restaurant,
    RestaurantUpsert, StockUpdate,
};
use crate::db::repository::{ProductRepository, RestaurantRepository};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text, validate_price,
    validate_required_text,
};
use crate::utils::{AppError, AppResult};

/// Maximum image size (5 MiB)
pub const MAX_IMAGE_SIZE: usize = 5 * 1024 * 1024;

// =============================================================================
// Input types
// =============================================================================

/// Raw product form fields (multipart text parts)
///
/// Prices arrive as text; `variants` is a JSON array string.
#[derive(Debug, Clone, Default)]
pub struct ProductForm {
    pub category: Option<String>,
    pub item_name: Option<String>,
    pub pricing_type: Option<String>,
    pub base_price: Option<String>,
    pub mrp: Option<String>,
    pub selling_price: Option<String>,
    pub product_type: Option<String>,
    pub unit_type: Option<String>,
    pub variants: Option<String>,
}

/// Uploaded image part
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

impl ImageUpload {
    /// Non-empty, `image/*`, at most [`MAX_IMAGE_SIZE`]
    pub fn validate(&self) -> AppResult<()> {
        if self.bytes.is_empty() {
            return Err(AppError::new(ErrorCode::EmptyFile));
        }
        if !self.content_type.starts_with("image/") {
            return Err(AppError::with_message(
                ErrorCode::UnsupportedFileFormat,
                "Only image files are allowed",
            ));
        }
        if self.bytes.len() > MAX_IMAGE_SIZE {
            return Err(AppError::with_message(
                ErrorCode::FileTooLarge,
                format!(
                    "File too large: {} bytes (max {})",
                    self.bytes.len(),
                    MAX_IMAGE_SIZE
                ),
            ));
        }
        Ok(())
    }

    /// `products/<tenant>/<sha256>.<ext>`
    pub fn object_key(&self, tenant_id: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(&self.bytes);
        let hash = hex::encode(hasher.finalize());
        let ext = mime_guess::get_mime_extensions_str(&self.content_type)
            .and_then(|exts| exts.first())
            .copied()
            .unwrap_or("bin");
        format!("products/{tenant_id}/{hash}.{ext}")
    }
}

// =============================================================================
// Output types
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct RestaurantInfo {
    pub name: String,
    pub outlet: Option<String>,
}

/// Public menu: in-stock products grouped by category (categories sorted)
#[derive(Debug, Clone, Serialize)]
pub struct PublicMenu {
    pub restaurant_info: RestaurantInfo,
    pub menu: BTreeMap<String, Vec<PublicMenuItem>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Availability {
    pub product_id: String,
    pub is_available: bool,
}

// =============================================================================
// Validation
// =============================================================================

fn parse_price(raw: &Option<String>, field: &str) -> AppResult<Option<f64>> {
    let Some(raw) = raw.as_deref().map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    let value: f64 = raw.parse().map_err(|_| {
        AppError::with_message(ErrorCode::ProductInvalidPrice, format!("{field} must be a number"))
    })?;
    validate_price(value, field)?;
    Ok(Some(value))
}

fn parse_variants(raw: &str) -> AppResult<Vec<ProductVariant>> {
    serde_json::from_str(raw)
        .map_err(|e| AppError::with_message(ErrorCode::InvalidFormat, format!("Invalid variants: {e}")))
}

fn parse_pricing_type(raw: &str) -> AppResult<PricingType> {
    raw.parse::<PricingType>().map_err(AppError::validation)
}

/// Pricing invariant for the effective (merged) values
fn check_pricing(
    pricing_type: PricingType,
    base_price: Option<f64>,
    mrp: Option<f64>,
    selling_price: Option<f64>,
) -> AppResult<()> {
    match pricing_type {
        PricingType::BasePrice => {
            if base_price.is_none() {
                return Err(AppError::with_message(
                    ErrorCode::ProductInvalidPrice,
                    "Base price is required",
                ));
            }
        }
        PricingType::MrpBased => {
            let (Some(mrp), Some(selling)) = (mrp, selling_price) else {
                return Err(AppError::with_message(
                    ErrorCode::ProductInvalidPrice,
                    "MRP and selling price are required",
                ));
            };
            if selling > mrp {
                return Err(AppError::with_message(
                    ErrorCode::ProductInvalidPrice,
                    "Selling price cannot be greater than MRP",
                ));
            }
        }
    }
    Ok(())
}

fn required<'a>(value: &'a Option<String>, field: &str, max_len: usize) -> AppResult<&'a str> {
    let v = value
        .as_deref()
        .ok_or_else(|| AppError::with_message(ErrorCode::RequiredField, format!("{field} is required")))?;
    validate_required_text(v, field, max_len)?;
    Ok(v.trim())
}

impl ProductForm {
    /// Validate a full create form
    pub fn into_create(self) -> AppResult<ProductCreate> {
        let category = required(&self.category, "category", MAX_NAME_LEN)?.to_string();
        let item_name = required(&self.item_name, "item_name", MAX_NAME_LEN)?.to_string();
        let product_type = required(&self.product_type, "type", MAX_SHORT_TEXT_LEN)?.to_string();
        let unit_type = required(&self.unit_type, "unit_type", MAX_SHORT_TEXT_LEN)?.to_string();
        let variants = parse_variants(required(&self.variants, "variants", usize::MAX)?)?;
        let pricing_type =
            parse_pricing_type(required(&self.pricing_type, "pricing_type", MAX_SHORT_TEXT_LEN)?)?;

        let base_price = parse_price(&self.base_price, "base_price")?;
        let mrp = parse_price(&self.mrp, "mrp")?;
        let selling_price = parse_price(&self.selling_price, "selling_price")?;
        check_pricing(pricing_type, base_price, mrp, selling_price)?;

        // 只保留当前定价方式对应的价格字段
        let (base_price, mrp, selling_price) = match pricing_type {
            PricingType::BasePrice => (base_price, None, None),
            PricingType::MrpBased => (None, mrp, selling_price),
        };

        Ok(ProductCreate {
            category,
            item_name,
            pricing_type,
            base_price,
            mrp,
            selling_price,
            product_type,
            unit_type,
            variants,
        })
    }

    /// Validate a partial form against the stored product
    ///
    /// Pricing is checked on the merged result, so lowering `mrp` below an
    /// existing `selling_price` is rejected too.
    pub fn into_update(self, existing: &Product, now: i64) -> AppResult<ProductUpdate> {
        validate_optional_text(&self.category, "category", MAX_NAME_LEN)?;
        validate_optional_text(&self.item_name, "item_name", MAX_NAME_LEN)?;
        validate_optional_text(&self.product_type, "type", MAX_SHORT_TEXT_LEN)?;
        validate_optional_text(&self.unit_type, "unit_type", MAX_SHORT_TEXT_LEN)?;
        for (value, field) in [
            (&self.category, "category"),
            (&self.item_name, "item_name"),
            (&self.product_type, "type"),
            (&self.unit_type, "unit_type"),
        ] {
            if let Some(v) = value {
                validate_required_text(v, field, usize::MAX)?;
            }
        }

        let pricing_type = self.pricing_type.as_deref().map(parse_pricing_type).transpose()?;
        let base_price = parse_price(&self.base_price, "base_price")?;
        let mrp = parse_price(&self.mrp, "mrp")?;
        let selling_price = parse_price(&self.selling_price, "selling_price")?;
        let variants = self.variants.as_deref().map(parse_variants).transpose()?;

        let effective = pricing_type.unwrap_or(existing.pricing_type);
        check_pricing(
            effective,
            base_price.or(existing.base_price),
            mrp.or(existing.mrp),
            selling_price.or(existing.selling_price),
        )?;

        // 只写当前定价方式的价格；切换定价方式时清空另一种方式的字段
        let inactive = (effective != existing.pricing_type).then_some(None);
        let (base_price, mrp, selling_price) = match effective {
            PricingType::BasePrice => (base_price.map(Some), inactive, inactive),
            PricingType::MrpBased => (inactive, mrp.map(Some), selling_price.map(Some)),
        };

        Ok(ProductUpdate {
            category: self.category.map(|s| s.trim().to_string()),
            item_name: self.item_name.map(|s| s.trim().to_string()),
            pricing_type,
            base_price,
            mrp,
            selling_price,
            product_type: self.product_type.map(|s| s.trim().to_string()),
            unit_type: self.unit_type.map(|s| s.trim().to_string()),
            variants,
            image_url: None,
            image_key: None,
            updated_at: now,
        })
    }
}

// =============================================================================
// CatalogService
// =============================================================================

#[derive(Clone)]
pub struct CatalogService {
    products: ProductRepository,
    restaurants: RestaurantRepository,
    store: Arc<dyn ObjectStore>,
}

fn product_not_found() -> AppError {
    AppError::with_message(ErrorCode::ProductNotFound, "Product not found")
}

impl CatalogService {
    pub fn new(db: Surreal<Db>, store: Arc<dyn ObjectStore>) -> Self {
        Self {
            products: ProductRepository::new(db.clone()),
            restaurants: RestaurantRepository::new(db),
            store,
        }
    }

    async fn load(&self, tenant_id: &str, raw_id: &str) -> AppResult<(RecordId, Product)> {
        let id = parse_record_id("product", raw_id).ok_or_else(product_not_found)?;
        let product = self
            .products
            .find_by_id(tenant_id, &id)
            .await?
            .ok_or_else(product_not_found)?;
        Ok((id, product))
    }

    async fn upload_image(&self, tenant_id: &str, image: ImageUpload) -> AppResult<(String, String)> {
        image.validate()?;
        let key = image.object_key(tenant_id);
        let url = self
            .store
            .upload(&key, image.bytes, &image.content_type)
            .await
            .map_err(|e| {
                tracing::error!(tenant_id = %tenant_id, key = %key, error = %e, "Image upload failed");
                AppError::storage(e.to_string())
            })?;
        tracing::info!(tenant_id = %tenant_id, key = %key, "Product image uploaded");
        Ok((url, key))
    }

    /// 删除不再被任何菜品引用的图片
    ///
    /// Keys are content-addressed, so another product of the tenant may share
    /// the object. Best-effort: failures are logged and swallowed.
    async fn release_image(&self, tenant_id: &str, key: &str) {
        match self.products.count_image_refs(tenant_id, key).await {
            Ok(0) => {}
            Ok(refs) => {
                tracing::debug!(key = %key, refs, "Product image still referenced, kept");
                return;
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Failed to count image references, kept");
                return;
            }
        }
        if let Err(e) = self.store.delete(key).await {
            tracing::warn!(key = %key, error = %e, "Failed to delete old product image");
        }
    }

    pub async fn list(&self, tenant_id: &str) -> AppResult<Vec<Product>> {
        Ok(self.products.find_all(tenant_id).await?)
    }

    pub async fn create(
        &self,
        tenant_id: &str,
        form: ProductForm,
        image: Option<ImageUpload>,
        now: i64,
    ) -> AppResult<Product> {
        let data = form.into_create()?;
        if let Some(img) = &image {
            img.validate()?;
        }
        let (image_url, image_key) = match image {
            Some(img) => {
                let (url, key) = self.upload_image(tenant_id, img).await?;
                (Some(url), Some(key))
            }
            None => (None, None),
        };

        let product = Product {
            id: None,
            tenant_id: tenant_id.to_string(),
            category: data.category,
            item_name: data.item_name,
            pricing_type: data.pricing_type,
            base_price: data.base_price,
            mrp: data.mrp,
            selling_price: data.selling_price,
            product_type: data.product_type,
            unit_type: data.unit_type,
            variants: data.variants,
            image_url,
            image_key,
            in_stock: true,
            out_of_stock_until: None,
            created_at: now,
            updated_at: now,
        };
        let created = self.products.create(product).await?;
        tracing::info!(tenant_id = %tenant_id, item_name = %created.item_name, "Product created");
        Ok(created)
    }

    /// 更新菜品；新图片上传成功后再删除旧图片
    pub async fn update(
        &self,
        tenant_id: &str,
        raw_id: &str,
        form: ProductForm,
        image: Option<ImageUpload>,
        now: i64,
    ) -> AppResult<Product> {
        let (id, existing) = self.load(tenant_id, raw_id).await?;
        let mut changes = form.into_update(&existing, now)?;

        let mut superseded = None;
        if let Some(img) = image {
            let (url, key) = self.upload_image(tenant_id, img).await?;
            if existing.image_key.as_deref() != Some(key.as_str()) {
                superseded = existing.image_key.clone();
            }
            changes.image_url = Some(url);
            changes.image_key = Some(key);
        }

        let updated = self.products.update(&id, changes).await?;
        if let Some(old_key) = superseded {
            self.release_image(tenant_id, &old_key).await;
        }
        tracing::info!(tenant_id = %tenant_id, product = %id, "Product updated");
        Ok(updated)
    }

    /// 设置库存状态
    ///
    /// `in_stock = true` 清除缺货窗口；缺货时 duration 决定窗口结束时间，
    /// `indefinite` 或省略表示无限期。
    pub async fn set_stock(
        &self,
        tenant_id: &str,
        raw_id: &str,
        update: StockUpdate,
        now: i64,
    ) -> AppResult<Product> {
        let until = if update.in_stock {
            None
        } else {
            match update.duration.as_deref() {
                Some(raw) => raw
                    .parse::<StockDuration>()
                    .map_err(|e| AppError::with_message(ErrorCode::InvalidStockDuration, e))?
                    .until(now),
                None => None,
            }
        };

        let (id, _) = self.load(tenant_id, raw_id).await?;
        let updated = self.products.set_stock(&id, update.in_stock, until, now).await?;
        tracing::info!(
            tenant_id = %tenant_id,
            product = %id,
            in_stock = update.in_stock,
            out_of_stock_until = ?until,
            "Product stock updated"
        );
        Ok(updated)
    }

    pub async fn delete(&self, tenant_id: &str, raw_id: &str) -> AppResult<()> {
        let (id, product) = self.load(tenant_id, raw_id).await?;
        self.products.delete(&id).await?;
        if let Some(key) = product.image_key.as_deref() {
            self.release_image(tenant_id, key).await;
        }
        tracing::info!(tenant_id = %tenant_id, product = %id, "Product deleted");
        Ok(())
    }

    // ========== Public ==========

    /// 公开菜单：仅可售菜品，按分类分组
    pub async fn public_menu(&self, tenant_id: &str, now: i64) -> AppResult<PublicMenu> {
        let restaurant = self
            .restaurants
            .find(tenant_id)
            .await?
            .ok_or_else(|| AppError::with_message(ErrorCode::TenantNotFound, "Restaurant not found"))?;

        let mut menu: BTreeMap<String, Vec<PublicMenuItem>> = BTreeMap::new();
        for product in self.products.find_for_menu(tenant_id).await? {
            if product.is_available_at(now) {
                menu.entry(product.category.clone())
                    .or_default()
                    .push(PublicMenuItem::from(product));
            }
        }

        Ok(PublicMenu {
            restaurant_info: RestaurantInfo {
                name: restaurant.name,
                outlet: restaurant.outlet,
            },
            menu,
        })
    }

    pub async fn check_availability(&self, raw_id: &str, now: i64) -> AppResult<Availability> {
        let id = parse_record_id("product", raw_id).ok_or_else(product_not_found)?;
        let product = self
            .products
            .find_public(&id)
            .await?
            .ok_or_else(product_not_found)?;
        Ok(Availability {
            product_id: id.to_string(),
            is_available: product.is_available_at(now),
        })
    }

    // ========== Restaurant profile ==========

    pub async fn restaurant(&self, tenant_id: &str) -> AppResult<Restaurant> {
        self.restaurants
            .find(tenant_id)
            .await?
            .ok_or_else(|| AppError::with_message(ErrorCode::TenantNotFound, "Restaurant not found"))
    }

    pub async fn save_restaurant(
        &self,
        tenant_id: &str,
        payload: RestaurantUpsert,
        now: i64,
    ) -> AppResult<Restaurant> {
        validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
        validate_optional_text(&payload.outlet, "outlet", MAX_NAME_LEN)?;
        let saved = self
            .restaurants
            .upsert(Restaurant {
                id: None,
                tenant_id: tenant_id.to_string(),
                name: payload.name.trim().to_string(),
                outlet: payload.outlet,
                updated_at: now,
            })
            .await?;
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::services::testing::MemoryObjectStore;

    const TENANT: &str = "tenant-a";
    const NOW: i64 = 1_700_000_000_000;

    fn form(pricing: &str) -> ProductForm {
        ProductForm {
            category: Some("Mains".into()),
            item_name: Some("Dal Makhani".into()),
            pricing_type: Some(pricing.into()),
            product_type: Some("veg".into()),
            unit_type: Some("bowl".into()),
            variants: Some(r#"[{"name":"Half","price":120},{"name":"Full"}]"#.into()),
            ..Default::default()
        }
    }

    async fn service() -> (CatalogService, Arc<MemoryObjectStore>) {
        let db = DbService::memory().await.unwrap().db;
        let store = Arc::new(MemoryObjectStore::default());
        (CatalogService::new(db, store.clone()), store)
    }

    fn png(bytes: &[u8]) -> ImageUpload {
        ImageUpload {
            bytes: bytes.to_vec(),
            content_type: "image/png".into(),
        }
    }

    #[test]
    fn mrp_selling_above_mrp_rejected_on_create() {
        let mut f = form("mrpBased");
        f.mrp = Some("100".into());
        f.selling_price = Some("150".into());
        let err = f.into_create().unwrap_err();
        assert_eq!(err.code, ErrorCode::ProductInvalidPrice);
    }

    #[test]
    fn base_price_required_for_base_pricing() {
        let err = form("basePrice").into_create().unwrap_err();
        assert_eq!(err.code, ErrorCode::ProductInvalidPrice);

        let mut f = form("basePrice");
        f.base_price = Some("80.5".into());
        let created = f.into_create().unwrap();
        assert_eq!(created.base_price, Some(80.5));
        assert_eq!(created.variants.len(), 2);
        assert_eq!(created.variants[1].price, None);
    }

    #[test]
    fn missing_required_field_is_rejected() {
        let mut f = form("basePrice");
        f.base_price = Some("10".into());
        f.unit_type = None;
        let err = f.into_create().unwrap_err();
        assert_eq!(err.code, ErrorCode::RequiredField);
    }

    #[test]
    fn malformed_variants_are_rejected() {
        let mut f = form("basePrice");
        f.base_price = Some("10".into());
        f.variants = Some("not json".into());
        assert_eq!(f.into_create().unwrap_err().code, ErrorCode::InvalidFormat);
    }

    #[test]
    fn image_validation() {
        assert_eq!(png(b"").validate().unwrap_err().code, ErrorCode::EmptyFile);
        let pdf = ImageUpload {
            bytes: vec![1],
            content_type: "application/pdf".into(),
        };
        assert_eq!(pdf.validate().unwrap_err().code, ErrorCode::UnsupportedFileFormat);
        let big = png(&vec![0u8; MAX_IMAGE_SIZE + 1]);
        assert_eq!(big.validate().unwrap_err().code, ErrorCode::FileTooLarge);
        assert!(png(b"x").object_key("t1").starts_with("products/t1/"));
        assert!(png(b"x").object_key("t1").ends_with(".png"));
    }

    #[tokio::test]
    async fn mrp_selling_above_mrp_rejected_on_update() {
        let (svc, _) = service().await;
        let mut f = form("mrpBased");
        f.mrp = Some("100".into());
        f.selling_price = Some("90".into());
        let product = svc.create(TENANT, f, None, NOW).await.unwrap();
        let id = product.id.unwrap().to_string();

        let patch = ProductForm {
            selling_price: Some("150".into()),
            ..Default::default()
        };
        let err = svc.update(TENANT, &id, patch, None, NOW).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ProductInvalidPrice);
    }

    #[tokio::test]
    async fn stock_windows_drive_availability() {
        let (svc, _) = service().await;
        let mut f = form("basePrice");
        f.base_price = Some("10".into());
        let product = svc.create(TENANT, f, None, NOW).await.unwrap();
        let id = product.id.unwrap().to_string();

        let out = StockUpdate {
            in_stock: false,
            duration: Some("2h".into()),
        };
        let updated = svc.set_stock(TENANT, &id, out, NOW).await.unwrap();
        assert_eq!(updated.out_of_stock_until, Some(NOW + 2 * 60 * 60 * 1000));

        // 窗口内不可售，窗口结束后可售
        assert!(!svc.check_availability(&id, NOW + 1).await.unwrap().is_available);
        assert!(
            svc.check_availability(&id, NOW + 3 * 60 * 60 * 1000)
                .await
                .unwrap()
                .is_available
        );

        let back = StockUpdate {
            in_stock: true,
            duration: None,
        };
        let updated = svc.set_stock(TENANT, &id, back, NOW).await.unwrap();
        assert!(updated.in_stock);
        assert_eq!(updated.out_of_stock_until, None);
    }

    #[tokio::test]
    async fn unknown_stock_duration_is_rejected() {
        let (svc, _) = service().await;
        let mut f = form("basePrice");
        f.base_price = Some("10".into());
        let product = svc.create(TENANT, f, None, NOW).await.unwrap();
        let id = product.id.unwrap().to_string();
        let err = svc
            .set_stock(
                TENANT,
                &id,
                StockUpdate {
                    in_stock: false,
                    duration: Some("3days".into()),
                },
                NOW,
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidStockDuration);
    }

    #[tokio::test]
    async fn image_replacement_deletes_old_object() {
        let (svc, store) = service().await;
        let mut f = form("basePrice");
        f.base_price = Some("10".into());
        let product = svc.create(TENANT, f, Some(png(b"first")), NOW).await.unwrap();
        let old_key = product.image_key.clone().unwrap();
        assert!(store.contains(&old_key));

        let id = product.id.unwrap().to_string();
        let updated = svc
            .update(TENANT, &id, ProductForm::default(), Some(png(b"second")), NOW)
            .await
            .unwrap();
        assert_ne!(updated.image_key.as_deref(), Some(old_key.as_str()));
        assert!(!store.contains(&old_key));
        assert!(store.contains(updated.image_key.as_deref().unwrap()));
    }

    #[tokio::test]
    async fn shared_image_survives_until_last_product_releases_it() {
        let (svc, store) = service().await;
        let mut a = form("basePrice");
        a.base_price = Some("10".into());
        let pa = svc.create(TENANT, a, Some(png(b"same")), NOW).await.unwrap();
        let mut b = form("basePrice");
        b.base_price = Some("12".into());
        b.item_name = Some("Paneer Tikka".into());
        let pb = svc.create(TENANT, b, Some(png(b"same")), NOW).await.unwrap();
        let key = pa.image_key.clone().unwrap();
        assert_eq!(pb.image_key.as_deref(), Some(key.as_str()));

        // 替换 A 的图片不影响 B
        let a_id = pa.id.unwrap().to_string();
        svc.update(TENANT, &a_id, ProductForm::default(), Some(png(b"other")), NOW)
            .await
            .unwrap();
        assert!(store.contains(&key));

        // 重新引用后删除 A，B 仍在使用
        svc.update(TENANT, &a_id, ProductForm::default(), Some(png(b"same")), NOW)
            .await
            .unwrap();
        svc.delete(TENANT, &a_id).await.unwrap();
        assert!(store.contains(&key));

        svc.delete(TENANT, &pb.id.unwrap().to_string()).await.unwrap();
        assert!(!store.contains(&key));
    }

    #[tokio::test]
    async fn switching_pricing_type_clears_other_prices() {
        let (svc, _) = service().await;
        let mut f = form("mrpBased");
        f.mrp = Some("100".into());
        f.selling_price = Some("90".into());
        let product = svc.create(TENANT, f, None, NOW).await.unwrap();
        let id = product.id.unwrap().to_string();

        let patch = ProductForm {
            pricing_type: Some("basePrice".into()),
            base_price: Some("85".into()),
            ..Default::default()
        };
        let updated = svc.update(TENANT, &id, patch, None, NOW).await.unwrap();
        assert_eq!(updated.pricing_type, PricingType::BasePrice);
        assert_eq!(updated.base_price, Some(85.0));
        assert_eq!(updated.mrp, None);
        assert_eq!(updated.selling_price, None);

        let item = PublicMenuItem::from(updated);
        let json = serde_json::to_value(&item).unwrap();
        assert!(json.get("mrp").is_none());
        assert!(json.get("selling_price").is_none());

        // 同一定价方式内的部分更新保持其余价格
        let patch = ProductForm {
            base_price: Some("95".into()),
            ..Default::default()
        };
        let updated = svc.update(TENANT, &id, patch, None, NOW).await.unwrap();
        assert_eq!(updated.base_price, Some(95.0));
    }

    #[tokio::test]
    async fn failed_old_image_delete_is_swallowed() {
        let (svc, store) = service().await;
        let mut f = form("basePrice");
        f.base_price = Some("10".into());
        let product = svc.create(TENANT, f, Some(png(b"img")), NOW).await.unwrap();
        store.fail_deletes();

        let id = product.id.unwrap().to_string();
        svc.delete(TENANT, &id).await.unwrap();
        assert!(svc.list(TENANT).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn public_menu_requires_restaurant_and_hides_unavailable() {
        let (svc, _) = service().await;
        let err = svc.public_menu(TENANT, NOW).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::TenantNotFound);

        svc.save_restaurant(
            TENANT,
            RestaurantUpsert {
                name: "Spice Route".into(),
                outlet: Some("MG Road".into()),
            },
            NOW,
        )
        .await
        .unwrap();

        let mut a = form("basePrice");
        a.base_price = Some("10".into());
        a.item_name = Some("Zeera Rice".into());
        svc.create(TENANT, a, None, NOW).await.unwrap();

        let mut b = form("basePrice");
        b.base_price = Some("10".into());
        b.item_name = Some("Aloo Gobi".into());
        svc.create(TENANT, b, None, NOW).await.unwrap();

        let mut c = form("basePrice");
        c.base_price = Some("10".into());
        c.category = Some("Desserts".into());
        let hidden = svc.create(TENANT, c, None, NOW).await.unwrap();
        svc.set_stock(
            TENANT,
            &hidden.id.unwrap().to_string(),
            StockUpdate {
                in_stock: false,
                duration: None,
            },
            NOW,
        )
        .await
        .unwrap();

        let menu = svc.public_menu(TENANT, NOW).await.unwrap();
        assert_eq!(menu.restaurant_info.name, "Spice Route");
        assert_eq!(menu.menu.len(), 1);
        let mains: Vec<_> = menu.menu["Mains"].iter().map(|p| p.item_name.as_str()).collect();
        assert_eq!(mains, vec!["Aloo Gobi", "Zeera Rice"]);
    }
}
