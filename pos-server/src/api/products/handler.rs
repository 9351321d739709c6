//! Product API Handlers

use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};

use crate::api::extract::AppJson;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Product, StockUpdate};
use crate::services::catalog::{ImageUpload, ProductForm};
use crate::utils::time::now_millis;
use crate::utils::{AppError, AppResult};

/// 解析 multipart 表单
///
/// 只接受已知字段名 (snake_case 或 camelCase)；`image` 为文件字段，
/// 未选择文件的空 part 视为没有图片。
async fn read_form(mut multipart: Multipart) -> AppResult<(ProductForm, Option<ImageUpload>)> {
    let mut form = ProductForm::default();
    let mut image = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::invalid_request(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == "image" {
            let no_file = field.file_name().is_none_or(str::is_empty);
            let content_type = field.content_type().unwrap_or_default().to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::invalid_request(e.body_text()))?;
            if bytes.is_empty() && no_file {
                continue;
            }
            image = Some(ImageUpload {
                bytes: bytes.to_vec(),
                content_type,
            });
            continue;
        }

        let slot = match name.as_str() {
            "category" => &mut form.category,
            "item_name" | "itemName" => &mut form.item_name,
            "pricing_type" | "pricingType" => &mut form.pricing_type,
            "base_price" | "basePrice" => &mut form.base_price,
            "mrp" => &mut form.mrp,
            "selling_price" | "sellingPrice" => &mut form.selling_price,
            "type" => &mut form.product_type,
            "unit_type" | "unitType" => &mut form.unit_type,
            "variants" => &mut form.variants,
            other => {
                return Err(AppError::invalid_request(format!("Unknown form field: {other}")));
            }
        };
        let value = field
            .text()
            .await
            .map_err(|e| AppError::invalid_request(e.body_text()))?;
        *slot = Some(value);
    }

    Ok((form, image))
}

/// GET /api/products - 租户全部菜品 (最新在前)
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<Product>>> {
    let products = state.catalog.list(&user.tenant_id).await?;
    Ok(Json(products))
}

/// POST /api/products (multipart)
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<Product>)> {
    let (form, image) = read_form(multipart).await?;
    let product = state
        .catalog
        .create(&user.tenant_id, form, image, now_millis())
        .await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// PUT /api/products/:id (multipart, 未提供的字段保持不变)
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    multipart: Multipart,
) -> AppResult<Json<Product>> {
    let (form, image) = read_form(multipart).await?;
    let product = state
        .catalog
        .update(&user.tenant_id, &id, form, image, now_millis())
        .await?;
    Ok(Json(product))
}

/// PATCH /api/products/:id/stock
pub async fn set_stock(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    AppJson(payload): AppJson<StockUpdate>,
) -> AppResult<Json<Product>> {
    let product = state
        .catalog
        .set_stock(&user.tenant_id, &id, payload, now_millis())
        .await?;
    Ok(Json(product))
}

/// DELETE /api/products/:id
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    state.catalog.delete(&user.tenant_id, &id).await?;
    Ok(Json(true))
}
