mod common;

use common::{TENANT, TestApp, key_of};
use http::{Method, StatusCode};
use serde_json::json;

const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 1, 2, 3, 4];

fn base_fields<'a>(extra: &[(&'a str, &'a str)]) -> Vec<(&'a str, &'a str)> {
    let mut fields = vec![
        ("category", "Starters"),
        ("itemName", "Veg Spring Roll"),
        ("type", "veg"),
        ("unitType", "plate"),
        ("variants", "[]"),
    ];
    fields.extend_from_slice(extra);
    fields
}

#[tokio::test]
async fn mrp_pricing_is_validated_on_create_and_update() {
    let app = TestApp::new().await;

    let (status, err) = app
        .multipart(
            Method::POST,
            "/api/products",
            TENANT,
            &base_fields(&[("pricingType", "mrpBased"), ("mrp", "100"), ("sellingPrice", "150")]),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{err}");

    let (status, product) = app
        .multipart(
            Method::POST,
            "/api/products",
            TENANT,
            &base_fields(&[("pricingType", "mrpBased"), ("mrp", "100"), ("sellingPrice", "90")]),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{product}");

    let uri = format!("/api/products/{}", key_of(product["id"].as_str().unwrap()));
    let (status, _) = app
        .multipart(Method::PUT, &uri, TENANT, &[("sellingPrice", "150")], None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, updated) = app
        .multipart(Method::PUT, &uri, TENANT, &[("sellingPrice", "80")], None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["selling_price"], 80.0);
}

#[tokio::test]
async fn unknown_form_field_is_rejected() {
    let app = TestApp::new().await;
    let (status, _) = app
        .multipart(
            Method::POST,
            "/api/products",
            TENANT,
            &base_fields(&[("pricingType", "basePrice"), ("basePrice", "50"), ("tenant_id", "x")]),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn image_upload_and_replacement() {
    let app = TestApp::new().await;
    let (status, product) = app
        .multipart(
            Method::POST,
            "/api/products",
            TENANT,
            &base_fields(&[("pricingType", "basePrice"), ("basePrice", "120")]),
            Some(("image/png", PNG)),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{product}");
    let first_key = product["image_key"].as_str().unwrap().to_string();
    assert!(first_key.starts_with("products/tenant-a/"));
    assert!(app.store.contains(&first_key));

    let uri = format!("/api/products/{}", key_of(product["id"].as_str().unwrap()));
    let (status, updated) = app
        .multipart(Method::PUT, &uri, TENANT, &[], Some(("image/png", b"another image")))
        .await;
    assert_eq!(status, StatusCode::OK);
    let new_key = updated["image_key"].as_str().unwrap();
    assert_ne!(new_key, first_key);
    assert!(!app.store.contains(&first_key));

    let (status, _) = app
        .multipart(Method::PUT, &uri, TENANT, &[], Some(("text/plain", b"hello")))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.delete(&uri, Some(TENANT)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(app.store.is_empty());
}

#[tokio::test]
async fn stock_window_drives_public_menu_and_availability() {
    let app = TestApp::new().await;
    let (status, _) = app
        .json(Method::PUT, "/api/restaurant", Some(TENANT), json!({ "name": "Spice Route", "outlet": "MG Road" }))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, product) = app
        .multipart(
            Method::POST,
            "/api/products",
            TENANT,
            &base_fields(&[("pricingType", "basePrice"), ("basePrice", "60")]),
            None,
        )
        .await;
    let key = key_of(product["id"].as_str().unwrap());

    let (status, menu) = app.get(&format!("/api/public/menu/{TENANT}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(menu["restaurant_info"]["name"], "Spice Route");
    assert_eq!(menu["menu"]["Starters"].as_array().unwrap().len(), 1);
    assert!(menu["menu"]["Starters"][0].get("tenant_id").is_none());

    let (status, _) = app
        .json(
            Method::PATCH,
            &format!("/api/products/{key}/stock"),
            Some(TENANT),
            json!({ "in_stock": false, "duration": "2h" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, availability) = app
        .get(&format!("/api/public/products/{key}/availability"), None)
        .await;
    assert_eq!(availability["is_available"], false);

    let (_, menu) = app.get(&format!("/api/public/menu/{TENANT}"), None).await;
    assert!(menu["menu"].get("Starters").is_none());

    let (status, _) = app
        .json(
            Method::PATCH,
            &format!("/api/products/{key}/stock"),
            Some(TENANT),
            json!({ "in_stock": false, "duration": "3d" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, restocked) = app
        .json(Method::PATCH, &format!("/api/products/{key}/stock"), Some(TENANT), json!({ "in_stock": true }))
        .await;
    assert_eq!(restocked["out_of_stock_until"], serde_json::Value::Null);
    let (_, availability) = app
        .get(&format!("/api/public/products/{key}/availability"), None)
        .await;
    assert_eq!(availability["is_available"], true);
}
