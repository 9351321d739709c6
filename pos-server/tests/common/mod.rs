//! Shared harness for router-level tests
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use pos_server::api::build_app;
use pos_server::db::DbService;
use pos_server::services::testing::{FakeGateway, MemoryObjectStore};
use pos_server::{Config, ServerState};

pub const TENANT: &str = "tenant-a";
pub const OTHER_TENANT: &str = "tenant-b";

pub struct TestApp {
    pub app: Router,
    pub state: ServerState,
    pub store: Arc<MemoryObjectStore>,
    pub gateway: Arc<FakeGateway>,
    _work_dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        let work_dir = tempfile::tempdir().unwrap();
        let config = Config::for_tests(work_dir.path().to_string_lossy());
        let db = DbService::memory().await.unwrap().db;
        let store = Arc::new(MemoryObjectStore::default());
        let gateway = Arc::new(FakeGateway::default());
        let state = ServerState::new(config, db, store.clone(), gateway.clone());
        Self {
            app: build_app(state.clone()),
            state,
            store,
            gateway,
            _work_dir: work_dir,
        }
    }

    pub fn token(&self, tenant_id: &str) -> String {
        self.state
            .jwt_service
            .generate_token("user-1", tenant_id, chrono::Duration::minutes(10))
            .unwrap()
    }

    pub async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        let resp = self.app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
        };
        (status, body)
    }

    fn builder(&self, method: Method, uri: &str, tenant: Option<&str>) -> http::request::Builder {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(t) = tenant {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", self.token(t)));
        }
        builder
    }

    pub async fn get(&self, uri: &str, tenant: Option<&str>) -> (StatusCode, Value) {
        let req = self.builder(Method::GET, uri, tenant).body(Body::empty()).unwrap();
        self.send(req).await
    }

    pub async fn delete(&self, uri: &str, tenant: Option<&str>) -> (StatusCode, Value) {
        let req = self.builder(Method::DELETE, uri, tenant).body(Body::empty()).unwrap();
        self.send(req).await
    }

    pub async fn json(&self, method: Method, uri: &str, tenant: Option<&str>, body: Value) -> (StatusCode, Value) {
        let req = self
            .builder(method, uri, tenant)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(req).await
    }

    /// multipart/form-data with text fields and an optional `image` file part
    pub async fn multipart(
        &self,
        method: Method,
        uri: &str,
        tenant: &str,
        fields: &[(&str, &str)],
        image: Option<(&str, &[u8])>,
    ) -> (StatusCode, Value) {
        const BOUNDARY: &str = "----pos-test-boundary";
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                    .as_bytes(),
            );
        }
        if let Some((content_type, bytes)) = image {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"dish.png\"\r\nContent-Type: {content_type}\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        let req = self
            .builder(method, uri, Some(tenant))
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
            .body(Body::from(body))
            .unwrap();
        self.send(req).await
    }

    /// Create a table and return its id
    pub async fn create_table(&self, tenant: &str, number: i64) -> String {
        let (status, body) = self
            .json(Method::POST, "/api/tables", Some(tenant), serde_json::json!({ "table_number": number }))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["id"].as_str().unwrap().to_string()
    }
}

/// Bare record key from a "table:key" id, safe to put in a URL path
pub fn key_of(id: &str) -> String {
    id.split_once(':')
        .map_or(id, |(_, key)| key)
        .trim_start_matches('⟨')
        .trim_end_matches('⟩')
        .to_string()
}
