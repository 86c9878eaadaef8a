//! Routers wired to the in-memory adapters.

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use tower::ServiceExt;

use crate::application::ports::user_repository::UserRow;
use crate::application::testing::{BASE_URL, MemoryImageStorage, MemoryStore};
use crate::bootstrap::app_context::{AppContext, AppServices};
use crate::bootstrap::config::Config;
use crate::domain::users::user::Role;
use crate::presentation::http::auth::issue_token;

pub fn test_config() -> Config {
    Config {
        api_port: 8080,
        frontend_url: None,
        database_url: "mysql://localhost/pocopi_test".into(),
        database_max_connections: 1,
        jwt_secret: "test-secret-with-enough-entropy".into(),
        jwt_expires_secs: 3600,
        images_base_path: "./uploads".into(),
        images_base_url: BASE_URL.into(),
        upload_max_bytes: 1024 * 1024,
        is_production: false,
    }
}

pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub storage: Arc<MemoryImageStorage>,
    pub ctx: AppContext,
}

impl TestApp {
    pub fn new(anonymous: bool) -> Self {
        let store = Arc::new(MemoryStore::with_active_config(anonymous));
        let storage = Arc::new(MemoryImageStorage::default());
        let services = AppServices::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            storage.clone(),
            store.clone(),
        );
        let ctx = AppContext::new(test_config(), services);
        Self {
            store,
            storage,
            ctx,
        }
    }

    pub fn user(&self, username: &str, role: Role) -> (UserRow, String) {
        let row = self.store.add_user(username, role, "unused-hash");
        let token = issue_token(&self.ctx.cfg, row.id).unwrap();
        (row, token)
    }
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn empty_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

/// Sends the request and decodes the body as JSON (`Null` when empty).
pub async fn send(router: Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
    let res = router.oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}
