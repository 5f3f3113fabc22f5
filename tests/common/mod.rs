use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use classdesk::classdesk_auth::create_access_token;
use classdesk::classdesk_config::{CorsConfig, JwtConfig};
use classdesk::classdesk_db::{InMemoryRbacStore, UserRoleStore, seed};
use classdesk::middleware::auth::JwtIdentityProvider;
use classdesk::router::init_router;
use classdesk::state::AppState;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

pub const ADMIN_EMAIL: &str = "admin@test.com";
pub const TEACHER_EMAIL: &str = "teacher@test.com";
pub const STUDENT_EMAIL: &str = "student@test.com";

/// Router over a seeded in-memory store.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryRbacStore>,
    pub jwt_config: JwtConfig,
}

#[allow(dead_code)]
impl TestApp {
    pub async fn seeded() -> Self {
        let store = Arc::new(InMemoryRbacStore::new());
        seed::seed_all(store.as_ref(), false).await.unwrap();

        let jwt_config = JwtConfig {
            secret: "integration-test-secret".to_string(),
            access_token_expiry: 3600,
        };
        let state = AppState::new(
            store.clone(),
            Arc::new(JwtIdentityProvider::new(jwt_config.clone())),
            CorsConfig::default(),
        );

        Self {
            router: init_router(state),
            store,
            jwt_config,
        }
    }

    pub async fn user_id(&self, email: &str) -> Uuid {
        self.store
            .find_user_by_email(email)
            .await
            .unwrap()
            .unwrap_or_else(|| panic!("no seeded user {email}"))
            .id
    }

    pub async fn token_for(&self, email: &str) -> String {
        let user_id = self.user_id(email).await;
        create_access_token(user_id, email, &self.jwt_config).unwrap()
    }

    /// Creates a user with no roles and returns its token.
    pub async fn new_user_token(&self, email: &str) -> (Uuid, String) {
        let user = self.store.upsert_user(email, None).await.unwrap();
        let token = create_access_token(user.id, email, &self.jwt_config).unwrap();
        (user.id, token)
    }

    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }

        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&body).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send("GET", uri, token, None).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send("PUT", uri, token, Some(body)).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send("POST", uri, token, Some(body)).await
    }
}

/// Sorted string values of a JSON array field.
#[allow(dead_code)]
pub fn strings(value: &Value) -> Vec<String> {
    let mut items: Vec<String> = value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();
    items.sort();
    items
}
