#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use serde_json::Value;
use social_api::{
    AppState, Config, app, auth::create_token, media::InMemoryMediaStore, models::User, router,
};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

pub const SECRET: &str = "integration-secret";
pub const PNG: &str = "data:image/png;base64,iVBORw0KGgo=";

pub struct TestApp {
    pub state: AppState,
    pub media: Arc<InMemoryMediaStore>,
    pub router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        let media = Arc::new(InMemoryMediaStore::new("http://localhost:3000/media"));
        let state = AppState::new(SECRET, media.clone());
        let router = router(state.clone());

        Self {
            state,
            media,
            router,
        }
    }

    /// Same state, but served through the production middleware stack.
    pub fn with_middleware() -> Self {
        let mut test_app = Self::new();
        let config = Config::from_lookup(|key| match key {
            "JWT_SECRET" => Some(SECRET.to_string()),
            _ => None,
        })
        .unwrap();
        test_app.router = app(test_app.state.clone(), &config);

        test_app
    }

    /// Inserts a user directly and returns its id and a bearer token.
    pub fn seed_user(&self, username: &str) -> (Uuid, String) {
        let email = format!("{username}@example.com");
        let user = User::new(email.clone(), username.to_string(), "unused".into());
        let id = user.id;
        self.state.register_user(user).unwrap();

        (id, create_token(&id, &email, SECRET).unwrap())
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&json).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        (status, json)
    }

    /// Sends `body` verbatim, with the given content type if any.
    pub async fn send_raw(
        &self,
        method: Method,
        uri: &str,
        token: &str,
        content_type: Option<&str>,
        body: &str,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"));

        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }

        let request = builder.body(Body::from(body.to_string())).unwrap();
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(token), Some(body)).await
    }

    /// Creates a text post through the API and returns its id.
    pub async fn create_text_post(&self, token: &str, text: &str) -> Uuid {
        let (status, body) = self
            .post("/api/posts/create", token, serde_json::json!({ "text": text }))
            .await;
        assert_eq!(status, StatusCode::CREATED);

        body["_id"].as_str().unwrap().parse().unwrap()
    }
}
