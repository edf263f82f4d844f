#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tower::ServiceExt;

use uuid::Uuid;

use expense_tracker::{
    auth::repo::UserRepository,
    build_app,
    config::{AppConfig, MailConfig},
    memory::MemoryStore,
    notifications::{MailMessage, Mailer},
    AppState,
};

pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://unused".into(),
        database_max_connections: 1,
        app_url: "http://localhost:8080".into(),
        mail: MailConfig {
            from_address: "noreply@expenses.local".into(),
            from_name: "Expense Tracker".into(),
        },
    }
}

/// Forwards every mail to the test.
pub struct ChannelMailer(pub mpsc::UnboundedSender<MailMessage>);

#[async_trait]
impl Mailer for ChannelMailer {
    async fn send(&self, message: MailMessage) -> anyhow::Result<()> {
        self.0.send(message)?;
        Ok(())
    }
}

pub struct FailingMailer;

#[async_trait]
impl Mailer for FailingMailer {
    async fn send(&self, _message: MailMessage) -> anyhow::Result<()> {
        anyhow::bail!("smtp connection refused")
    }
}

pub struct TestApp {
    router: Router,
    store: MemoryStore,
    pub mail: mpsc::UnboundedReceiver<MailMessage>,
}

impl TestApp {
    pub fn new() -> Self {
        let (tx, mail) = mpsc::unbounded_channel();
        Self::build(Arc::new(ChannelMailer(tx)), mail)
    }

    pub fn with_mailer(mailer: Arc<dyn Mailer>) -> Self {
        let (_tx, mail) = mpsc::unbounded_channel();
        Self::build(mailer, mail)
    }

    fn build(mailer: Arc<dyn Mailer>, mail: mpsc::UnboundedReceiver<MailMessage>) -> Self {
        let store = MemoryStore::new();
        let state = AppState::from_store(test_config(), Arc::new(store.clone()), mailer);
        Self {
            router: build_app(state),
            store,
            mail,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        match body {
            Some(body) => {
                self.send_raw(method, uri, token, Some("application/json"), body.to_string())
                    .await
            }
            None => self.send_raw(method, uri, token, None, String::new()).await,
        }
    }

    /// Sends `body` verbatim, with a content type only when given.
    pub async fn send_raw(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        content_type: Option<&str>,
        body: impl Into<String>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }
        let request = builder.body(Body::from(body.into())).unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PATCH, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, Some(token), None).await
    }

    /// Registers a user and returns `(token, user_id)`.
    pub async fn register(&self, name: &str, email: &str) -> (String, Uuid) {
        let (status, body) = self
            .post(
                "/api/register",
                None,
                json!({
                    "name": name,
                    "email": email,
                    "password": "secret",
                    "c_password": "secret",
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        let token = body["data"]["token"].as_str().unwrap().to_string();

        let user = self
            .store
            .find_by_email(email)
            .await
            .unwrap()
            .expect("registered user");
        (token, user.id)
    }

    /// Files an expense for `user_id` and returns its resource.
    pub async fn create_expense(&self, token: &str, user_id: Uuid, value: Value) -> Value {
        let (status, body) = self
            .post(
                "/api/expenses",
                Some(token),
                json!({
                    "description": "Mercado",
                    "value": value,
                    "date": today(),
                    "user_id": user_id,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["data"].clone()
    }

    pub async fn next_mail(&mut self) -> MailMessage {
        tokio::time::timeout(Duration::from_secs(2), self.mail.recv())
            .await
            .expect("no mail delivered")
            .expect("mail channel closed")
    }
}

pub fn today() -> String {
    time::OffsetDateTime::now_utc().date().to_string()
}

pub fn tomorrow() -> String {
    (time::OffsetDateTime::now_utc().date() + time::Duration::days(1)).to_string()
}
