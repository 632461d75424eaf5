#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use serde_json::{json, Value};
use tokio::net::TcpListener;

use sudanese_house_backend::{
    app::{create_app, AppState},
    auth::seed_admin,
    config::{Environment, LogFormat, Settings},
    storage::{MemoryStorage, Storage},
};

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin-password";

pub struct TestApp {
    pub base_url: String,
    pub client: reqwest::Client,
}

pub fn test_settings() -> Settings {
    Settings {
        env: Environment::Dev,
        log_format: LogFormat::Compact,
        server_addr: "127.0.0.1:0".to_string(),
        database_url: None,
        database_max_connections: 1,
        database_connect_retry_seconds: 1,
        cors_allow_origins: vec!["http://localhost:5000".to_string()],
        jwt_secret: "integration-test-secret".to_string(),
        jwt_ttl_seconds: 3600,
        admin_username: ADMIN_USERNAME.to_string(),
        admin_password: ADMIN_PASSWORD.to_string(),
        admin_email: "admin@example.com".to_string(),
        auto_approve_listings: false,
        request_body_limit_bytes: 64 * 1024,
    }
}

pub async fn start_server() -> anyhow::Result<TestApp> {
    start_with(test_settings(), Arc::new(MemoryStorage::new())).await
}

pub async fn start_with(settings: Settings, storage: Arc<dyn Storage>) -> anyhow::Result<TestApp> {
    seed_admin(storage.as_ref(), &settings).await?;

    let app = create_app(AppState::new(storage, settings));
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            eprintln!("server error: {}", e);
        }
    });

    Ok(TestApp {
        base_url: format!("http://{}:{}", addr.ip(), addr.port()),
        client: reqwest::Client::new(),
    })
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn login(&self, username: &str, password: &str) -> anyhow::Result<String> {
        let res = self
            .client
            .post(self.url("/api/auth/login"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await?;
        anyhow::ensure!(res.status().is_success(), "login failed: {}", res.status());
        let body: Value = res.json().await?;
        Ok(body["data"]["access_token"]
            .as_str()
            .unwrap_or_default()
            .to_string())
    }

    pub async fn admin_token(&self) -> anyhow::Result<String> {
        self.login(ADMIN_USERNAME, ADMIN_PASSWORD).await
    }

    /// Register a plain user and return (token, user id).
    pub async fn register(&self, username: &str) -> anyhow::Result<(String, String)> {
        let res = self
            .client
            .post(self.url("/api/auth/register"))
            .json(&json!({
                "username": username,
                "email": format!("{username}@example.com"),
                "full_name": "Test Member",
                "password": "secret123"
            }))
            .send()
            .await?;
        anyhow::ensure!(res.status().is_success(), "register failed: {}", res.status());
        let body: Value = res.json().await?;
        let token = body["data"]["access_token"].as_str().unwrap_or_default();
        let id = body["data"]["user"]["id"].as_str().unwrap_or_default();
        Ok((token.to_string(), id.to_string()))
    }
}

pub fn product_body(name: &str) -> Value {
    json!({
        "name": name,
        "description": "Freshly made in Kuwait every morning",
        "category": "food",
        "price": "1.500",
        "location": "Hawalli",
        "contact_phone": "+965 5555 1234"
    })
}
