#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::StatusCode;
use serde_json::{json, Value};

use sitecms_api::database::MemoryDocumentStore;
use sitecms_api::media::MemoryStorage;
use sitecms_api::services::{AuthService, RegisterInput, Registrar};
use sitecms_api::{app, AppConfig, AppState};

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin-password";

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub media: Arc<MemoryStorage>,
    pub state: AppState,
}

#[derive(Clone, Copy)]
pub struct ServerOptions {
    pub open_registration: bool,
    pub failing_media: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            open_registration: true,
            failing_media: false,
        }
    }
}

impl TestServer {
    /// Serve the real router on a free port, backed by in-memory store and media
    async fn spawn(options: ServerOptions) -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut config = AppConfig::development();
        config.server.host = "127.0.0.1".to_string();
        config.server.port = port;
        config.database.url = "memory://".to_string();
        config.session.secret = "integration-test-secret".to_string();
        config.session.secure_cookie = false;
        config.security.open_registration = options.open_registration;
        config.api.enable_request_logging = false;

        let media = Arc::new(if options.failing_media {
            MemoryStorage::failing()
        } else {
            MemoryStorage::new()
        });
        let state = AppState::new(config, Arc::new(MemoryDocumentStore::new()), media.clone());

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test listener")?;
        let router = app(state.clone());
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                eprintln!("test server stopped: {e}");
            }
        });

        let server = Self {
            port,
            base_url,
            media,
            state,
        };
        server.wait_ready(Duration::from_secs(10)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            if let Ok(resp) = client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

pub async fn spawn_server() -> Result<TestServer> {
    TestServer::spawn(ServerOptions::default()).await
}

pub async fn spawn_server_with(options: ServerOptions) -> Result<TestServer> {
    TestServer::spawn(options).await
}

/// Client that keeps cookies, like the admin dashboard in a browser
pub fn session_client() -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder().cookie_store(true).build()?)
}

pub async fn register(
    client: &reqwest::Client,
    server: &TestServer,
    username: &str,
    password: &str,
    role: &str,
) -> Result<reqwest::Response> {
    Ok(client
        .post(server.url("/api/auth/register"))
        .json(&json!({ "username": username, "password": password, "role": role }))
        .send()
        .await?)
}

pub async fn login(
    client: &reqwest::Client,
    server: &TestServer,
    username: &str,
    password: &str,
) -> Result<reqwest::Response> {
    Ok(client
        .post(server.url("/api/auth/login"))
        .json(&json!({ "username": username, "password": password }))
        .send()
        .await?)
}

/// Bootstrap the admin account the way `create-user` does and return a client
/// holding its session cookie
pub async fn admin_client(server: &TestServer) -> Result<reqwest::Client> {
    AuthService::new(&server.state)
        .register(
            RegisterInput {
                username: Some(ADMIN_USERNAME.to_string()),
                password: Some(ADMIN_PASSWORD.to_string()),
                role: Some("admin".to_string()),
            },
            Registrar::Admin,
        )
        .await
        .map_err(|e| anyhow::anyhow!("bootstrap admin failed: {}", e.message()))?;

    let client = session_client()?;
    let res = login(&client, server, ADMIN_USERNAME, ADMIN_PASSWORD).await?;
    anyhow::ensure!(res.status() == StatusCode::OK, "login failed: {}", res.status());
    Ok(client)
}

/// PNG signature padded to `len` bytes
pub fn png_bytes(len: usize) -> Vec<u8> {
    let mut bytes = b"\x89PNG\r\n\x1a\n".to_vec();
    bytes.resize(len.max(8), 0x42);
    bytes
}

pub fn png_data_url(len: usize) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(png_bytes(len)))
}

pub async fn json_body(res: reqwest::Response) -> Result<Value> {
    Ok(res.json::<Value>().await?)
}
