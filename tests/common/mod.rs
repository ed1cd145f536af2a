use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

use crowdfund_api::config::AppConfig;
use crowdfund_api::database::DatabaseManager;
use crowdfund_api::server::{app, AppState};

pub struct TestServer {
    pub base_url: String,
    pub client: reqwest::Client,
}

impl TestServer {
    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = self.client.get(&url).send().await {
                if resp.status() == StatusCode::OK || resp.status() == StatusCode::SERVICE_UNAVAILABLE {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Registers a fresh account and returns `(user_id, token)`
    pub async fn register(&self, name: &str) -> Result<(i64, String)> {
        let body: Value = self
            .client
            .post(self.url("/api/v1/users"))
            .json(&json!({
                "name": name,
                "occupation": "Tester",
                "email": unique_email(name),
                "password": "secret123",
            }))
            .send()
            .await?
            .json()
            .await?;

        let id = body["data"]["id"].as_i64().context("register response without id")?;
        let token = body["data"]["token"]
            .as_str()
            .context("register response without token")?
            .to_string();
        Ok((id, token))
    }
}

pub fn unique_email(prefix: &str) -> String {
    let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
    format!("{}-{}@example.com", prefix.to_lowercase().replace(' ', "-"), nanos)
}

/// Serves the full router against `DATABASE_URL` on a free port.
/// Returns `None` when no database is configured so the suite can be skipped.
pub async fn spawn_server() -> Result<Option<TestServer>> {
    let _ = dotenvy::dotenv();
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("DATABASE_URL not set, skipping integration test");
        return Ok(None);
    }

    let mut config = AppConfig::from_env();
    config.server.upload_dir = std::env::temp_dir().join(format!("crowdfund-it-{}", std::process::id()));
    config.database.max_connections = 5;
    config.database.min_connections = 0;
    config.server.enable_request_logging = false;

    let database = DatabaseManager::connect(&config.database).await?;
    database.ensure_schema().await?;

    let state = AppState::from_database(&config, database)?;
    let router = app(state, &config);

    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    let server = TestServer {
        base_url: format!("http://127.0.0.1:{}", port),
        client: reqwest::Client::new(),
    };
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(Some(server))
}
