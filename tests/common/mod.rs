//! Common test utilities - ForumTest harness for end-to-end testing

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use reqwest::{redirect, Client};
use themetog::{Config, Server};
use tokio::task::JoinHandle;

/// Test harness that spawns a real themetog server on a random port
pub struct ForumTest {
    pub addr: SocketAddr,
    pub client: Client,
    server: Arc<Server>,
    _handle: JoinHandle<()>,
}

/// A registered member and their bearer token
pub struct TestMember {
    pub id: i64,
    pub token: String,
}

impl ForumTest {
    /// Start a server with caching enabled
    pub async fn start() -> Result<Self> {
        Self::start_with(|_| {}).await
    }

    /// Start a server after adjusting its config
    pub async fn start_with(adjust: impl FnOnce(&mut Config)) -> Result<Self> {
        // Find a random available port
        let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
        let addr = listener.local_addr()?;
        drop(listener);

        let mut config = Config {
            bind_addr: addr,
            db_path: None, // In-memory for tests
            ..Config::default()
        };
        adjust(&mut config);

        let server = Arc::new(Server::new(config).await?);
        let server_clone = server.clone();

        let handle = tokio::spawn(async move {
            if let Err(e) = server_clone.run().await {
                eprintln!("Server error: {}", e);
            }
        });

        // Redirects are asserted on, never followed
        let client = Client::builder()
            .timeout(Duration::from_secs(5))
            .redirect(redirect::Policy::none())
            .build()?;

        // Poll until server is ready (max 2 seconds)
        let mut ready = false;
        for _ in 0..20 {
            tokio::time::sleep(Duration::from_millis(100)).await;
            if client
                .get(format!("http://{}/health", addr))
                .send()
                .await
                .is_ok()
            {
                ready = true;
                break;
            }
        }

        if !ready {
            panic!("Server failed to start within 2 seconds");
        }

        Ok(Self {
            addr,
            client,
            server,
            _handle: handle,
        })
    }

    /// Get the base URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Make a GET request, authenticated when a token is given
    pub async fn get(&self, path: &str, token: Option<&str>) -> Result<reqwest::Response> {
        let mut req = self.client.get(format!("{}{}", self.base_url(), path));
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        Ok(req.send().await?)
    }

    /// Make a POST request with JSON body
    pub async fn post<T: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        token: Option<&str>,
        body: &T,
    ) -> Result<reqwest::Response> {
        let mut req = self
            .client
            .post(format!("{}{}", self.base_url(), path))
            .json(body);
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        Ok(req.send().await?)
    }

    /// Get direct access to the database pool for test setup/assertions
    pub fn pool(&self) -> sqlx::SqlitePool {
        self.server.db().pool().clone()
    }

    /// Install themes 1..=names.len() and configure the toggle between
    /// `guest` and `second` with theme choice allowed
    pub async fn configure(&self, names: &[&str], guest: i64, second: i64) -> Result<()> {
        let pool = self.pool();
        let mut ids = Vec::new();
        for (i, name) in names.iter().enumerate() {
            let id = i as i64 + 1;
            sqlx::query("INSERT INTO themes (id_theme, name) VALUES (?, ?)")
                .bind(id)
                .bind(name)
                .execute(&pool)
                .await?;
            ids.push(id.to_string());
        }
        self.set_setting("known_themes", &ids.join(",")).await?;
        self.set_setting("theme_guests", &guest.to_string()).await?;
        self.set_setting("themetog_second_theme", &second.to_string())
            .await?;
        self.set_setting("theme_allow", "1").await?;
        Ok(())
    }

    /// Write one mod setting
    pub async fn set_setting(&self, variable: &str, value: &str) -> Result<()> {
        sqlx::query("INSERT OR REPLACE INTO settings (variable, value) VALUES (?, ?)")
            .bind(variable)
            .bind(value)
            .execute(&self.pool())
            .await?;
        Ok(())
    }

    /// Register a member through the API
    pub async fn register(&self, username: &str) -> Result<TestMember> {
        let resp = self
            .post(
                "/auth/register",
                None,
                &serde_json::json!({ "username": username, "password": "password123" }),
            )
            .await?;
        anyhow::ensure!(resp.status() == 201, "register failed: {}", resp.status());
        let body: serde_json::Value = resp.json().await?;
        Ok(TestMember {
            id: body["member_id"].as_i64().unwrap_or_default(),
            token: body["token"].as_str().unwrap_or_default().to_string(),
        })
    }

    /// Read a member's stored theme straight from the database
    pub async fn stored_theme(&self, member_id: i64) -> Result<i64> {
        let (theme,): (i64,) = sqlx::query_as("SELECT id_theme FROM members WHERE id_member = ?")
            .bind(member_id)
            .fetch_one(&self.pool())
            .await?;
        Ok(theme)
    }

    /// Overwrite a member's stored theme, bypassing the cache
    pub async fn force_theme(&self, member_id: i64, theme: i64) -> Result<()> {
        sqlx::query("UPDATE members SET id_theme = ? WHERE id_member = ?")
            .bind(theme)
            .bind(member_id)
            .execute(&self.pool())
            .await?;
        Ok(())
    }

    /// Shutdown the server gracefully
    pub fn shutdown(&self) {
        self.server.shutdown();
    }
}

impl Drop for ForumTest {
    fn drop(&mut self) {
        self.server.shutdown();
    }
}
