//! Test server management.
//!
//! Spawns and manages activity-registry instances for integration testing.

use std::path::{Path, PathBuf};
use std::process::{Child, Command};
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::sleep;

/// Password written into every test config.
pub const TEST_ADMIN_PASSWORD: &str = "integration-secret";

/// A test server instance.
pub struct TestServer {
    child: Child,
    port: u16,
    data_dir: TempDir,
    config_path: PathBuf,
    env: Vec<(String, String)>,
}

impl TestServer {
    /// Spawn a server on a free port with a fresh database.
    pub async fn spawn() -> anyhow::Result<Self> {
        Self::spawn_with_env(&[]).await
    }

    /// Spawn a server with extra environment variables set.
    pub async fn spawn_with_env(env: &[(&str, &str)]) -> anyhow::Result<Self> {
        let data_dir = tempfile::tempdir()?;
        let port = free_port()?;
        let config_path = write_config(&data_dir, port)?;
        Self::start(data_dir, port, config_path, env).await
    }

    async fn start(
        data_dir: TempDir,
        port: u16,
        config_path: PathBuf,
        env: &[(&str, &str)],
    ) -> anyhow::Result<Self> {
        let env: Vec<(String, String)> = env
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let child = launch(&config_path, &env)?;

        let server = Self {
            child,
            port,
            data_dir,
            config_path,
            env,
        };

        // Wait for server to start listening
        server.wait_until_ready().await?;

        Ok(server)
    }

    /// Wait until the server is accepting connections.
    async fn wait_until_ready(&self) -> anyhow::Result<()> {
        for _ in 0..50 {
            if tokio::net::TcpStream::connect(("127.0.0.1", self.port))
                .await
                .is_ok()
            {
                return Ok(());
            }
            sleep(Duration::from_millis(100)).await;
        }
        anyhow::bail!("Server failed to start within 5 seconds")
    }

    /// Stop the process and start it again against the same config and database.
    pub async fn restart(&mut self) -> anyhow::Result<()> {
        self.child.kill()?;
        self.child.wait()?;
        self.child = launch(&self.config_path, &self.env)?;
        self.wait_until_ready().await
    }

    /// Base URL of the API.
    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// Directory holding the config and database for this instance.
    pub fn data_dir(&self) -> &Path {
        self.data_dir.path()
    }

    /// Create a client for this server.
    pub fn client(&self) -> super::client::TestClient {
        super::client::TestClient::new(self.base_url())
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        // Kill the server process; the temp dir removes itself.
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

fn launch(config_path: &Path, env: &[(String, String)]) -> anyhow::Result<Child> {
    let mut command = Command::new(env!("CARGO_BIN_EXE_activity-registry"));
    command
        .arg(config_path)
        .env_remove("ACTIVITY_REGISTRY_DATABASE")
        .env_remove("ACTIVITY_REGISTRY_ADMIN_PASSWORD")
        .env("RUST_LOG", "warn");
    for (key, value) in env {
        command.env(key, value);
    }
    Ok(command.spawn()?)
}

/// Ask the OS for an unused port.
fn free_port() -> anyhow::Result<u16> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    Ok(listener.local_addr()?.port())
}

fn write_config(data_dir: &TempDir, port: u16) -> anyhow::Result<PathBuf> {
    let config_path = data_dir.path().join("config.toml");
    let db_path = data_dir.path().join("registry.db");
    let config_content = format!(
        r#"
[server]
listen = "127.0.0.1:{port}"
metrics_port = 0

[database]
path = "{db}"

[admin]
password = "{TEST_ADMIN_PASSWORD}"

[cors]
allowed_origins = ["http://localhost:3000"]
"#,
        db = db_path.display()
    );

    std::fs::write(&config_path, config_content)?;
    Ok(config_path)
}
