//! Shared harness for the HTTP integration tests.
//!
//! Each test gets a fully wired server on an ephemeral port, backed by a
//! throwaway SQLite file and a wiremock stand-in for the OSV API.

use reqwest::multipart;
use tempfile::TempDir;
use wiremock::MockServer;

use vulntrack::{Config, create_app};

/// The manifest used by most tests: one pinned and one ranged dependency.
pub const SAMPLE_MANIFEST: &str = "fastapi==0.103.0\nuvicorn>=0.23.0,<0.24.0\n";

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
    pub osv_server: MockServer,
    // Dropped with the app; keeps the database file alive for the test.
    _db_dir: TempDir,
}

pub async fn spawn_app() -> TestApp {
    let osv_server = MockServer::start().await;
    let db_dir = TempDir::new().expect("failed to create temp dir");

    let mut config = Config::default();
    config.database.url = format!(
        "sqlite://{}/vulntrack-test.db",
        db_dir.path().to_string_lossy()
    );
    config.database.max_connections = 1;
    config.osv.base_url = osv_server.uri();
    config.server.enable_docs = false;

    let router = create_app(config).await.expect("failed to create app");

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind test listener");
    let address = format!("http://{}", listener.local_addr().expect("no local addr"));

    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server error");
    });

    TestApp {
        address,
        client: reqwest::Client::new(),
        osv_server,
        _db_dir: db_dir,
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// POST /application with the multipart ingestion form.
    pub async fn ingest(
        &self,
        name: &str,
        description: &str,
        manifest: &str,
    ) -> reqwest::Response {
        self.ingest_form(name, description, manifest, None).await
    }

    pub async fn ingest_lenient(
        &self,
        name: &str,
        description: &str,
        manifest: &str,
    ) -> reqwest::Response {
        self.ingest_form(name, description, manifest, Some("true"))
            .await
    }

    async fn ingest_form(
        &self,
        name: &str,
        description: &str,
        manifest: &str,
        lenient: Option<&str>,
    ) -> reqwest::Response {
        let file = multipart::Part::bytes(manifest.as_bytes().to_vec())
            .file_name("requirements.txt")
            .mime_str("text/plain")
            .expect("invalid mime type");

        let mut form = multipart::Form::new()
            .text("name", name.to_string())
            .text("description", description.to_string())
            .part("requirements", file);
        if let Some(value) = lenient {
            form = form.text("lenient", value.to_string());
        }

        self.client
            .post(self.url("/application"))
            .multipart(form)
            .send()
            .await
            .expect("ingest request failed")
    }
}
