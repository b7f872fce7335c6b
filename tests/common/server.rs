//! Test server lifecycle management
//!
//! This module manages spawning and shutting down test HTTP servers.
//! Each test gets an isolated server with its own databases and its own
//! fake metadata provider.

use super::constants::*;
use super::fixtures::{create_test_catalog, FakeProviderServer};
use movie_catalog_server::catalog_service::CatalogService;
use movie_catalog_server::catalog_store::SqliteCatalogStore;
use movie_catalog_server::enrichment::EnrichmentEngine;
use movie_catalog_server::metadata::{OmdbClient, TmdbClient};
use movie_catalog_server::server::{make_app, RequestsLoggingLevel, ServerConfig};
use movie_catalog_server::user_content::SqliteUserContentStore;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Test server instance with isolated catalog and user databases
///
/// When dropped, the server gracefully shuts down and temp resources are cleaned up.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    pub port: u16,

    /// Catalog store for direct database access in tests
    pub catalog_store: Arc<SqliteCatalogStore>,

    /// Fake provider the enrichment engine talks to
    pub providers: FakeProviderServer,

    // Private fields - keep resources alive until drop
    _temp_catalog_dir: TempDir,
    _temp_user_dir: TempDir,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a new test server on a random port with token checks disabled
    pub async fn spawn() -> Self {
        Self::spawn_with_jwt_secret(None).await
    }

    /// Spawns a new test server that requires tokens signed with `JWT_SECRET`
    pub async fn spawn_with_token_validation() -> Self {
        Self::spawn_with_jwt_secret(Some(JWT_SECRET.to_string())).await
    }

    /// # Panics
    ///
    /// Panics if the databases cannot be created, the port cannot be bound,
    /// or the server doesn't become ready within timeout.
    async fn spawn_with_jwt_secret(jwt_secret: Option<String>) -> Self {
        let providers = FakeProviderServer::spawn().await;

        let (temp_catalog_dir, catalog_db_path) =
            create_test_catalog().expect("Failed to create test catalog");
        let catalog_store = Arc::new(
            SqliteCatalogStore::new(&catalog_db_path).expect("Failed to open catalog store"),
        );

        let temp_user_dir = TempDir::new().expect("Failed to create user db dir");
        let user_content_store = Arc::new(
            SqliteUserContentStore::new(temp_user_dir.path().join("user.db"))
                .expect("Failed to open user content store"),
        );

        let omdb = Arc::new(
            OmdbClient::new(Some(providers.base_url.clone()), "omdb-key".to_string(), 5)
                .expect("Failed to build OMDb client"),
        );
        let tmdb = Arc::new(
            TmdbClient::new(Some(providers.base_url.clone()), "tmdb-key".to_string(), 5)
                .expect("Failed to build TMDB client"),
        );
        let engine = Arc::new(EnrichmentEngine::new(
            catalog_store.clone(),
            omdb,
            tmdb.clone(),
            tmdb,
        ));
        let catalog_service = Arc::new(CatalogService::new(
            catalog_store.clone(),
            user_content_store,
            engine,
        ));

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();
        let base_url = format!("http://127.0.0.1:{}", port);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let config = ServerConfig {
            port,
            requests_logging_level: RequestsLoggingLevel::None,
            content_cache_age_sec: 0, // Disable caching in tests
            jwt_secret,
            ..Default::default()
        };
        let app = make_app(config, catalog_service);

        // Spawn server in background task with graceful shutdown
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            port,
            catalog_store,
            providers,
            _temp_catalog_dir: temp_catalog_dir,
            _temp_user_dir: temp_user_dir,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Waits for the server to become ready by polling the / endpoint
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => return,
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
