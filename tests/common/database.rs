//! Test application fixtures
//!
//! Every `TestApp` owns a fresh in-memory SQLite database, so tests never
//! see each other's rows.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum_test::TestServer;
use sqlx::SqlitePool;
use tokio::net::TcpListener;

use quill::backend::routes::create_router;
use quill::backend::server::config::{load_database, ServerConfig};
use quill::backend::server::AppState;
use quill::backend::uploads::{MediaError, MediaStore, UploadedFile};

pub const TEST_JWT_SECRET: &str = "quill-test-secret";
pub const MEDIA_BASE_URL: &str = "https://media.test/quill";

/// Configuration for tests: in-memory database, cheap hashing
pub fn test_config() -> ServerConfig {
    ServerConfig {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: TEST_JWT_SECRET.to_string(),
        bcrypt_cost: 4,
        ..ServerConfig::default()
    }
}

/// Media store that keeps uploads in memory
#[derive(Debug, Default)]
pub struct RecordingMediaStore {
    uploads: Mutex<Vec<UploadedFile>>,
}

impl RecordingMediaStore {
    pub fn uploads(&self) -> Vec<UploadedFile> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaStore for RecordingMediaStore {
    async fn store(&self, file: UploadedFile) -> Result<String, MediaError> {
        let url = format!("{}/{}", MEDIA_BASE_URL, file.file_name);
        self.uploads.lock().unwrap().push(file);
        Ok(url)
    }
}

/// A router plus direct handles on its database and media store
pub struct TestApp {
    pub server: TestServer,
    pub pool: SqlitePool,
    pub config: ServerConfig,
    pub media: Arc<RecordingMediaStore>,
}

async fn build_state(with_media: bool) -> (AppState, Arc<RecordingMediaStore>) {
    let config = test_config();
    let pool = load_database(&config.database_url)
        .await
        .expect("Failed to open test database");
    let media = Arc::new(RecordingMediaStore::default());
    let store: Option<Arc<dyn MediaStore>> = if with_media {
        Some(media.clone())
    } else {
        None
    };
    (AppState::new(pool, config, store), media)
}

/// Test application with a recording media store
pub async fn spawn_app() -> TestApp {
    spawn_app_with_media(true).await
}

/// Test application; `with_media = false` leaves uploads unconfigured
pub async fn spawn_app_with_media(with_media: bool) -> TestApp {
    let (state, media) = build_state(with_media).await;
    let pool = state.pool.clone();
    let config = (*state.config).clone();
    let server = TestServer::new(create_router(state)).expect("Failed to create test server");
    TestApp {
        server,
        pool,
        config,
        media,
    }
}

/// A real listening server, for tests that drive the client library
pub struct LiveServer {
    pub api_url: String,
    pub pool: SqlitePool,
    pub config: ServerConfig,
}

/// Serve the app on an ephemeral local port
pub async fn spawn_live_server() -> LiveServer {
    let (state, _media) = build_state(true).await;
    let pool = state.pool.clone();
    let config = (*state.config).clone();
    let app = create_router(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let address = listener.local_addr().expect("Listener has no address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Test server failed");
    });

    LiveServer {
        api_url: format!("http://{}/api", address),
        pool,
        config,
    }
}
