//! HTTP server for the directory snapshot
//!
//! Provides /files.json, /ping and /health, serves the scanned directory under
//! /files/ and falls back to the static site for everything else.

use crate::error::ApiError;
use crate::types::HealthResponse;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use file_tree::SnapshotProvider;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::{error, info};

/// Shared state for the HTTP server
pub struct ServerState {
    pub snapshots: SnapshotProvider,
    pub started_at: DateTime<Utc>,
}

impl ServerState {
    pub fn new(snapshots: SnapshotProvider) -> Self {
        Self {
            snapshots,
            started_at: Utc::now(),
        }
    }
}

pub type SharedState = Arc<ServerState>;

/// Create the HTTP router
pub fn create_router(state: SharedState, static_dir: &Path) -> Router {
    let files = ServeDir::new(state.snapshots.root());

    Router::new()
        .route("/files.json", get(get_files).delete(invalidate_files))
        .route("/ping", get(ping))
        .route("/health", get(health))
        .nest_service("/files", files)
        .fallback_service(ServeDir::new(static_dir))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the HTTP server and run until `shutdown` resolves
pub async fn start_server<F>(
    state: SharedState,
    static_dir: &Path,
    port: u16,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let router = create_router(state, static_dir);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
}

/// Resolves on SIGINT or SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("Caught signal, shutting down...");
}

/// Current directory snapshot as JSON
async fn get_files(State(state): State<SharedState>) -> Result<Response, ApiError> {
    let snapshot = state.snapshots.get_snapshot().await?;
    let body = serde_json::to_vec(snapshot.as_ref())?;

    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}

/// Drop the cached snapshot so the next request rescans
async fn invalidate_files(State(state): State<SharedState>) -> StatusCode {
    state.snapshots.invalidate().await;
    StatusCode::NO_CONTENT
}

async fn ping() -> &'static str {
    "pong"
}

/// Health check endpoint
async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    let cache_stats = state.snapshots.cache().stats().await;
    let uptime_secs = (Utc::now() - state.started_at).num_seconds() as u64;

    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_secs,
        cache: cache_stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Method, Request};
    use expiring_cache::{CacheConfig, ExpiringCache};
    use std::fs;
    use std::path::PathBuf;
    use std::time::Duration;
    use tempfile::{tempdir, TempDir};
    use tower::ServiceExt;

    struct Fixture {
        _dir: TempDir,
        files_dir: PathBuf,
        static_dir: PathBuf,
        state: SharedState,
    }

    impl Fixture {
        fn router(&self) -> Router {
            create_router(self.state.clone(), &self.static_dir)
        }
    }

    fn create_test_state(files_dir: PathBuf) -> SharedState {
        let cache = Arc::new(ExpiringCache::new(
            CacheConfig::default().with_reap_interval(Duration::ZERO),
        ));
        Arc::new(ServerState::new(SnapshotProvider::new(files_dir, cache)))
    }

    fn setup() -> Fixture {
        let dir = tempdir().unwrap();
        let files_dir = dir.path().join("files");
        let static_dir = dir.path().join("static");

        fs::create_dir_all(files_dir.join("sub")).unwrap();
        fs::write(files_dir.join("a.txt"), b"hello").unwrap();
        fs::write(files_dir.join(".secret"), b"shh").unwrap();
        fs::write(files_dir.join("sub").join("b.txt"), b"abc").unwrap();
        fs::create_dir_all(&static_dir).unwrap();
        fs::write(static_dir.join("index.html"), b"<h1>files</h1>").unwrap();

        let state = create_test_state(files_dir.clone());
        Fixture {
            _dir: dir,
            files_dir,
            static_dir,
            state,
        }
    }

    async fn body_bytes(response: Response) -> Vec<u8> {
        axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_files_json_endpoint() {
        let fixture = setup();

        let response = fixture.router().oneshot(get_request("/files.json")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );

        let json: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        let root = fixture.files_dir.to_string_lossy().into_owned();
        assert_eq!(json["name"], root.as_str());
        assert_eq!(json["path"], root.as_str());
        assert_eq!(json["type"], "folder");

        let items = json["items"].as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["name"], "a.txt");
        assert_eq!(items[0]["size"], 5);
        assert!(items[0].get("items").is_none());
        assert_eq!(items[1]["name"], "sub");
        assert_eq!(items[1]["items"][0]["name"], "b.txt");
        assert_eq!(items[1]["items"][0]["size"], 3);
    }

    #[tokio::test]
    async fn test_files_json_scan_error() {
        let dir = tempdir().unwrap();
        let state = create_test_state(dir.path().join("nonexistent"));
        let router = create_router(state.clone(), dir.path());

        let response = router.oneshot(get_request("/files.json")).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = String::from_utf8(body_bytes(response).await).unwrap();
        assert!(body.starts_with("error scanning directory"));
        assert_eq!(state.snapshots.cache().stats().await.entries, 0);
    }

    #[tokio::test]
    async fn test_invalidate_endpoint_triggers_rescan() {
        let fixture = setup();

        let response = fixture.router().oneshot(get_request("/files.json")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        fs::write(fixture.files_dir.join("c.txt"), b"new").unwrap();

        let response = fixture
            .router()
            .oneshot(
                Request::builder()
                    .method(Method::DELETE)
                    .uri("/files.json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = fixture.router().oneshot(get_request("/files.json")).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(json["items"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_ping_endpoint() {
        let fixture = setup();

        let response = fixture.router().oneshot(get_request("/ping")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_bytes(response).await, b"pong");
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let fixture = setup();
        fixture.state.snapshots.get_snapshot().await.unwrap();

        let response = fixture.router().oneshot(get_request("/health")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(json["status"], "ok");
        assert!(json["uptime_secs"].as_u64().is_some());
        assert_eq!(json["cache"]["entries"], 1);
    }

    #[tokio::test]
    async fn test_serves_scanned_files() {
        let fixture = setup();

        let response = fixture
            .router()
            .oneshot(get_request("/files/sub/b.txt"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_bytes(response).await, b"abc");
    }

    #[tokio::test]
    async fn test_static_fallback() {
        let fixture = setup();

        let response = fixture.router().oneshot(get_request("/index.html")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_bytes(response).await, b"<h1>files</h1>");

        let response = fixture.router().oneshot(get_request("/missing.css")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_server_state_new() {
        let dir = tempdir().unwrap();
        let state = create_test_state(dir.path().to_path_buf());

        // started_at should be close to now
        let diff = (Utc::now() - state.started_at).num_seconds();
        assert!((0..5).contains(&diff));
    }
}
