//! Common test utilities for API testing with mocks.
//!
//! This module provides a test fixture that creates an in-process server
//! backed by a mock catalog source and a recording launcher, so the whole
//! HTTP surface can be exercised without a data host or a media player.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use ftpflix_core::{
    load_config_from_str, CatalogStore, Config,
    testing::{MockCatalogSource, MockLauncher},
};
use ftpflix_server::api::WsBroadcaster;
use ftpflix_server::state::AppState;

/// Re-export fixtures for test convenience
pub use ftpflix_core::testing::fixtures;

const TEST_CONFIG: &str = r#"
[catalog]
base_url = "http://catalog.test/data"
batch_size = 2
batch_delay_ms = 0
load_on_startup = false

[server]
host = "127.0.0.1"
port = 8080

[banners]
placeholder_base_url = "https://placehold.test/300x450"
"#;

/// Test fixture for API testing with mock dependencies.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_search() {
///     let fixture = TestFixture::loaded().await;
///
///     let response = fixture.get("/api/v1/search?q=matrix").await;
///
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock catalog source - configure manifest and category files
    pub source: Arc<MockCatalogSource>,
    /// Mock launcher - inspect playback hand-offs
    pub launcher: Arc<MockLauncher>,
    /// The store behind the router
    pub store: Arc<CatalogStore>,
    /// WebSocket broadcaster (store events are forwarded to it)
    pub ws_broadcaster: WsBroadcaster,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Create a fixture with the seeded catalog, not loaded yet.
    pub async fn new() -> Self {
        let source = Arc::new(MockCatalogSource::new());
        seed(&source).await;
        Self::with_source(source)
    }

    /// Create a fixture with the seeded catalog fully loaded.
    pub async fn loaded() -> Self {
        let fixture = Self::new().await;
        fixture.store.load().await.expect("Seed load failed");
        fixture
    }

    /// Create a fixture around a caller-configured source.
    pub fn with_source(source: Arc<MockCatalogSource>) -> Self {
        let config = test_config();
        let launcher = Arc::new(MockLauncher::new());

        let store = Arc::new(CatalogStore::from_config(
            Arc::clone(&source) as Arc<dyn ftpflix_core::CatalogSource>,
            Arc::clone(&launcher) as Arc<dyn ftpflix_core::MediaLauncher>,
            &config,
        ));

        let ws_broadcaster = WsBroadcaster::default();
        let _ = ws_broadcaster.forward_store_events(store.subscribe());

        let state = Arc::new(AppState::new(
            config,
            Arc::clone(&store),
            ws_broadcaster.clone(),
        ));

        let router = ftpflix_server::api::create_router(state);

        Self {
            router,
            source,
            launcher,
            store,
            ws_broadcaster,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a POST request without a body.
    pub async fn post_empty(&self, path: &str) -> TestResponse {
        self.request("POST", path, None).await
    }

    /// Send a POST request with raw string body (for testing malformed JSON).
    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// Send a GET request and return the raw body text.
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        (status, String::from_utf8_lossy(&body_bytes).into_owned())
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        self.send(request_builder.body(body).unwrap()).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}

pub fn test_config() -> Config {
    load_config_from_str(TEST_CONFIG).expect("Invalid test config")
}

/// Seed catalog:
/// Fetched smallest first, so with `batch_size = 2` kids and tv arrive first.
///
/// - kids (1): Bluey
/// - drama (2): Heat, Ronin
/// - action (2): The Matrix, Matrix Reloaded
/// - tv (1): "HD - Dark - Season 1" and "HD - Dark - Season 2", grouped as "Dark"
pub async fn seed(source: &MockCatalogSource) {
    source
        .set_manifest(fixtures::manifest(&[
            ("kids", "Kids", 1),
            ("drama", "Drama", 2),
            ("action", "Action", 2),
            ("tv", "TV Shows", 1),
            ("all", "All", 6),
        ]))
        .await;
    source
        .add_category("kids", fixtures::movie_file("Kids", &["Bluey"]))
        .await;
    source
        .add_category("drama", fixtures::movie_file("Drama", &["Heat", "Ronin"]))
        .await;
    source
        .add_category(
            "action",
            fixtures::movie_file("Action", &["The Matrix", "Matrix Reloaded"]),
        )
        .await;
    source
        .add_category(
            "tv",
            fixtures::series_file(
                "TV Shows",
                vec![
                    fixtures::raw_series("HD - Dark - Season 1", &[1]),
                    fixtures::raw_series("HD - Dark - Season 2", &[2]),
                ],
            ),
        )
        .await;
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}

/// Helper to assert a JSON path equals expected value.
#[macro_export]
macro_rules! assert_json_path {
    ($json:expr, $path:expr, $expected:expr) => {
        let actual = &$json[$path];
        assert_eq!(
            actual, &$expected,
            "Path '{}' expected {:?}, got {:?}",
            $path, $expected, actual
        );
    };
}
