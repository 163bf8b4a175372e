//! Common test utilities for E2E tests

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use rustpresence::assets::{AssetCache, AssetMapper};
use rustpresence::config::{PlatformSettings, RawPresenceConfig};
use rustpresence::platform::{HttpAssetResolver, PlatformSession};
use rustpresence::presence::PresenceDefaults;
use rustpresence::publisher::PresencePublisher;
use tokio_util::sync::CancellationToken;

/// Token the mock platform accepts.
pub const TEST_TOKEN: &str = "test-token";

/// Everything the mock platform observed or is told to do
#[derive(Default)]
pub struct PlatformRecorder {
    /// Bodies of every presence update received
    pub presence_updates: Mutex<Vec<Value>>,
    /// Number of external asset resolution calls received
    pub external_asset_calls: AtomicUsize,
    /// When set, presence updates are rejected with HTTP 500
    pub fail_presence: AtomicBool,
}

impl PlatformRecorder {
    pub fn presence_update_count(&self) -> usize {
        self.presence_updates.lock().unwrap().len()
    }
}

/// A fake platform API covering login, presence updates and external
/// asset resolution
pub struct MockPlatform {
    pub addr: String,
    pub recorder: Arc<PlatformRecorder>,
}

impl MockPlatform {
    /// Bind the mock platform on an OS-assigned port
    pub async fn start() -> Self {
        let recorder = Arc::new(PlatformRecorder::default());

        let app = Router::new()
            .route("/users/@me", get(me_handler))
            .route("/users/@me/presence", post(presence_handler))
            .route(
                "/applications/:application_id/external-assets",
                post(external_assets_handler),
            )
            .with_state(recorder.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = format!("http://{}", listener.local_addr().unwrap());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait a bit for the server to start
        tokio::time::sleep(Duration::from_millis(50)).await;

        Self { addr, recorder }
    }

    /// Platform settings pointing the daemon at this mock.
    pub fn platform_settings(&self) -> PlatformSettings {
        PlatformSettings {
            api_base_url: self.addr.clone(),
            request_timeout_seconds: 5,
        }
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("Authorization")
        .and_then(|value| value.to_str().ok())
        .is_some_and(|token| token == TEST_TOKEN)
}

async fn me_handler(headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"message": "401"})));
    }

    (
        StatusCode::OK,
        Json(json!({"id": "42", "username": "tester", "discriminator": "0"})),
    )
}

async fn presence_handler(
    State(recorder): State<Arc<PlatformRecorder>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> StatusCode {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED;
    }
    if recorder.fail_presence.load(Ordering::SeqCst) {
        return StatusCode::INTERNAL_SERVER_ERROR;
    }

    recorder.presence_updates.lock().unwrap().push(body);
    StatusCode::NO_CONTENT
}

async fn external_assets_handler(
    State(recorder): State<Arc<PlatformRecorder>>,
    Path(application_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"message": "401"})));
    }

    recorder.external_asset_calls.fetch_add(1, Ordering::SeqCst);

    // Derive a stable path from the submitted URL so repeated resolutions
    // of the same image agree.
    let url = body["urls"][0].as_str().unwrap_or_default();
    let digest: u32 = url.bytes().map(u32::from).sum();
    (
        StatusCode::OK,
        Json(json!([{
            "url": url,
            "external_asset_path": format!("mp:external/{application_id}-{digest}")
        }])),
    )
}

/// A publisher wired against a mock platform, running in the background
pub struct TestDaemon {
    cancel: CancellationToken,
    handle: tokio::task::JoinHandle<rustpresence::error::Result<()>>,
}

impl TestDaemon {
    /// Log in against the mock and start publishing `document` on `refresh_interval`
    pub async fn spawn(mock: &MockPlatform, document: &str, refresh_interval: Duration) -> Self {
        let settings = mock.platform_settings();
        let http_client = Arc::new(
            reqwest::Client::builder()
                .timeout(settings.request_timeout())
                .build()
                .unwrap(),
        );

        let session = PlatformSession::login(http_client.clone(), &settings, TEST_TOKEN)
            .await
            .unwrap();
        let resolver = HttpAssetResolver::new(http_client, &settings, TEST_TOKEN);

        let raw: RawPresenceConfig = serde_json::from_str(document).unwrap();
        let mapper = AssetMapper::new(Arc::new(resolver), Arc::new(AssetCache::new()));
        let mut publisher = PresencePublisher::new(
            Arc::new(session),
            mapper,
            raw,
            PresenceDefaults::builtin(),
            refresh_interval,
        );

        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();
        let handle = tokio::spawn(async move { publisher.run(task_cancel).await });

        Self { cancel, handle }
    }

    /// Stop the publisher and return its run result.
    pub async fn stop(self) -> rustpresence::error::Result<()> {
        self.cancel.cancel();
        self.handle.await.unwrap()
    }
}
