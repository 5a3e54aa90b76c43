use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response},
};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use studio_relay::{
    config::{Config, TextProviderKind},
    provider::{TextGenerator, Transcriber},
    relay::{RecommendationRelay, SummaryRelay, TitleRelay, TranscriptionRelay},
    server::{self, AppState},
    storage::TempFileStore,
};
use tempfile::TempDir;

pub const BOUNDARY: &str = "studio-relay-test-boundary";

/// Create a test configuration with sensible defaults
pub fn create_test_config(upload_dir: &Path) -> Config {
    let mut config = Config::default();
    config.server.upload_dir = upload_dir.to_string_lossy().to_string();
    config.providers.text = TextProviderKind::Simulated;
    config.simulated.delay_ms = 0;
    config
}

/// Create a temporary directory for uploads
pub fn create_temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

/// Build app state around the given providers
pub async fn create_state(
    generator: Option<Arc<dyn TextGenerator>>,
    transcriber: Option<Arc<dyn Transcriber>>,
    upload_dir: &Path,
) -> AppState {
    let store = TempFileStore::new(upload_dir).await.unwrap();

    AppState {
        text_provider: generator.as_ref().map(|g| g.name().to_string()),
        transcription_provider: transcriber.as_ref().map(|t| t.name().to_string()),
        summary: Arc::new(SummaryRelay::new(generator.clone())),
        recommendation: Arc::new(RecommendationRelay::new(generator.clone())),
        titles: Arc::new(TitleRelay::new(generator)),
        transcription: Arc::new(TranscriptionRelay::new(transcriber, store)),
    }
}

/// Build the full router, CORS and body limit included
pub async fn create_app(
    generator: Option<Arc<dyn TextGenerator>>,
    transcriber: Option<Arc<dyn Transcriber>>,
    upload_dir: &Path,
) -> Router {
    let state = create_state(generator, transcriber, upload_dir).await;
    server::router(state, &create_test_config(upload_dir)).unwrap()
}

pub fn json_request(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Multipart request with a single file part
pub fn multipart_request(uri: &str, field: &str, filename: &str, bytes: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: video/mp4\r\n\r\n");
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

pub async fn read_json(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn count_files(dir: &Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}
