use pretty_assertions::assert_eq;
use serde_json::json;
use studio_relay::{
    Error,
    config::GeminiConfig,
    error::ProviderErrorKind,
    provider::{GeminiClient, GenerationRequest, ResponseFormat, TextGenerator},
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_partial_json, header, method, path},
};

const GENERATE_PATH: &str = "/v1beta/models/gemini-test:generateContent";

fn create_client(server: &MockServer) -> GeminiClient {
    GeminiClient::new(GeminiConfig {
        api_key: "test-key".to_string(),
        base_url: server.uri(),
        model: "gemini-test".to_string(),
        timeout_secs: 5,
    })
    .unwrap()
}

fn provider_kind(err: Error) -> ProviderErrorKind {
    match err {
        Error::Provider(e) => e.kind,
        other => panic!("expected a provider error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_generate_returns_candidate_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(json!({
            "contents": [{"role": "user", "parts": [{"text": "Summarise this text"}]}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Short "}, {"text": "summary."}]}
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_client(&server);
    let text = client
        .generate(GenerationRequest::new("Summarise this text"))
        .await
        .unwrap();

    assert_eq!(text, "Short summary.");
}

#[tokio::test]
async fn test_generate_requests_json_mime_type() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(body_partial_json(json!({
            "generationConfig": {"responseMimeType": "application/json"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"parts": [{"text": "{\"title\": \"x\"}"}]}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_client(&server);
    let text = client
        .generate(GenerationRequest::new("Titles please").with_format(ResponseFormat::Json))
        .await
        .unwrap();

    assert_eq!(text, "{\"title\": \"x\"}");
}

#[tokio::test]
async fn test_rate_limit_is_quota_exceeded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": {"code": 429, "message": "Resource has been exhausted", "status": "RESOURCE_EXHAUSTED"}
        })))
        .mount(&server)
        .await;

    let err = create_client(&server)
        .generate(GenerationRequest::new("anything"))
        .await
        .unwrap_err();

    assert!(err.to_string().contains("Resource has been exhausted"));
    assert_eq!(provider_kind(err), ProviderErrorKind::QuotaExceeded);
}

#[tokio::test]
async fn test_invalid_api_key_is_authentication() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {"code": 400, "message": "API key not valid. Please pass a valid API key.", "status": "INVALID_ARGUMENT"}
        })))
        .mount(&server)
        .await;

    let err = create_client(&server)
        .generate(GenerationRequest::new("anything"))
        .await
        .unwrap_err();

    assert_eq!(provider_kind(err), ProviderErrorKind::Authentication);
}

#[tokio::test]
async fn test_server_error_is_transient() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .mount(&server)
        .await;

    let err = create_client(&server)
        .generate(GenerationRequest::new("anything"))
        .await
        .unwrap_err();

    assert!(err.to_string().contains("upstream unavailable"));
    assert_eq!(provider_kind(err), ProviderErrorKind::Transient);
}

#[tokio::test]
async fn test_unknown_model_is_not_a_client_fault() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"code": 404, "message": "models/gemini-test is not found", "status": "NOT_FOUND"}
        })))
        .mount(&server)
        .await;

    let err = create_client(&server)
        .generate(GenerationRequest::new("anything"))
        .await
        .unwrap_err();

    let kind = provider_kind(err);
    assert_eq!(kind, ProviderErrorKind::Unknown);
    assert!(!kind.is_client_fault());
}

#[tokio::test]
async fn test_empty_candidates_is_unknown() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
        .mount(&server)
        .await;

    let err = create_client(&server)
        .generate(GenerationRequest::new("anything"))
        .await
        .unwrap_err();

    assert_eq!(provider_kind(err), ProviderErrorKind::Unknown);
}
