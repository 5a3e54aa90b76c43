use super::{GenerationRequest, ResponseFormat, TextGenerator};
use crate::{
    Error, Result,
    config::GeminiConfig,
    error::{ProviderError, ProviderErrorKind},
};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Text generation against the Gemini `generateContent` REST endpoint.
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::config(format!("Failed to build Gemini HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
            model: config.model,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize, Default)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Content,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

impl GenerateContentRequest {
    fn from_request(request: GenerationRequest) -> Self {
        let response_mime_type = match request.format {
            ResponseFormat::Json => Some("application/json".to_string()),
            ResponseFormat::Text => None,
        };

        let generation_config = if request.temperature.is_none() && response_mime_type.is_none() {
            None
        } else {
            Some(GenerationConfig {
                temperature: request.temperature,
                response_mime_type,
            })
        };

        Self {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(request.prompt),
                }],
            }],
            system_instruction: request.system_instruction.map(|text| Content {
                role: None,
                parts: vec![Part { text: Some(text) }],
            }),
            generation_config,
        }
    }
}

fn classify_status(status: StatusCode, body: &ErrorBody) -> ProviderErrorKind {
    match status.as_u16() {
        401 | 403 => ProviderErrorKind::Authentication,
        400 if body.message.to_ascii_lowercase().contains("api key")
            || body.status == "API_KEY_INVALID" =>
        {
            ProviderErrorKind::Authentication
        }
        400 => ProviderErrorKind::InvalidInput,
        429 => ProviderErrorKind::QuotaExceeded,
        500..=599 => ProviderErrorKind::Transient,
        _ => ProviderErrorKind::Unknown,
    }
}

fn transport_error(err: reqwest::Error) -> Error {
    let kind = if err.is_timeout() || err.is_connect() {
        ProviderErrorKind::Transient
    } else {
        ProviderErrorKind::Unknown
    };
    ProviderError::new(kind, format!("Gemini request failed: {}", err)).into()
}

#[async_trait]
impl TextGenerator for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, request: GenerationRequest) -> Result<String> {
        debug!(
            "Calling Gemini model {} with a {}-character prompt",
            self.model,
            request.prompt.chars().count()
        );

        let body = GenerateContentRequest::from_request(request);
        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            let error = serde_json::from_str::<ErrorEnvelope>(&raw)
                .map(|envelope| envelope.error)
                .unwrap_or(ErrorBody {
                    message: raw,
                    status: String::new(),
                });
            let kind = classify_status(status, &error);
            return Err(ProviderError::new(
                kind,
                format!("Gemini returned {}: {}", status, error.message),
            )
            .into());
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(transport_error)?;

        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .map(|candidate| {
                candidate
                    .content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(Error::provider(
                ProviderErrorKind::Unknown,
                "Gemini returned no text candidate",
            ));
        }

        debug!("Gemini returned {} characters", text.chars().count());
        Ok(text)
    }
}
