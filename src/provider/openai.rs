use super::{GenerationRequest, ResponseFormat, TextGenerator, Transcriber, Transcript};
use crate::{Error, Result, config::OpenAiConfig, error::ProviderErrorKind};
use async_openai::{Client, config::OpenAIConfig, types as openai_types};
use async_trait::async_trait;
use backoff::ExponentialBackoff;
use std::{path::Path, time::Duration};
use tracing::debug;

/// Chat completions and Whisper transcription through async-openai.
pub struct OpenAiClient {
    client: Client<OpenAIConfig>,
    model: String,
    transcription_model: String,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> Self {
        let mut openai_config = OpenAIConfig::new().with_api_key(config.api_key);

        if !config.base_url.is_empty() {
            openai_config = openai_config.with_api_base(config.base_url);
        }

        // One attempt per call: a failed request fails the relay immediately.
        let client = Client::with_config(openai_config).with_backoff(single_attempt());

        Self {
            client,
            model: config.model,
            transcription_model: config.transcription_model,
        }
    }

    fn build_messages(
        request: &GenerationRequest,
    ) -> Result<Vec<openai_types::ChatCompletionRequestMessage>> {
        let mut messages = Vec::new();

        if let Some(ref instruction) = request.system_instruction {
            let msg = openai_types::ChatCompletionRequestSystemMessageArgs::default()
                .content(openai_types::ChatCompletionRequestSystemMessageContent::Text(
                    instruction.clone(),
                ))
                .build()
                .map_err(|e| Error::internal(format!("Failed to build system message: {}", e)))?;
            messages.push(msg.into());
        }

        let msg = openai_types::ChatCompletionRequestUserMessageArgs::default()
            .content(openai_types::ChatCompletionRequestUserMessageContent::Text(
                request.prompt.clone(),
            ))
            .build()
            .map_err(|e| Error::internal(format!("Failed to build user message: {}", e)))?;
        messages.push(msg.into());

        Ok(messages)
    }
}

fn single_attempt() -> ExponentialBackoff {
    ExponentialBackoff {
        max_elapsed_time: Some(Duration::ZERO),
        ..Default::default()
    }
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    fn name(&self) -> &str {
        "openai"
    }

    async fn generate(&self, request: GenerationRequest) -> Result<String> {
        debug!(
            "Creating chat completion with model {} ({}-character prompt)",
            self.model,
            request.prompt.chars().count()
        );

        let messages = Self::build_messages(&request)?;

        let mut request_builder = openai_types::CreateChatCompletionRequestArgs::default();
        request_builder
            .model(&self.model)
            .messages(messages)
            .temperature(request.temperature.unwrap_or(0.7));

        if request.format == ResponseFormat::Json {
            request_builder.response_format(openai_types::ResponseFormat::JsonObject);
        }

        let openai_request = request_builder.build()?;
        let response = self.client.chat().create(openai_request).await?;

        debug!(
            "Received chat completion response with {} choices",
            response.choices.len()
        );

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| {
                Error::provider(
                    ProviderErrorKind::Unknown,
                    "OpenAI returned an empty completion",
                )
            })
    }
}

#[async_trait]
impl Transcriber for OpenAiClient {
    fn name(&self) -> &str {
        "openai"
    }

    async fn transcribe(&self, media: &Path) -> Result<Transcript> {
        debug!(
            "Transcribing {} with model {}",
            media.display(),
            self.transcription_model
        );

        let request = openai_types::CreateTranscriptionRequestArgs::default()
            .file(media)
            .model(&self.transcription_model)
            .build()?;

        let response = self.client.audio().transcribe(request).await?;

        debug!(
            "Received transcription with {} characters",
            response.text.chars().count()
        );
        Ok(Transcript::Text(response.text))
    }
}
