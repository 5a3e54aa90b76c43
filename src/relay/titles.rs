use super::{
    FailurePolicy, Relay, RelayError, RelayEvent, RelayLifecycle, Relayed, Reply, prompts,
    validate_text,
};
use crate::{
    Error, Result,
    error::ProviderErrorKind,
    provider::{GenerationRequest, ResponseFormat, TextGenerator},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitleSuggestion {
    pub title: String,
    pub description: String,
    pub tags: String,
}

/// `generate-titles`: fails closed like the summary relay. An answer that is
/// not the expected JSON object counts as a provider failure.
pub struct TitleRelay {
    relay: Relay<TitleSuggestion>,
    generator: Option<Arc<dyn TextGenerator>>,
}

impl TitleRelay {
    pub fn new(generator: Option<Arc<dyn TextGenerator>>) -> Self {
        Self {
            relay: Relay::new(
                "generate-titles",
                "Title generation",
                FailurePolicy::ReturnError {
                    client_faults_as_bad_request: true,
                },
            ),
            generator,
        }
    }

    pub async fn suggest(&self, description: Option<&str>) -> Relayed<TitleSuggestion> {
        let mut lifecycle = self.relay.start();

        let Some(generator) = self.generator.as_deref() else {
            return self.relay.reject(
                lifecycle,
                Error::config("Configuration error: the text provider is not initialized."),
            );
        };

        let description = match validate_text(
            description,
            "description",
            "Please provide a more detailed description (at least 10 characters).",
        ) {
            Ok(description) => description,
            Err(err) => return self.relay.reject(lifecycle, err),
        };

        let result = self.dispatch(&mut lifecycle, generator, description).await;
        self.relay.finish(lifecycle, result)
    }

    async fn dispatch(
        &self,
        lifecycle: &mut RelayLifecycle,
        generator: &dyn TextGenerator,
        description: &str,
    ) -> std::result::Result<Reply<TitleSuggestion>, RelayError> {
        lifecycle.advance(RelayEvent::InputAccepted)?;
        lifecycle.advance(RelayEvent::ProviderCalled)?;

        info!("Generating title ideas with {}", generator.name());

        let request = GenerationRequest::new(prompts::title_prompt(description))
            .with_system_instruction(prompts::TITLE_SYSTEM_INSTRUCTION)
            .with_temperature(0.9)
            .with_format(ResponseFormat::Json);

        let outcome = match generator.generate(request).await {
            Ok(text) => parse_suggestion(&text),
            Err(err) => Err(err),
        };
        self.relay.settle(lifecycle, outcome)
    }
}

/// Reads `{title, description, tags}` from a model answer, tolerating a
/// Markdown code fence around it and `tags` given as a list.
fn parse_suggestion(text: &str) -> Result<TitleSuggestion> {
    let body = strip_code_fence(text);
    let value: Value = serde_json::from_str(body).map_err(|e| {
        Error::provider(
            ProviderErrorKind::Unknown,
            format!("the model answer is not valid JSON: {}", e),
        )
    })?;

    let field = |name: &str| -> Result<String> {
        let text = match value.get(name) {
            Some(Value::String(s)) => s.trim().to_string(),
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .collect::<Vec<_>>()
                .join(" "),
            _ => String::new(),
        };
        if text.is_empty() {
            return Err(Error::provider(
                ProviderErrorKind::Unknown,
                format!("the model answer has no '{}' field", name),
            ));
        }
        Ok(text)
    };

    Ok(TitleSuggestion {
        title: field("title")?,
        description: field("description")?,
        tags: field("tags")?,
    })
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
