use super::{
    FailurePolicy, Relay, RelayError, RelayEvent, RelayLifecycle, Relayed, Reply, prompts,
    validate_text,
};
use crate::{
    Error,
    provider::{GenerationRequest, TextGenerator},
};
use std::sync::Arc;
use tracing::info;

/// `generate-summary`: fails closed, provider client faults become 400.
pub struct SummaryRelay {
    relay: Relay<String>,
    generator: Option<Arc<dyn TextGenerator>>,
}

impl SummaryRelay {
    pub fn new(generator: Option<Arc<dyn TextGenerator>>) -> Self {
        Self {
            relay: Relay::new(
                "generate-summary",
                "Summary generation",
                FailurePolicy::ReturnError {
                    client_faults_as_bad_request: true,
                },
            ),
            generator,
        }
    }

    pub async fn summarize(&self, text: Option<&str>) -> Relayed<String> {
        let mut lifecycle = self.relay.start();

        let Some(generator) = self.generator.as_deref() else {
            return self.relay.reject(
                lifecycle,
                Error::config("Configuration error: the text provider is not initialized."),
            );
        };

        let text = match validate_text(text, "text", "The text is too short to summarize.") {
            Ok(text) => text,
            Err(err) => return self.relay.reject(lifecycle, err),
        };

        let result = self.dispatch(&mut lifecycle, generator, text).await;
        self.relay.finish(lifecycle, result)
    }

    async fn dispatch(
        &self,
        lifecycle: &mut RelayLifecycle,
        generator: &dyn TextGenerator,
        text: &str,
    ) -> Result<Reply<String>, RelayError> {
        lifecycle.advance(RelayEvent::InputAccepted)?;
        lifecycle.advance(RelayEvent::ProviderCalled)?;

        info!(
            "Generating summary for {} characters with {}",
            text.chars().count(),
            generator.name()
        );

        let outcome = generator
            .generate(GenerationRequest::new(prompts::summary_prompt(text)))
            .await;
        self.relay.settle(lifecycle, outcome)
    }
}
