use super::{FailurePolicy, Relay, RelayError, RelayEvent, RelayLifecycle, Relayed, Reply, prompts};
use crate::{
    Error,
    provider::{GenerationRequest, TextGenerator},
};
use serde_json::Value;
use std::{collections::BTreeMap, sync::Arc};
use tracing::info;

pub const FALLBACK_RECOMMENDATION: &str = r#"
### MOVIE
Title: Interstellar
Explanation: Recommended automatically as a fallback. It combines science fiction, emotion,
an epic score and a deep message, ideal for viewers who enjoy reflective, intense storytelling.

### PROFILE
A viewer drawn to deep stories with a strong emotional component, mystery, scientific
exploration and powerful soundtracks.

### ALTERNATIVES
- Arrival
- Blade Runner 2049
- The Martian
"#;

pub const FALLBACK_WARNING: &str =
    "The recommendation provider is unavailable; a default recommendation was used.";

/// `recommend-movie`: fails open. Any failure, including a missing provider
/// or empty answers, yields [`FALLBACK_RECOMMENDATION`] with
/// [`FALLBACK_WARNING`].
pub struct RecommendationRelay {
    relay: Relay<String>,
    generator: Option<Arc<dyn TextGenerator>>,
}

impl RecommendationRelay {
    pub fn new(generator: Option<Arc<dyn TextGenerator>>) -> Self {
        Self {
            relay: Relay::new(
                "recommend-movie",
                "Movie recommendation",
                FailurePolicy::ReturnFallback {
                    payload: FALLBACK_RECOMMENDATION.to_string(),
                    warning: FALLBACK_WARNING.to_string(),
                },
            ),
            generator,
        }
    }

    pub async fn recommend(&self, answers: Option<BTreeMap<String, Value>>) -> Relayed<String> {
        let mut lifecycle = self.relay.start();

        let Some(generator) = self.generator.as_deref() else {
            return self.relay.reject(
                lifecycle,
                Error::config("the text provider is not initialized"),
            );
        };

        let answers = match answers {
            Some(answers) if !answers.is_empty() => answers,
            _ => {
                return self
                    .relay
                    .reject(lifecycle, Error::validation("no answers were provided"));
            }
        };

        let result = self.dispatch(&mut lifecycle, generator, &answers).await;
        self.relay.finish(lifecycle, result)
    }

    async fn dispatch(
        &self,
        lifecycle: &mut RelayLifecycle,
        generator: &dyn TextGenerator,
        answers: &BTreeMap<String, Value>,
    ) -> Result<Reply<String>, RelayError> {
        lifecycle.advance(RelayEvent::InputAccepted)?;
        lifecycle.advance(RelayEvent::ProviderCalled)?;

        info!(
            "Requesting movie recommendation for {} answers with {}",
            answers.len(),
            generator.name()
        );

        let outcome = generator
            .generate(GenerationRequest::new(prompts::recommendation_prompt(
                answers,
            )))
            .await;
        self.relay.settle(lifecycle, outcome)
    }
}
