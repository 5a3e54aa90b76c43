//! Remote inference providers.
//!
//! The relays only see the [`TextGenerator`] and [`Transcriber`] traits. Which
//! implementation sits behind them is decided once, from configuration, by
//! [`build_text_generator`] and [`build_transcriber`].

mod gemini;
mod openai;
mod simulated;
mod types;

pub use gemini::GeminiClient;
pub use openai::OpenAiClient;
pub use simulated::{SIMULATED_SUBTITLES, SimulatedProvider};
pub use types::*;

use crate::{
    Result,
    config::{Config, TextProviderKind, TranscriptionProviderKind},
};
use async_trait::async_trait;
use std::{path::Path, sync::Arc};
use tracing::{info, warn};

#[async_trait]
pub trait TextGenerator: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, request: GenerationRequest) -> Result<String>;
}

#[async_trait]
pub trait Transcriber: Send + Sync {
    fn name(&self) -> &str;

    async fn transcribe(&self, media: &Path) -> Result<Transcript>;
}

/// Builds the configured text generator, or `None` when the selected provider
/// has no API key.
pub fn build_text_generator(config: &Config) -> Result<Option<Arc<dyn TextGenerator>>> {
    let generator: Arc<dyn TextGenerator> = match config.providers.text {
        TextProviderKind::Gemini => {
            if config.gemini.api_key.is_empty() {
                warn!("GEMINI_API_KEY is not set; text endpoints are disabled");
                return Ok(None);
            }
            Arc::new(GeminiClient::new(config.gemini.clone())?)
        }
        TextProviderKind::OpenAi => {
            if config.openai.api_key.is_empty() {
                warn!("OPENAI_API_KEY is not set; text endpoints are disabled");
                return Ok(None);
            }
            Arc::new(OpenAiClient::new(config.openai.clone()))
        }
        TextProviderKind::Simulated => Arc::new(SimulatedProvider::new(config.simulated.delay_ms)),
    };

    info!("Text provider: {}", generator.name());
    Ok(Some(generator))
}

/// Builds the configured transcriber, or `None` when the selected provider has
/// no API key.
pub fn build_transcriber(config: &Config) -> Option<Arc<dyn Transcriber>> {
    let transcriber: Arc<dyn Transcriber> = match config.providers.transcription {
        TranscriptionProviderKind::OpenAi => {
            if config.openai.api_key.is_empty() {
                warn!("OPENAI_API_KEY is not set; transcription is disabled");
                return None;
            }
            Arc::new(OpenAiClient::new(config.openai.clone()))
        }
        TranscriptionProviderKind::Simulated => {
            Arc::new(SimulatedProvider::new(config.simulated.delay_ms))
        }
    };

    info!("Transcription provider: {}", transcriber.name());
    Some(transcriber)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_missing_gemini_key_disables_text_provider() {
        let config = Config::default();
        assert!(build_text_generator(&config).unwrap().is_none());
    }

    #[test]
    fn test_gemini_with_key_is_built() {
        let mut config = Config::default();
        config.gemini.api_key = "gm-test".to_string();

        let generator = build_text_generator(&config).unwrap().unwrap();
        assert_eq!(generator.name(), "gemini");
    }

    #[test]
    fn test_simulated_text_provider_needs_no_key() {
        let mut config = Config::default();
        config.providers.text = TextProviderKind::Simulated;

        let generator = build_text_generator(&config).unwrap().unwrap();
        assert_eq!(generator.name(), "simulated");
    }

    #[test]
    fn test_default_transcriber_is_simulated() {
        let transcriber = build_transcriber(&Config::default()).unwrap();
        assert_eq!(transcriber.name(), "simulated");
    }

    #[test]
    fn test_openai_transcriber_without_key_is_disabled() {
        let mut config = Config::default();
        config.providers.transcription = TranscriptionProviderKind::OpenAi;
        assert!(build_transcriber(&config).is_none());
    }
}
