use super::{
    GenerationRequest, ResponseFormat, SubtitleCue, TextGenerator, Transcriber, Transcript,
};
use crate::{Error, Result};
use async_trait::async_trait;
use std::{path::Path, time::Duration};
use tracing::info;

/// Canned subtitle track returned by the simulated transcriber, as
/// `(start seconds, text)`.
pub const SIMULATED_SUBTITLES: [(f64, &str); 5] = [
    (0.5, "Welcome to this video."),
    (3.5, "These subtitles were generated in simulation mode."),
    (7.0, "No speech-to-text provider was contacted."),
    (10.5, "Configure a real provider to transcribe your audio."),
    (14.0, "Thanks for watching!"),
];

const SIMULATED_TEXT: &str =
    "This is a simulated response. Configure a real provider to generate content.";

const SIMULATED_JSON: &str = r##"{"title":"Simulated title","description":"This description was produced in simulation mode.","tags":"#simulated #demo"}"##;

/// Stand-in provider that waits a fixed delay and answers with canned output.
#[derive(Debug, Clone)]
pub struct SimulatedProvider {
    delay: Duration,
}

impl SimulatedProvider {
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
        }
    }

    pub fn subtitles() -> Vec<SubtitleCue> {
        SIMULATED_SUBTITLES
            .iter()
            .map(|(time, text)| SubtitleCue {
                time: *time,
                text: text.to_string(),
            })
            .collect()
    }
}

#[async_trait]
impl TextGenerator for SimulatedProvider {
    fn name(&self) -> &str {
        "simulated"
    }

    async fn generate(&self, request: GenerationRequest) -> Result<String> {
        tokio::time::sleep(self.delay).await;
        let text = match request.format {
            ResponseFormat::Json => SIMULATED_JSON,
            ResponseFormat::Text => SIMULATED_TEXT,
        };
        Ok(text.to_string())
    }
}

#[async_trait]
impl Transcriber for SimulatedProvider {
    fn name(&self) -> &str {
        "simulated"
    }

    async fn transcribe(&self, media: &Path) -> Result<Transcript> {
        let metadata = tokio::fs::metadata(media).await.map_err(|e| {
            Error::storage(format!("Stored upload {} is unreadable: {}", media.display(), e))
        })?;
        info!(
            "Simulating transcription of {} ({} bytes)",
            media.display(),
            metadata.len()
        );

        tokio::time::sleep(self.delay).await;
        Ok(Transcript::Subtitles(Self::subtitles()))
    }
}
