use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use studio_relay::{
    Error, Result,
    error::{ProviderError, ProviderErrorKind},
    provider::{GenerationRequest, TextGenerator, Transcriber, Transcript},
};

/// Mock text generator for testing
#[derive(Debug, Default)]
pub struct MockTextGenerator {
    pub responses: Arc<Mutex<Vec<String>>>,
    pub requests: Arc<Mutex<Vec<GenerationRequest>>>,
    pub error: Option<ProviderError>,
}

impl MockTextGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_responses(self, responses: Vec<&str>) -> Self {
        *self.responses.lock().unwrap() = responses.into_iter().map(str::to_string).collect();
        self
    }

    pub fn with_error(mut self, kind: ProviderErrorKind, message: &str) -> Self {
        self.error = Some(ProviderError::new(kind, message));
        self
    }

    pub fn get_requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl TextGenerator for MockTextGenerator {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, request: GenerationRequest) -> Result<String> {
        self.requests.lock().unwrap().push(request);

        if let Some(ref error) = self.error {
            return Err(Error::Provider(error.clone()));
        }

        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            return Err(Error::internal("No more mock responses available"));
        }

        Ok(responses.remove(0))
    }
}

/// Mock transcriber that records the path it was handed and whether the file
/// existed at that moment.
#[derive(Debug)]
pub struct MockTranscriber {
    pub transcript: Transcript,
    pub error: Option<ProviderError>,
    pub calls: Arc<Mutex<Vec<(PathBuf, bool)>>>,
}

impl MockTranscriber {
    pub fn new(text: &str) -> Self {
        Self {
            transcript: Transcript::Text(text.to_string()),
            error: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_error(mut self, kind: ProviderErrorKind, message: &str) -> Self {
        self.error = Some(ProviderError::new(kind, message));
        self
    }

    pub fn calls(&self) -> Vec<(PathBuf, bool)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transcriber for MockTranscriber {
    fn name(&self) -> &str {
        "mock"
    }

    async fn transcribe(&self, media: &Path) -> Result<Transcript> {
        self.calls
            .lock()
            .unwrap()
            .push((media.to_path_buf(), media.exists()));

        if let Some(ref error) = self.error {
            return Err(Error::Provider(error.clone()));
        }

        Ok(self.transcript.clone())
    }
}
