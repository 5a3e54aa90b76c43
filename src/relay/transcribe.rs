use super::{FailurePolicy, Relay, RelayError, RelayEvent, RelayLifecycle, Relayed, Reply};
use crate::{
    Error, Result,
    provider::{Transcriber, Transcript},
    storage::{StoredUpload, TempFileStore},
};
use std::sync::Arc;
use tracing::info;

/// A media file received from the client.
#[derive(Debug, Clone)]
pub struct VideoUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// `transcribe-video`: fails closed with 500 on any provider failure. The
/// stored upload is released before the reply is produced.
pub struct TranscriptionRelay {
    relay: Relay<Transcript>,
    transcriber: Option<Arc<dyn Transcriber>>,
    store: TempFileStore,
}

impl TranscriptionRelay {
    pub fn new(transcriber: Option<Arc<dyn Transcriber>>, store: TempFileStore) -> Self {
        Self {
            relay: Relay::new(
                "transcribe-video",
                "Transcription",
                FailurePolicy::ReturnError {
                    client_faults_as_bad_request: false,
                },
            ),
            transcriber,
            store,
        }
    }

    pub async fn transcribe(&self, upload: Option<VideoUpload>) -> Relayed<Transcript> {
        let mut lifecycle = self.relay.start();

        let Some(transcriber) = self.transcriber.as_deref() else {
            return self.relay.reject(
                lifecycle,
                Error::config("Configuration error: the transcription provider is not initialized."),
            );
        };

        let upload = match validate_upload(upload) {
            Ok(upload) => upload,
            Err(err) => return self.relay.reject(lifecycle, err),
        };

        let result = self.dispatch(&mut lifecycle, transcriber, upload).await;
        self.relay.finish(lifecycle, result)
    }

    async fn dispatch(
        &self,
        lifecycle: &mut RelayLifecycle,
        transcriber: &dyn Transcriber,
        upload: VideoUpload,
    ) -> std::result::Result<Reply<Transcript>, RelayError> {
        lifecycle.advance(RelayEvent::InputAccepted)?;

        info!(
            "Received {} ({} bytes) for transcription",
            upload.filename,
            upload.bytes.len()
        );

        let stored = match self.store.store(&upload.filename, &upload.bytes).await {
            Ok(stored) => stored,
            Err(err) => {
                lifecycle.advance(RelayEvent::InputRejected)?;
                return Err(err.into());
            }
        };
        // From here on `stored` deletes its file when dropped, so every early
        // return below still cleans up.
        lifecycle.advance(RelayEvent::UploadStored)?;

        let settled = self.transcribe_stored(lifecycle, transcriber, &stored).await;

        stored.release().await?;
        lifecycle.advance(RelayEvent::UploadReleased)?;
        info!("Temporary upload released");

        settled
    }

    async fn transcribe_stored(
        &self,
        lifecycle: &mut RelayLifecycle,
        transcriber: &dyn Transcriber,
        stored: &StoredUpload,
    ) -> std::result::Result<Reply<Transcript>, RelayError> {
        lifecycle.advance(RelayEvent::ProviderCalled)?;
        info!("Transcribing with {}", transcriber.name());

        let outcome = transcriber.transcribe(stored.path()).await;
        self.relay.settle(lifecycle, outcome)
    }
}

fn validate_upload(upload: Option<VideoUpload>) -> Result<VideoUpload> {
    let upload = upload.ok_or_else(|| Error::validation("No video file found in the request."))?;

    if upload.filename.trim().is_empty() {
        return Err(Error::validation("The uploaded video has no filename."));
    }
    if upload.bytes.is_empty() {
        return Err(Error::validation("The uploaded video is empty."));
    }
    Ok(upload)
}
