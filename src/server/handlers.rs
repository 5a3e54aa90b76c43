use super::{
    ApiError,
    types::{
        HealthResponse, RecommendationRequest, RecommendationResponse, SummaryRequest,
        SummaryResponse, TitleRequest, TranscriptionResponse,
    },
};
use crate::{
    Result,
    config::Config,
    provider,
    relay::{
        RecommendationRelay, SummaryRelay, TitleRelay, TitleSuggestion, TranscriptionRelay,
        VideoUpload,
    },
    storage::TempFileStore,
};
use axum::{
    extract::{
        Multipart, State, multipart::MultipartRejection, rejection::JsonRejection,
    },
    response::Json,
};
use std::sync::Arc;
use tracing::{info, warn};

const VIDEO_FIELD: &str = "video";

#[derive(Clone)]
pub struct AppState {
    pub summary: Arc<SummaryRelay>,
    pub recommendation: Arc<RecommendationRelay>,
    pub transcription: Arc<TranscriptionRelay>,
    pub titles: Arc<TitleRelay>,
    pub text_provider: Option<String>,
    pub transcription_provider: Option<String>,
}

impl AppState {
    /// Wires every relay to the providers selected in `config`.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let store = TempFileStore::new(&config.server.upload_dir).await?;
        let generator = provider::build_text_generator(config)?;
        let transcriber = provider::build_transcriber(config);

        Ok(Self {
            text_provider: generator.as_ref().map(|g| g.name().to_string()),
            transcription_provider: transcriber.as_ref().map(|t| t.name().to_string()),
            summary: Arc::new(SummaryRelay::new(generator.clone())),
            recommendation: Arc::new(RecommendationRelay::new(generator.clone())),
            titles: Arc::new(TitleRelay::new(generator)),
            transcription: Arc::new(TranscriptionRelay::new(transcriber, store)),
        })
    }
}

pub async fn generate_summary(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SummaryRequest>, JsonRejection>,
) -> std::result::Result<Json<SummaryResponse>, ApiError> {
    let Json(request) =
        payload.map_err(|e| ApiError::bad_request(format!("Invalid JSON body: {}", e.body_text())))?;

    let (summary, _) = state
        .summary
        .summarize(request.text.as_deref())
        .await
        .into_result()?
        .into_parts();

    Ok(Json(SummaryResponse {
        status: "success",
        summary,
    }))
}

pub async fn recommend_movie(
    State(state): State<AppState>,
    payload: std::result::Result<Json<RecommendationRequest>, JsonRejection>,
) -> std::result::Result<Json<RecommendationResponse>, ApiError> {
    let answers = match payload {
        Ok(Json(request)) => request.answers,
        Err(e) => {
            warn!("Unreadable recommendation request: {}", e.body_text());
            None
        }
    };

    let (result, warning) = state
        .recommendation
        .recommend(answers)
        .await
        .into_result()?
        .into_parts();

    Ok(Json(RecommendationResponse { result, warning }))
}

pub async fn transcribe_video(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> std::result::Result<Json<TranscriptionResponse>, ApiError> {
    let upload = match multipart {
        Ok(multipart) => read_video_field(multipart).await?,
        Err(e) => {
            warn!("Transcription request is not multipart: {}", e.body_text());
            None
        }
    };

    let (transcript, _) = state
        .transcription
        .transcribe(upload)
        .await
        .into_result()?
        .into_parts();

    Ok(Json(TranscriptionResponse {
        status: "success",
        transcript,
    }))
}

pub async fn generate_titles(
    State(state): State<AppState>,
    payload: std::result::Result<Json<TitleRequest>, JsonRejection>,
) -> std::result::Result<Json<TitleSuggestion>, ApiError> {
    let Json(request) =
        payload.map_err(|e| ApiError::bad_request(format!("Invalid JSON body: {}", e.body_text())))?;

    let (suggestion, _) = state
        .titles
        .suggest(request.description.as_deref())
        .await
        .into_result()?
        .into_parts();

    Ok(Json(suggestion))
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        text_provider: state.text_provider.clone(),
        transcription_provider: state.transcription_provider.clone(),
    })
}

/// Pulls the `video` part out of the form, ignoring any other field.
async fn read_video_field(
    mut multipart: Multipart,
) -> std::result::Result<Option<VideoUpload>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Failed reading multipart field: {}", e)))?
    {
        if field.name() != Some(VIDEO_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(|e| {
            ApiError::bad_request(format!("Failed reading multipart 'video' field: {}", e))
        })?;

        info!("Received video part '{}' ({} bytes)", filename, bytes.len());
        return Ok(Some(VideoUpload {
            filename,
            bytes: bytes.to_vec(),
        }));
    }

    Ok(None)
}
