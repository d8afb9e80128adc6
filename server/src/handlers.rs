use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use uuid::Uuid;

use digitpad_shared::{ImagePayload, PingResponse, PredictResponse, TransportError, UPLOAD_FIELD};

use crate::state::AppState;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("missing `file` field")]
    MissingFile,
    #[error("uploaded file is empty")]
    EmptyFile,
    #[error("malformed multipart body: {0}")]
    Multipart(String),
    #[error("classifier unavailable: {0}")]
    Upstream(#[from] TransportError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingFile | ApiError::EmptyFile | ApiError::Multipart(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.to_string() });
        (self.status(), Json(body)).into_response()
    }
}

pub async fn ping_handler(State(state): State<AppState>) -> Response {
    match state.classifier.ping().await {
        Ok(response) if response.is_alive() => Json(PingResponse::alive()).into_response(),
        Ok(response) => {
            tracing::info!(status = %response.status, "classifier not ready yet");
            (StatusCode::SERVICE_UNAVAILABLE, Json(response)).into_response()
        }
        Err(error) => {
            tracing::warn!(%error, "classifier ping failed");
            StatusCode::SERVICE_UNAVAILABLE.into_response()
        }
    }
}

#[tracing::instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
pub async fn predict_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<PredictResponse>, ApiError> {
    let payload = read_upload(&mut multipart).await?;
    tracing::info!(
        file_name = %payload.file_name,
        bytes = payload.bytes.len(),
        "forwarding prediction"
    );
    let response = forward_prediction(&state, &payload).await?;
    tracing::info!(prediction = %response.prediction, "prediction relayed");
    Ok(Json(response))
}

pub async fn read_upload(multipart: &mut Multipart) -> Result<ImagePayload, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|error| ApiError::Multipart(error.body_text()))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let mut payload = ImagePayload::png(Vec::new());
        if let Some(file_name) = field.file_name() {
            payload.file_name = file_name.to_string();
        }
        if let Some(mime) = field.content_type() {
            payload.mime = mime.to_string();
        }
        let bytes = field
            .bytes()
            .await
            .map_err(|error| ApiError::Multipart(error.body_text()))?;
        if bytes.is_empty() {
            return Err(ApiError::EmptyFile);
        }
        payload.bytes = bytes.to_vec();
        return Ok(payload);
    }
    Err(ApiError::MissingFile)
}

/// One upstream attempt; the browser owns the retry policy.
pub async fn forward_prediction(
    state: &AppState,
    payload: &ImagePayload,
) -> Result<PredictResponse, ApiError> {
    state.classifier.predict(payload).await.map_err(|error| {
        tracing::warn!(%error, "upstream prediction failed");
        ApiError::from(error)
    })
}
