use async_trait::async_trait;
use thiserror::Error;

use crate::encode::PNG_MIME;
use crate::{Label, PingResponse, PredictResponse, ERROR_LABEL, MAX_ATTEMPTS, UPLOAD_FILE_NAME};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(String),
    #[error("HTTP error: {0}")]
    Status(u16),
    #[error("unexpected response body: {0}")]
    Body(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct ImagePayload {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub mime: String,
}

impl ImagePayload {
    pub fn png(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            file_name: UPLOAD_FILE_NAME.to_string(),
            mime: PNG_MIME.to_string(),
        }
    }
}

// Browser implementations hold JS handles, so the futures are not `Send` on
// wasm32.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait Classifier {
    async fn predict(&self, payload: &ImagePayload) -> Result<PredictResponse, TransportError>;
    async fn ping(&self) -> Result<PingResponse, TransportError>;
}

#[derive(Clone, Debug, PartialEq)]
pub enum Prediction {
    Label(Label),
    Error,
}

impl Prediction {
    pub fn display(&self) -> String {
        match self {
            Prediction::Label(label) => label.to_string(),
            Prediction::Error => ERROR_LABEL.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SubmitReport {
    pub prediction: Prediction,
    pub attempts: u32,
    pub last_error: Option<TransportError>,
}

pub async fn submit_with_retry<C>(classifier: &C, payload: &ImagePayload) -> SubmitReport
where
    C: Classifier + ?Sized,
{
    let mut last_error = None;
    for attempt in 1..=MAX_ATTEMPTS {
        match classifier.predict(payload).await {
            Ok(response) => {
                return SubmitReport {
                    prediction: Prediction::Label(response.prediction),
                    attempts: attempt,
                    last_error,
                }
            }
            Err(error) => last_error = Some(error),
        }
    }
    SubmitReport {
        prediction: Prediction::Error,
        attempts: MAX_ATTEMPTS,
        last_error,
    }
}
