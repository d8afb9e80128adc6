use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::de::DeserializeOwned;

use digitpad_shared::{
    Classifier, ImagePayload, PingResponse, PredictResponse, TransportError, UPLOAD_FIELD,
};

pub const DEFAULT_CLASSIFIER_URL: &str = "https://mnist-api-8p5a.onrender.com";

// Upstream hosts may be cold-starting.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

pub struct UpstreamClassifier {
    client: Client,
    base: String,
}

impl UpstreamClassifier {
    pub fn new(base: &str) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base: base.trim_end_matches('/').to_string(),
        })
    }

    pub fn base(&self) -> &str {
        &self.base
    }
}

fn network_error(error: reqwest::Error) -> TransportError {
    TransportError::Network(error.to_string())
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, TransportError> {
    let status = response.status();
    if !status.is_success() {
        return Err(TransportError::Status(status.as_u16()));
    }
    let body = response.bytes().await.map_err(network_error)?;
    serde_json::from_slice(&body).map_err(|error| TransportError::Body(error.to_string()))
}

#[async_trait]
impl Classifier for UpstreamClassifier {
    async fn predict(&self, payload: &ImagePayload) -> Result<PredictResponse, TransportError> {
        let part = Part::bytes(payload.bytes.clone())
            .file_name(payload.file_name.clone())
            .mime_str(&payload.mime)
            .map_err(network_error)?;
        let form = Form::new().part(UPLOAD_FIELD, part);
        let response = self
            .client
            .post(format!("{}/predict", self.base))
            .multipart(form)
            .send()
            .await
            .map_err(network_error)?;
        read_json(response).await
    }

    async fn ping(&self) -> Result<PingResponse, TransportError> {
        let response = self
            .client
            .get(format!("{}/ping", self.base))
            .send()
            .await
            .map_err(network_error)?;
        read_json(response).await
    }
}
