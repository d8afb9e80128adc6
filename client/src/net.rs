use async_trait::async_trait;
use js_sys::{Array, Promise, Uint8Array};
use serde::de::DeserializeOwned;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, BlobPropertyBag, FormData, RequestInit, Response, Window};

use digitpad_shared::{
    Classifier, ImagePayload, Pause, PingResponse, PredictResponse, TransportError, UPLOAD_FIELD,
};

use crate::config::api_override;

pub fn api_base(window: &Window) -> Result<String, JsValue> {
    let location = window.location();
    let search = location.search().unwrap_or_default();
    let base = match api_override(&search) {
        Some(api) => js_sys::decode_uri_component(&api)?
            .as_string()
            .unwrap_or(api),
        None => location.origin()?,
    };
    Ok(base.trim_end_matches('/').to_string())
}

fn js_error(value: JsValue) -> TransportError {
    let message = value
        .as_string()
        .or_else(|| {
            value
                .dyn_ref::<js_sys::Error>()
                .map(|error| String::from(error.message()))
        })
        .unwrap_or_else(|| format!("{value:?}"));
    TransportError::Network(message)
}

pub struct FetchClassifier {
    window: Window,
    base: String,
}

impl FetchClassifier {
    pub fn new(window: Window, base: String) -> Self {
        Self { window, base }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    async fn fetch_json<T: DeserializeOwned>(
        &self,
        url: &str,
        init: &RequestInit,
    ) -> Result<T, TransportError> {
        let value = JsFuture::from(self.window.fetch_with_str_and_init(url, init))
            .await
            .map_err(js_error)?;
        let response: Response = value.dyn_into().map_err(js_error)?;
        if !response.ok() {
            return Err(TransportError::Status(response.status()));
        }
        let text = JsFuture::from(response.text().map_err(js_error)?)
            .await
            .map_err(js_error)?
            .as_string()
            .ok_or_else(|| TransportError::Body("response is not text".into()))?;
        serde_json::from_str(&text).map_err(|error| TransportError::Body(error.to_string()))
    }
}

#[async_trait(?Send)]
impl Classifier for FetchClassifier {
    async fn predict(&self, payload: &ImagePayload) -> Result<PredictResponse, TransportError> {
        let bytes = Uint8Array::from(payload.bytes.as_slice());
        let options = BlobPropertyBag::new();
        options.set_type(&payload.mime);
        let blob = Blob::new_with_u8_array_sequence_and_options(&Array::of1(&bytes), &options)
            .map_err(js_error)?;
        let form = FormData::new().map_err(js_error)?;
        form.append_with_blob_and_filename(UPLOAD_FIELD, &blob, &payload.file_name)
            .map_err(js_error)?;

        let init = RequestInit::new();
        init.set_method("POST");
        init.set_body(&form);
        self.fetch_json(&format!("{}/predict", self.base), &init).await
    }

    async fn ping(&self) -> Result<PingResponse, TransportError> {
        let now = js_sys::Date::now() as u64;
        let init = RequestInit::new();
        init.set_method("GET");
        self.fetch_json(&format!("{}/ping?t={now}", self.base), &init)
            .await
    }
}

pub struct TimeoutPause {
    window: Window,
}

impl TimeoutPause {
    pub fn new(window: Window) -> Self {
        Self { window }
    }
}

#[async_trait(?Send)]
impl Pause for TimeoutPause {
    async fn pause(&self, millis: u32) {
        let window = self.window.clone();
        let promise = Promise::new(&mut |resolve, _reject| {
            let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
                &resolve,
                millis as i32,
            );
        });
        let _ = JsFuture::from(promise).await;
    }
}
