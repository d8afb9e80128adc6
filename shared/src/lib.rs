use std::fmt;

use serde::{Deserialize, Serialize};

pub mod capture;
pub mod encode;
pub mod guard;
pub mod liveness;
pub mod normalize;
pub mod predict;
pub mod raster;
pub mod submit;

pub use capture::{DrawOp, StrokeCapture};
pub use encode::{encode_png, EncodeError};
pub use guard::{SubmitGuard, SubmitTicket};
pub use liveness::{poll_until_alive, Pause};
pub use normalize::{normalize, BoundingBox, NormalizeError};
pub use predict::{predict_bitmap, predict_raster, Outcome};
pub use raster::Raster;
pub use submit::{submit_with_retry, Classifier, ImagePayload, Prediction, SubmitReport, TransportError};

pub const CANVAS_SIZE: u32 = 280;
pub const STROKE_WIDTH: f32 = 20.0;
pub const MODEL_SIZE: u32 = 28;
/// The cropped digit is fitted into this square before being framed.
pub const FIT_SIZE: u32 = 20;
pub const MARGIN: u32 = (MODEL_SIZE - FIT_SIZE) / 2;

pub const MAX_ATTEMPTS: u32 = 2;
pub const PING_RETRY_DELAY_MS: u32 = 3000;

pub const UPLOAD_FIELD: &str = "file";
pub const UPLOAD_FILE_NAME: &str = "canvas.png";
pub const ERROR_LABEL: &str = "Error";

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn finite(self) -> Option<Self> {
        if self.x.is_finite() && self.y.is_finite() {
            Some(self)
        } else {
            None
        }
    }

    pub fn distance_sq(self, other: Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

// The service answers with either a bare number or a string.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum Label {
    Number(serde_json::Number),
    Text(String),
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Number(number) => write!(f, "{number}"),
            Label::Text(text) => f.write_str(text),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PredictResponse {
    pub prediction: Label,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PingResponse {
    pub status: String,
}

impl PingResponse {
    pub const ALIVE: &'static str = "alive";

    pub fn alive() -> Self {
        Self {
            status: Self::ALIVE.to_string(),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.status == Self::ALIVE
    }
}
