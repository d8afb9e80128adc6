use crate::encode::{encode_png, EncodeError};
use crate::normalize::{normalize, NormalizeError};
use crate::raster::Raster;
use crate::submit::{submit_with_retry, Classifier, ImagePayload, SubmitReport};

#[derive(Debug)]
pub enum Outcome {
    Blank,
    EncodeFailed(EncodeError),
    Submitted(SubmitReport),
}

pub async fn predict_raster<C>(classifier: &C, raster: &Raster) -> Outcome
where
    C: Classifier + ?Sized,
{
    match normalize(raster) {
        Ok(bitmap) => predict_bitmap(classifier, &bitmap).await,
        Err(NormalizeError::Blank) => Outcome::Blank,
    }
}

/// Encodes an already normalized bitmap and submits it. Nothing is sent when
/// encoding fails.
pub async fn predict_bitmap<C>(classifier: &C, bitmap: &Raster) -> Outcome
where
    C: Classifier + ?Sized,
{
    match encode_png(bitmap) {
        Ok(bytes) => {
            Outcome::Submitted(submit_with_retry(classifier, &ImagePayload::png(bytes)).await)
        }
        Err(error) => Outcome::EncodeFailed(error),
    }
}
