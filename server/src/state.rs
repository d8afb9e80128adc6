use std::sync::Arc;

use digitpad_shared::Classifier;

pub const MAX_UPLOAD_BYTES: usize = 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub classifier: Arc<dyn Classifier + Send + Sync>,
}

impl AppState {
    pub fn new(classifier: impl Classifier + Send + Sync + 'static) -> Self {
        Self {
            classifier: Arc::new(classifier),
        }
    }
}
