use wasm_bindgen::prelude::Closure;
use web_sys::{CanvasRenderingContext2d, FileReader, ProgressEvent};

use digitpad_shared::{DrawOp, StrokeCapture};

use crate::preview::PreviewUrls;

pub const INK_COLOR: &str = "black";
pub const BACKGROUND_COLOR: &str = "white";

pub struct Upload {
    pub bytes: Vec<u8>,
    pub name: String,
    pub mime: String,
}

// The closure must outlive the reader's callback, so it is only dropped when
// the next read replaces it.
pub struct PendingRead {
    pub reader: FileReader,
    pub onload: Closure<dyn FnMut(ProgressEvent)>,
}

pub struct State {
    pub ctx: CanvasRenderingContext2d,
    pub capture: StrokeCapture,
    pub pending: Vec<DrawOp>,
    pub flush_scheduled: bool,
    pub upload: Option<Upload>,
    pub pending_read: Option<PendingRead>,
    pub previews: PreviewUrls,
    pub ready: bool,
}

impl State {
    pub fn new(ctx: CanvasRenderingContext2d) -> Self {
        Self {
            ctx,
            capture: StrokeCapture::new(),
            pending: Vec::new(),
            flush_scheduled: false,
            upload: None,
            pending_read: None,
            previews: PreviewUrls::new(),
            ready: false,
        }
    }

    pub fn queue(&mut self, op: Option<DrawOp>) -> bool {
        match op {
            Some(op) => {
                self.pending.push(op);
                true
            }
            None => false,
        }
    }
}
