use std::cell::{Cell, RefCell};
use std::rc::Rc;

use js_sys::{Reflect, Uint8Array};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    AddEventListenerOptions, CanvasRenderingContext2d, Event, EventTarget, FileReader,
    MouseEvent, ProgressEvent, TouchEvent, Url, Window,
};

use digitpad_shared::{
    poll_until_alive, predict_raster, submit_with_retry, ImagePayload, Outcome, Prediction,
    SubmitGuard, CANVAS_SIZE, ERROR_LABEL,
};

use crate::config::debug_enabled;
use crate::dom::{mouse_point, touch_point, Ui};
use crate::net::{api_base, FetchClassifier, TimeoutPause};
use crate::render::{clear_canvas, flush_pending, read_raster};
use crate::state::{PendingRead, State, Upload};
use crate::status::Status;

fn document_ready_state(document: &web_sys::Document) -> Option<String> {
    Reflect::get(document.as_ref(), &JsValue::from_str("readyState"))
        .ok()?
        .as_string()
}

#[derive(Clone)]
struct App {
    window: Window,
    state: Rc<RefCell<State>>,
    ui: Ui,
    guard: SubmitGuard,
    classifier: Rc<FetchClassifier>,
    debug: bool,
}

impl App {
    fn log(&self, message: &str) {
        if self.debug {
            web_sys::console::log_1(&message.into());
        }
    }

    fn sync_controls(&self) {
        let ready = self.state.borrow().ready;
        self.ui.set_controls_enabled(ready && !self.guard.is_busy());
    }

    fn schedule_flush(&self) {
        {
            let mut state = self.state.borrow_mut();
            if state.flush_scheduled {
                return;
            }
            state.flush_scheduled = true;
        }
        let flush_state = self.state.clone();
        let cb = Closure::once_into_js(move |_: f64| {
            let mut state = flush_state.borrow_mut();
            state.flush_scheduled = false;
            flush_pending(&mut state);
        });
        if self
            .window
            .request_animation_frame(cb.unchecked_ref())
            .is_err()
        {
            let mut state = self.state.borrow_mut();
            state.flush_scheduled = false;
            flush_pending(&mut state);
        }
    }

    fn clear(&self) {
        clear_canvas(&mut self.state.borrow_mut());
        self.ui.show_prediction(None);
        let ready = self.state.borrow().ready;
        if let Some(status) = Status::after_clear(ready, self.guard.is_busy()) {
            self.ui.show_status(status);
        }
    }

    fn predict_drawing(&self) {
        let Some(ticket) = self.guard.try_acquire() else {
            self.log("Predict ignored: a request is already in flight");
            return;
        };
        let raster = {
            let mut state = self.state.borrow_mut();
            flush_pending(&mut state);
            read_raster(&state)
        };
        let raster = match raster {
            Ok(raster) => raster,
            Err(error) => {
                web_sys::console::error_2(&"Failed to read canvas pixels".into(), &error);
                self.ui.show_prediction(Some(ERROR_LABEL));
                self.ui.show_status(Status::Error);
                return;
            }
        };
        self.begin_request();
        let app = self.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let outcome = predict_raster(app.classifier.as_ref(), &raster).await;
            drop(ticket);
            app.finish(outcome);
        });
    }

    fn predict_upload(&self) {
        let payload = {
            let state = self.state.borrow();
            let Some(upload) = &state.upload else {
                return;
            };
            ImagePayload {
                bytes: upload.bytes.clone(),
                file_name: upload.name.clone(),
                mime: upload.mime.clone(),
            }
        };
        let Some(ticket) = self.guard.try_acquire() else {
            self.log("Upload predict ignored: a request is already in flight");
            return;
        };
        self.begin_request();
        self.log(&format!(
            "Submitting {} ({} bytes) to {}",
            payload.file_name,
            payload.bytes.len(),
            self.classifier.base()
        ));
        let app = self.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let report = submit_with_retry(app.classifier.as_ref(), &payload).await;
            drop(ticket);
            app.finish(Outcome::Submitted(report));
        });
    }

    fn begin_request(&self) {
        self.ui.show_prediction(None);
        self.ui.show_status(Status::Busy);
        self.sync_controls();
    }

    fn finish(&self, outcome: Outcome) {
        match outcome {
            Outcome::Blank => {
                self.log("Predict skipped: canvas is blank");
                self.ui.show_prediction(None);
                self.ui.show_status(Status::Blank);
            }
            Outcome::EncodeFailed(error) => {
                web_sys::console::error_1(&format!("Failed to encode bitmap: {error}").into());
                self.ui.show_prediction(Some(ERROR_LABEL));
                self.ui.show_status(Status::Error);
            }
            Outcome::Submitted(report) => {
                if let Some(error) = &report.last_error {
                    web_sys::console::error_1(
                        &format!(
                            "Prediction attempt failed: {error} (attempts={})",
                            report.attempts
                        )
                        .into(),
                    );
                }
                self.ui.show_prediction(Some(&report.prediction.display()));
                match report.prediction {
                    Prediction::Label(_) => self.ui.show_status(Status::Ready),
                    Prediction::Error => self.ui.show_status(Status::Error),
                }
            }
        }
        self.sync_controls();
    }

    fn wait_for_classifier(&self) {
        self.ui.show_status(Status::Connecting);
        self.sync_controls();
        let app = self.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let pause = TimeoutPause::new(app.window.clone());
            let probes = poll_until_alive(app.classifier.as_ref(), &pause).await;
            app.log(&format!("Classifier alive after {probes} probe(s)"));
            app.state.borrow_mut().ready = true;
            app.ui.show_status(Status::Ready);
            app.sync_controls();
        });
    }

    fn load_upload(&self) -> Result<(), JsValue> {
        let Some(file) = self.ui.file_input.files().and_then(|files| files.get(0)) else {
            return Ok(());
        };
        let reader = FileReader::new()?;
        let load_state = self.state.clone();
        let ui = self.ui.clone();
        let name = file.name();
        let mime = Some(file.type_())
            .filter(|mime| !mime.is_empty())
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let preview_url = Url::create_object_url_with_blob(&file)?;
        let onload = Closure::<dyn FnMut(ProgressEvent)>::new(move |event: ProgressEvent| {
            let mut state = load_state.borrow_mut();
            let Some(bytes) = read_upload_bytes(&event) else {
                web_sys::console::error_1(&"Failed to read the selected file".into());
                revoke(state.previews.failed());
                return;
            };
            revoke(state.previews.loaded());
            if let Some(url) = state.previews.shown() {
                ui.file_preview.set_src(url);
            }
            ui.show_prediction(None);
            state.upload = Some(Upload {
                bytes,
                name: name.clone(),
                mime: mime.clone(),
            });
        });
        let mut state = self.state.borrow_mut();
        if let Some(previous) = state.pending_read.take() {
            previous.reader.set_onload(None);
            previous.reader.abort();
        }
        revoke(state.previews.start(preview_url));
        reader.set_onload(Some(onload.as_ref().unchecked_ref()));
        if let Err(error) = reader.read_as_array_buffer(&file) {
            reader.set_onload(None);
            revoke(state.previews.failed());
            return Err(error);
        }
        state.pending_read = Some(PendingRead { reader, onload });
        Ok(())
    }
}

fn revoke(url: Option<String>) {
    if let Some(url) = url {
        let _ = Url::revoke_object_url(&url);
    }
}

fn read_upload_bytes(event: &ProgressEvent) -> Option<Vec<u8>> {
    let reader: FileReader = event.target()?.dyn_into().ok()?;
    let buffer = reader.result().ok()?;
    let bytes = Uint8Array::new(&buffer).to_vec();
    if bytes.is_empty() {
        None
    } else {
        Some(bytes)
    }
}

fn listen_event(
    target: &EventTarget,
    kind: &str,
    handler: impl FnMut(Event) + 'static,
) -> Result<(), JsValue> {
    let closure = Closure::<dyn FnMut(Event)>::new(handler);
    target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

fn listen_mouse(
    target: &EventTarget,
    kind: &str,
    handler: impl FnMut(MouseEvent) + 'static,
) -> Result<(), JsValue> {
    let closure = Closure::<dyn FnMut(MouseEvent)>::new(handler);
    target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

// Non-passive, so drawing can keep the page from scrolling.
fn listen_touch(
    target: &EventTarget,
    kind: &str,
    handler: impl FnMut(TouchEvent) + 'static,
) -> Result<(), JsValue> {
    let closure = Closure::<dyn FnMut(TouchEvent)>::new(handler);
    let options = AddEventListenerOptions::new();
    options.set_passive(false);
    target.add_event_listener_with_callback_and_add_event_listener_options(
        kind,
        closure.as_ref().unchecked_ref(),
        &options,
    )?;
    closure.forget();
    Ok(())
}

#[wasm_bindgen(start)]
pub fn run() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("Missing window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("Missing document"))?;
    let started = Rc::new(Cell::new(false));

    if document_ready_state(&document).as_deref() == Some("complete") {
        started.set(true);
        return start_app();
    }

    let onload_started = started.clone();
    let onload = Closure::<dyn FnMut(Event)>::new(move |_| {
        if onload_started.replace(true) {
            return;
        }
        if let Err(err) = start_app() {
            web_sys::console::error_1(&err);
        }
    });
    window.add_event_listener_with_callback("load", onload.as_ref().unchecked_ref())?;
    onload.forget();

    Ok(())
}

fn start_app() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("Missing window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("Missing document"))?;
    let search = window.location().search().unwrap_or_default();
    let debug = debug_enabled(&search);

    let ui = Ui::from_document(&document)?;
    ui.canvas.set_width(CANVAS_SIZE);
    ui.canvas.set_height(CANVAS_SIZE);
    let ctx = ui
        .canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("Missing 2d context"))?
        .dyn_into::<CanvasRenderingContext2d>()?;

    let base = api_base(&window)?;
    if debug {
        web_sys::console::log_1(&format!("digitpad debug enabled api={base}").into());
    }

    let app = App {
        window: window.clone(),
        state: Rc::new(RefCell::new(State::new(ctx))),
        ui: ui.clone(),
        guard: SubmitGuard::new(),
        classifier: Rc::new(FetchClassifier::new(window.clone(), base)),
        debug,
    };
    app.clear();

    let canvas: &EventTarget = &ui.canvas;

    {
        let app = app.clone();
        listen_mouse(canvas, "mousedown", move |event: MouseEvent| {
            if event.button() != 0 {
                return;
            }
            let Some(point) = mouse_point(&event) else {
                return;
            };
            let queued = {
                let mut state = app.state.borrow_mut();
                let op = state.capture.begin(point);
                state.queue(op)
            };
            if queued {
                app.schedule_flush();
            }
        })?;
    }

    {
        let app = app.clone();
        listen_mouse(canvas, "mousemove", move |event: MouseEvent| {
            let Some(point) = mouse_point(&event) else {
                return;
            };
            let queued = {
                let mut state = app.state.borrow_mut();
                let op = state.capture.extend(point);
                state.queue(op)
            };
            if queued {
                app.schedule_flush();
            }
        })?;
    }

    for kind in ["mouseup", "mouseleave"] {
        let app = app.clone();
        listen_mouse(canvas, kind, move |_: MouseEvent| {
            app.state.borrow_mut().capture.end();
        })?;
    }

    {
        let app = app.clone();
        listen_touch(canvas, "touchstart", move |event: TouchEvent| {
            event.prevent_default();
            let Some(point) = touch_point(&app.ui.canvas, &event) else {
                return;
            };
            let queued = {
                let mut state = app.state.borrow_mut();
                let op = state.capture.begin(point);
                state.queue(op)
            };
            if queued {
                app.schedule_flush();
            }
        })?;
    }

    {
        let app = app.clone();
        listen_touch(canvas, "touchmove", move |event: TouchEvent| {
            event.prevent_default();
            let Some(point) = touch_point(&app.ui.canvas, &event) else {
                return;
            };
            let queued = {
                let mut state = app.state.borrow_mut();
                let op = state.capture.extend(point);
                state.queue(op)
            };
            if queued {
                app.schedule_flush();
            }
        })?;
    }

    for kind in ["touchend", "touchcancel"] {
        let app = app.clone();
        listen_touch(canvas, kind, move |event: TouchEvent| {
            event.prevent_default();
            app.state.borrow_mut().capture.end();
        })?;
    }

    {
        let app = app.clone();
        listen_event(&ui.clear_button, "click", move |_: Event| app.clear())?;
    }

    {
        let app = app.clone();
        listen_event(&ui.predict_button, "click", move |_: Event| {
            app.predict_drawing()
        })?;
    }

    {
        let app = app.clone();
        listen_event(&ui.file_input, "change", move |_: Event| {
            if let Err(error) = app.load_upload() {
                web_sys::console::error_2(&"Failed to load the selected file".into(), &error);
            }
        })?;
    }

    {
        let app = app.clone();
        listen_event(&ui.file_button, "click", move |_: Event| {
            app.predict_upload()
        })?;
    }

    app.wait_for_classifier();
    Ok(())
}
