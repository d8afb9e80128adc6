use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, HtmlButtonElement, HtmlCanvasElement, HtmlImageElement, HtmlInputElement,
    MouseEvent, TouchEvent,
};

use digitpad_shared::Point;

use crate::status::Status;

pub fn get_element<T: JsCast>(document: &Document, id: &str) -> Result<T, JsValue> {
    let element = document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("Missing element: {id}")))?;
    element
        .dyn_into::<T>()
        .map_err(|_| JsValue::from_str(&format!("Invalid element type: {id}")))
}

#[derive(Clone)]
pub struct Ui {
    pub canvas: HtmlCanvasElement,
    pub clear_button: HtmlButtonElement,
    pub predict_button: HtmlButtonElement,
    pub file_input: HtmlInputElement,
    pub file_button: HtmlButtonElement,
    pub file_preview: HtmlImageElement,
    pub result: Element,
    pub status_el: Element,
    pub status_text: Element,
}

impl Ui {
    pub fn from_document(document: &Document) -> Result<Self, JsValue> {
        Ok(Self {
            canvas: get_element(document, "board")?,
            clear_button: get_element(document, "clear")?,
            predict_button: get_element(document, "predict")?,
            file_input: get_element(document, "file-input")?,
            file_button: get_element(document, "file-predict")?,
            file_preview: get_element(document, "file-preview")?,
            result: get_element(document, "prediction")?,
            status_el: get_element(document, "status")?,
            status_text: get_element(document, "status-text")?,
        })
    }

    pub fn show_status(&self, status: Status) {
        set_status(&self.status_el, &self.status_text, status.data_state(), status.text());
    }

    pub fn show_prediction(&self, label: Option<&str>) {
        self.result.set_text_content(label);
        let hidden = if label.is_some() { "false" } else { "true" };
        let _ = self.result.set_attribute("aria-hidden", hidden);
    }

    pub fn set_controls_enabled(&self, enabled: bool) {
        set_busy(&self.predict_button, !enabled);
        set_busy(&self.file_button, !enabled);
    }
}

pub fn set_status(status_el: &Element, status_text: &Element, state: &str, text: &str) {
    let _ = status_el.set_attribute("data-state", state);
    status_text.set_text_content(Some(text));
}

pub fn set_busy(button: &HtmlButtonElement, busy: bool) {
    let value = if busy { "true" } else { "false" };
    let _ = button.set_attribute("aria-busy", value);
    button.set_disabled(busy);
}

pub fn mouse_point(event: &MouseEvent) -> Option<Point> {
    Point::new(event.offset_x() as f32, event.offset_y() as f32).finite()
}

// Touches report page coordinates.
pub fn touch_point(canvas: &HtmlCanvasElement, event: &TouchEvent) -> Option<Point> {
    let touch = event.touches().get(0)?;
    let rect = canvas.get_bounding_client_rect();
    let x = touch.client_x() as f64 - rect.left();
    let y = touch.client_y() as f64 - rect.top();
    Point::new(x as f32, y as f32).finite()
}
