use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use digitpad_shared::{DrawOp, Point, Raster, CANVAS_SIZE, STROKE_WIDTH};

use crate::state::{State, BACKGROUND_COLOR, INK_COLOR};

pub fn draw_dot(ctx: &CanvasRenderingContext2d, center: Point) {
    ctx.set_fill_style_str(INK_COLOR);
    ctx.begin_path();
    let _ = ctx.arc(
        center.x as f64,
        center.y as f64,
        STROKE_WIDTH as f64 / 2.0,
        0.0,
        std::f64::consts::PI * 2.0,
    );
    ctx.fill();
}

pub fn draw_segment(ctx: &CanvasRenderingContext2d, from: Point, to: Point) {
    ctx.set_stroke_style_str(INK_COLOR);
    ctx.set_line_width(STROKE_WIDTH as f64);
    ctx.set_line_cap("round");
    ctx.begin_path();
    ctx.move_to(from.x as f64, from.y as f64);
    ctx.line_to(to.x as f64, to.y as f64);
    ctx.stroke();
}

pub fn draw_op(ctx: &CanvasRenderingContext2d, op: &DrawOp) {
    match *op {
        DrawOp::Dot { center } => draw_dot(ctx, center),
        DrawOp::Segment { from, to } => draw_segment(ctx, from, to),
    }
}

pub fn flush_pending(state: &mut State) -> usize {
    let pending = std::mem::take(&mut state.pending);
    for op in &pending {
        draw_op(&state.ctx, op);
    }
    pending.len()
}

pub fn clear_canvas(state: &mut State) {
    let size = CANVAS_SIZE as f64;
    state.pending.clear();
    state.capture.end();
    state.ctx.clear_rect(0.0, 0.0, size, size);
    state.ctx.set_fill_style_str(BACKGROUND_COLOR);
    state.ctx.fill_rect(0.0, 0.0, size, size);
}

pub fn read_raster(state: &State) -> Result<Raster, JsValue> {
    let size = CANVAS_SIZE as f64;
    let image = state.ctx.get_image_data(0.0, 0.0, size, size)?;
    Raster::from_rgba(image.width(), image.height(), image.data().0)
        .map_err(|error| JsValue::from_str(&error.to_string()))
}
