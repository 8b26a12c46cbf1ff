use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

use swarmview::playback::FrameDraw;
use swarmview::viewport::SurfaceSize;

const BACKGROUND: &str = "#0a0f1a";
const MARKER_FILL: &str = "#ef4444";
const MARKER_STROKE: &str = "#ffffff";
const PLACEHOLDER_TEXT: &str = "#9ca3af";

pub(super) fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, String> {
    canvas
        .get_context("2d")
        .map_err(|_| "canvas: get_context threw".to_string())?
        .ok_or("canvas: missing 2d context".to_string())?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|_| "canvas: context is not 2d".to_string())
}

/// Matches the backing store to the on-screen size and returns it.
pub(super) fn fit_to_client(canvas: &HtmlCanvasElement) -> SurfaceSize {
    let rect = canvas.get_bounding_client_rect();
    let w = rect.width().round().max(1.0);
    let h = rect.height().round().max(1.0);
    if canvas.width() != w as u32 {
        canvas.set_width(w as u32);
    }
    if canvas.height() != h as u32 {
        canvas.set_height(h as u32);
    }
    SurfaceSize::new(w, h)
}

pub(super) fn clear(canvas: &HtmlCanvasElement) -> Result<(), String> {
    let ctx = context_2d(canvas)?;
    ctx.clear_rect(0.0, 0.0, canvas.width() as f64, canvas.height() as f64);
    Ok(())
}

/// Background stretched to the surface, then one marker per agent.
pub(super) fn draw_frame(
    canvas: &HtmlCanvasElement,
    background: Option<&HtmlImageElement>,
    frame: &FrameDraw,
    marker_radius: f64,
) -> Result<(), String> {
    let ctx = context_2d(canvas)?;
    let w = canvas.width() as f64;
    let h = canvas.height() as f64;

    ctx.clear_rect(0.0, 0.0, w, h);
    match background {
        Some(img) => ctx
            .draw_image_with_html_image_element_and_dw_and_dh(img, 0.0, 0.0, w, h)
            .map_err(|_| "canvas: draw_image failed".to_string())?,
        None => {
            ctx.set_fill_style_str(BACKGROUND);
            ctx.fill_rect(0.0, 0.0, w, h);
        }
    }

    ctx.set_fill_style_str(MARKER_FILL);
    ctx.set_stroke_style_str(MARKER_STROKE);
    ctx.set_line_width(1.0);
    for &(x, y) in &frame.markers {
        ctx.begin_path();
        ctx.arc(x, y, marker_radius, 0.0, std::f64::consts::TAU)
            .map_err(|_| "canvas: arc failed".to_string())?;
        ctx.fill();
        ctx.stroke();
    }
    Ok(())
}

/// Square surface with a centred message.
pub(super) fn draw_placeholder(
    canvas: &HtmlCanvasElement,
    message: &str,
    size_px: u32,
) -> Result<(), String> {
    canvas.set_width(size_px);
    canvas.set_height(size_px);
    let ctx = context_2d(canvas)?;
    let side = size_px as f64;

    ctx.set_fill_style_str(BACKGROUND);
    ctx.fill_rect(0.0, 0.0, side, side);

    ctx.set_fill_style_str(PLACEHOLDER_TEXT);
    ctx.set_font("14px system-ui, sans-serif");
    ctx.set_text_align("center");
    ctx.set_text_baseline("middle");

    let lines = wrap_words(&ctx, message, side - 24.0);
    let line_h = 18.0;
    let top = side / 2.0 - line_h * (lines.len() as f64 - 1.0) / 2.0;
    for (i, line) in lines.iter().enumerate() {
        ctx.fill_text(line, side / 2.0, top + line_h * i as f64)
            .map_err(|_| "canvas: fill_text failed".to_string())?;
    }
    Ok(())
}

fn wrap_words(ctx: &CanvasRenderingContext2d, text: &str, max_width: f64) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        let fits = ctx
            .measure_text(&candidate)
            .map(|m| m.width() <= max_width)
            .unwrap_or(true);
        if fits || current.is_empty() {
            current = candidate;
        } else {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
