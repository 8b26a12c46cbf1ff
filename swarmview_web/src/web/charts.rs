//! Canvas line chart for the convergence curve.

use leptos::html::Canvas;
use leptos::prelude::*;
use web_sys::HtmlCanvasElement;

use swarmview::convergence::{AxisScale, ChartBackend, ConvergenceSeries};

use super::canvas::{context_2d, fit_to_client};

const LINE_COLOR: &str = "#7aa2ff";
const BG_COLOR: &str = "#0a0f1a";
const GRID_COLOR: &str = "rgba(122, 162, 255, 0.18)";
const LABEL_COLOR: &str = "#9ca3af";

const PAD_LEFT: f64 = 64.0;
const PAD_RIGHT: f64 = 12.0;
const PAD_TOP: f64 = 12.0;
const PAD_BOTTOM: f64 = 28.0;

/// Draws onto the chart canvas; a chart instance is the canvas it was drawn on.
pub(super) struct CanvasChart {
    pub node: NodeRef<Canvas>,
}

impl ChartBackend for CanvasChart {
    type Chart = HtmlCanvasElement;

    fn create(&mut self, series: &ConvergenceSeries) -> Result<HtmlCanvasElement, String> {
        let canvas = self
            .node
            .get_untracked()
            .ok_or("chart: canvas not mounted".to_string())?;
        fit_to_client(&canvas);
        draw_series(&canvas, series)?;
        Ok(canvas)
    }

    fn dispose(&mut self, chart: HtmlCanvasElement) {
        if let Ok(ctx) = context_2d(&chart) {
            ctx.clear_rect(0.0, 0.0, chart.width() as f64, chart.height() as f64);
        }
    }
}

fn draw_series(canvas: &HtmlCanvasElement, series: &ConvergenceSeries) -> Result<(), String> {
    let ctx = context_2d(canvas)?;
    let w = canvas.width() as f64;
    let h = canvas.height() as f64;
    let plot_w = (w - PAD_LEFT - PAD_RIGHT).max(1.0);
    let plot_h = (h - PAD_TOP - PAD_BOTTOM).max(1.0);

    ctx.set_fill_style_str(BG_COLOR);
    ctx.fill_rect(0.0, 0.0, w, h);

    // Y grid and labels.
    ctx.set_stroke_style_str(GRID_COLOR);
    ctx.set_line_width(0.5);
    ctx.set_fill_style_str(LABEL_COLOR);
    ctx.set_font("11px system-ui, sans-serif");
    ctx.set_text_align("right");
    ctx.set_text_baseline("middle");
    for (v, label) in series.y_ticks() {
        let Some(f) = series.y_fraction(v) else {
            continue;
        };
        let y = PAD_TOP + plot_h * (1.0 - f);
        ctx.begin_path();
        ctx.move_to(PAD_LEFT, y);
        ctx.line_to(PAD_LEFT + plot_w, y);
        ctx.stroke();
        let _ = ctx.fill_text(&label, PAD_LEFT - 6.0, y);
    }

    // X labels: first and last iteration.
    ctx.set_text_baseline("top");
    if !series.is_empty() {
        ctx.set_text_align("left");
        let _ = ctx.fill_text("0", PAD_LEFT, PAD_TOP + plot_h + 6.0);
        ctx.set_text_align("right");
        let last = (series.len() - 1).to_string();
        let _ = ctx.fill_text(&last, PAD_LEFT + plot_w, PAD_TOP + plot_h + 6.0);
    }
    ctx.set_text_align("center");
    let axis = match series.scale {
        AxisScale::Log => "Iteration (log-scale best value)",
        AxisScale::Linear => "Iteration (best value)",
    };
    let _ = ctx.fill_text(axis, PAD_LEFT + plot_w / 2.0, PAD_TOP + plot_h + 6.0);

    // Line; gaps break the path.
    ctx.set_stroke_style_str(LINE_COLOR);
    ctx.set_line_width(2.0);
    ctx.begin_path();
    let mut pen_down = false;
    for (i, v) in series.values.iter().enumerate() {
        let Some(f) = v.and_then(|v| series.y_fraction(v)) else {
            pen_down = false;
            continue;
        };
        let x = PAD_LEFT + plot_w * series.x_fraction(i);
        let y = PAD_TOP + plot_h * (1.0 - f.clamp(0.0, 1.0));
        if pen_down {
            ctx.line_to(x, y);
        } else {
            ctx.move_to(x, y);
            pen_down = true;
        }
    }
    ctx.stroke();
    Ok(())
}
