//! Browser canvas surface for the on-screen overlay.

use std::f64::consts::TAU;

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::{RenderError, Rgba, Shadow, Surface};
use crate::geometry::{Bounds, Point};
use crate::scaling::Size;

/// Font family used for label chips.
const FONT_FAMILY: &str = "Arial";

fn log_canvas_error(op: &str, result: Result<(), JsValue>) {
    if let Err(e) = result {
        log::warn!("⚠️ Canvas {} failed: {:?}", op, e);
    }
}

/// 2D context of an overlay `<canvas>` element.
pub struct WebCanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl WebCanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, RenderError> {
        let ctx = canvas
            .get_context("2d")
            .map_err(|e| RenderError::Canvas(format!("{:?}", e)))?
            .ok_or_else(|| RenderError::Canvas("2d context unavailable".to_string()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| RenderError::Canvas("not a 2d context".to_string()))?;
        Ok(Self { canvas, ctx })
    }

    fn set_font(&self, font_size: f32) {
        self.ctx.set_font(&format!("{}px {}", font_size, FONT_FAMILY));
    }

    fn trace_path(&self, points: &[Point], offset: Point, closed: bool) -> bool {
        let Some((first, rest)) = points.split_first() else {
            return false;
        };
        self.ctx.begin_path();
        self.ctx
            .move_to((first.x + offset.x) as f64, (first.y + offset.y) as f64);
        for p in rest {
            self.ctx.line_to((p.x + offset.x) as f64, (p.y + offset.y) as f64);
        }
        if closed {
            self.ctx.close_path();
        }
        true
    }

    fn reset_shadow(&self) {
        self.ctx.set_shadow_color("transparent");
        self.ctx.set_shadow_blur(0.0);
        self.ctx.set_shadow_offset_x(0.0);
        self.ctx.set_shadow_offset_y(0.0);
    }
}

impl Surface for WebCanvasSurface {
    fn resize(&mut self, size: Size) -> Result<(), RenderError> {
        let (width, height) = size.to_pixels();
        // Assigning the size clears the canvas even when unchanged
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        Ok(())
    }

    fn size(&self) -> Size {
        Size::from((self.canvas.width(), self.canvas.height()))
    }

    fn clear(&mut self) {
        self.ctx.clear_rect(
            0.0,
            0.0,
            self.canvas.width() as f64,
            self.canvas.height() as f64,
        );
    }

    fn stroke_polyline(&mut self, points: &[Point], closed: bool, color: Rgba, width: f32) {
        if self.trace_path(points, Point::default(), closed) {
            self.ctx.set_stroke_style_str(&color.to_css());
            self.ctx.set_line_width(width as f64);
            self.ctx.stroke();
        }
    }

    fn stroke_rect(&mut self, bounds: Bounds, color: Rgba, width: f32) {
        self.ctx.set_stroke_style_str(&color.to_css());
        self.ctx.set_line_width(width as f64);
        self.ctx.stroke_rect(
            bounds.min.x as f64,
            bounds.min.y as f64,
            bounds.width() as f64,
            bounds.height() as f64,
        );
    }

    fn fill_rect(&mut self, bounds: Bounds, color: Rgba) {
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.fill_rect(
            bounds.min.x as f64,
            bounds.min.y as f64,
            bounds.width() as f64,
            bounds.height() as f64,
        );
    }

    fn fill_polygon(&mut self, points: &[Point], color: Rgba, shadow: Option<Shadow>) {
        if !self.trace_path(points, Point::default(), true) {
            return;
        }
        if let Some(shadow) = shadow {
            self.ctx.set_shadow_color(&shadow.color.to_css());
            self.ctx.set_shadow_blur(shadow.blur as f64);
            self.ctx.set_shadow_offset_x(shadow.offset.x as f64);
            self.ctx.set_shadow_offset_y(shadow.offset.y as f64);
        }
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.fill();
        self.reset_shadow();
    }

    fn fill_circle(&mut self, center: Point, radius: f32, color: Rgba) {
        self.ctx.begin_path();
        log_canvas_error(
            "arc",
            self.ctx
                .arc(center.x as f64, center.y as f64, radius as f64, 0.0, TAU),
        );
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.fill();
    }

    fn stroke_circle(&mut self, center: Point, radius: f32, color: Rgba, width: f32) {
        self.ctx.begin_path();
        log_canvas_error(
            "arc",
            self.ctx
                .arc(center.x as f64, center.y as f64, radius as f64, 0.0, TAU),
        );
        self.ctx.set_stroke_style_str(&color.to_css());
        self.ctx.set_line_width(width as f64);
        self.ctx.stroke();
    }

    fn measure_text(&self, text: &str, font_size: f32) -> f32 {
        self.set_font(font_size);
        match self.ctx.measure_text(text) {
            Ok(metrics) => metrics.width() as f32,
            Err(e) => {
                log::warn!("⚠️ measureText failed: {:?}", e);
                0.0
            }
        }
    }

    fn fill_text(&mut self, text: &str, origin: Point, font_size: f32, color: Rgba) {
        self.set_font(font_size);
        self.ctx.set_fill_style_str(&color.to_css());
        log_canvas_error(
            "fillText",
            self.ctx.fill_text(text, origin.x as f64, origin.y as f64),
        );
    }
}
