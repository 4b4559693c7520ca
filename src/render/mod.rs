//! Annotation render pipeline.
//!
//! A single routine draws every visible detection and drawing onto a
//! [`Surface`]. The on-screen overlay and the full-resolution export differ
//! only in the [`RenderPass`] they use: the pair of scales that take
//! detections (original-image pixels) and drawings (displayed-canvas pixels)
//! into the surface's pixel space.
//!
//! Draw order is detections, then drawings, then the in-progress preview.

mod skia;
pub mod style;
#[cfg(target_arch = "wasm32")]
mod web;

pub use skia::{SkiaSurface, load_font, load_system_font};
pub use style::{Rgba, class_color, palette};
#[cfg(target_arch = "wasm32")]
pub use web::WebCanvasSurface;

use thiserror::Error;

use crate::constants::{label, shadow, stroke};
use crate::editor::Preview;
use crate::geometry::{Bounds, Point};
use crate::inference::InferenceMode;
use crate::model::{Detection, Drawing, DrawingKind, Region};
use crate::scaling::{CanvasSpace, Coords, ImageSpace, Scale, Size, Space, display_scale, export_scale};

/// Errors raised while preparing a surface.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Pixel buffer could not be allocated (zero or oversized dimensions)
    #[error("Cannot allocate a {width}x{height} surface")]
    Allocation { width: u32, height: u32 },

    /// The browser canvas rejected an operation
    #[error("Canvas error: {0}")]
    Canvas(String),
}

/// Drop shadow applied behind a filled polygon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shadow {
    pub color: Rgba,
    pub blur: f32,
    pub offset: Point,
}

/// Minimal 2D drawing target.
///
/// Coordinates are in the surface's own pixels. Text is drawn with its
/// baseline starting at `origin`.
pub trait Surface {
    /// Reallocate to `size`. Content is lost when the size changes.
    fn resize(&mut self, size: Size) -> Result<(), RenderError>;
    fn size(&self) -> Size;
    /// Make every pixel transparent.
    fn clear(&mut self);
    fn stroke_polyline(&mut self, points: &[Point], closed: bool, color: Rgba, width: f32);
    fn stroke_rect(&mut self, bounds: Bounds, color: Rgba, width: f32);
    fn fill_rect(&mut self, bounds: Bounds, color: Rgba);
    fn fill_polygon(&mut self, points: &[Point], color: Rgba, shadow: Option<Shadow>);
    fn fill_circle(&mut self, center: Point, radius: f32, color: Rgba);
    fn stroke_circle(&mut self, center: Point, radius: f32, color: Rgba, width: f32);
    /// Advance width of `text` at `font_size` pixels.
    fn measure_text(&self, text: &str, font_size: f32) -> f32;
    fn fill_text(&mut self, text: &str, origin: Point, font_size: f32, color: Rgba);
}

/// What to draw in one frame.
#[derive(Debug, Clone)]
pub struct Scene<'a> {
    pub detections: &'a [Detection],
    pub drawings: &'a [Drawing],
    pub preview: Option<Preview>,
    pub annotations_enabled: bool,
    pub mode: InferenceMode,
}

/// Mapping of both coordinate spaces into the target surface space `T`.
#[derive(Debug, Clone, Copy)]
pub struct RenderPass<T: Space> {
    pub detections: Scale<ImageSpace, T>,
    pub drawings: Scale<CanvasSpace, T>,
}

impl RenderPass<CanvasSpace> {
    /// On-screen overlay: detections scaled down, drawings as stored.
    pub fn display(original: Size, displayed: Size) -> Option<Self> {
        Some(Self {
            detections: display_scale(original, displayed)?,
            drawings: Scale::identity(),
        })
    }
}

impl RenderPass<ImageSpace> {
    /// Full-resolution export: detections as stored, drawings scaled up.
    pub fn export(original: Size, displayed: Size) -> Self {
        let drawings = export_scale(original, displayed).unwrap_or_else(|| {
            log::warn!("⚠️ Displayed size unknown, exporting drawings unscaled");
            Scale::identity()
        });
        Self {
            detections: Scale::identity(),
            drawings,
        }
    }
}

// ============================================================================
// Entry points
// ============================================================================

/// Redraw the overlay for the displayed image.
///
/// The surface is resized to the displayed box and cleared on every call.
/// Nothing else is drawn while annotations are disabled or before the
/// original image size is known.
pub fn render_display(
    surface: &mut dyn Surface,
    scene: &Scene<'_>,
    original: Size,
    displayed: Size,
) -> Result<(), RenderError> {
    surface.resize(displayed)?;
    surface.clear();

    if !scene.annotations_enabled {
        return Ok(());
    }
    let Some(pass) = RenderPass::display(original, displayed) else {
        log::debug!("🖼️ Skipping overlay, image size unknown");
        return Ok(());
    };

    draw_annotations(surface, scene, &pass);
    Ok(())
}

/// Draw annotations over a surface that already holds the source image at
/// original resolution. The preview is never exported.
pub fn render_export(surface: &mut dyn Surface, scene: &Scene<'_>, displayed: Size) {
    if !scene.annotations_enabled {
        return;
    }
    let pass = RenderPass::export(surface.size(), displayed);
    let scene = Scene {
        preview: None,
        ..scene.clone()
    };
    draw_annotations(surface, &scene, &pass);
}

/// Shared drawing routine for display and export.
pub fn draw_annotations<T: Space>(surface: &mut dyn Surface, scene: &Scene<'_>, pass: &RenderPass<T>) {
    for (class_index, detection) in scene.detections.iter().enumerate() {
        for region in detection.visible_regions() {
            draw_region(surface, detection, region, class_index, scene.mode, pass);
        }
    }

    for drawing in scene.drawings.iter().filter(|d| d.visible) {
        draw_drawing(surface, drawing, pass);
    }

    if let Some(preview) = &scene.preview {
        draw_preview(surface, preview, pass);
    }
}

// ============================================================================
// Detections
// ============================================================================

fn draw_region<T: Space>(
    surface: &mut dyn Surface,
    detection: &Detection,
    region: &Region,
    class_index: usize,
    mode: InferenceMode,
    pass: &RenderPass<T>,
) {
    let polygon = region
        .fillable_polygon()
        .filter(|_| mode == InferenceMode::PathologyCheck);

    let anchor = match polygon {
        Some(outline) => {
            let points = pass.detections.points(outline);
            let step = shadow::STEP * (class_index + 1) as f32;
            surface.fill_polygon(
                &points,
                class_color(&detection.class_label),
                Some(Shadow {
                    color: palette::SHADOW,
                    blur: shadow::BLUR,
                    offset: Point::new(step, step),
                }),
            );
            points.first().copied()
        }
        None => {
            let points = pass.detections.points(&region.bbox);
            let (Some(a), Some(b)) = (points.first(), points.get(1)) else {
                return;
            };
            surface.stroke_rect(
                Bounds::from_corners(*a, *b),
                palette::DETECTION_STROKE,
                stroke::WIDTH,
            );
            Some(*a)
        }
    };

    let caption = region.caption(&detection.class_label);
    match anchor {
        Some(anchor) if !caption.is_empty() => {
            draw_chip(surface, &caption, anchor, 1.0, palette::DETECTION_CHIP);
        }
        _ => {}
    }
}

// ============================================================================
// Drawings
// ============================================================================

fn draw_drawing<T: Space>(surface: &mut dyn Surface, drawing: &Drawing, pass: &RenderPass<T>) {
    let metric = pass.drawings.metric();
    let points = draw_shape(surface, drawing.kind, &drawing.points, pass);

    let text = drawing.label.trim();
    match points.first() {
        Some(anchor) if !text.is_empty() => {
            draw_chip(surface, text, *anchor, metric, palette::DRAWING_CHIP);
        }
        _ => {}
    }
}

/// Stroke a drawing-space shape and return its scaled points.
fn draw_shape<T: Space>(
    surface: &mut dyn Surface,
    kind: DrawingKind,
    coords: &Coords<CanvasSpace>,
    pass: &RenderPass<T>,
) -> Vec<Point> {
    let metric = pass.drawings.metric();
    let width = stroke::WIDTH * metric;
    let points = pass.drawings.points(coords);

    match kind {
        DrawingKind::Rectangle => {
            if let (Some(a), Some(b)) = (points.first(), points.get(1)) {
                surface.stroke_rect(Bounds::from_corners(*a, *b), palette::DRAWING_STROKE, width);
            }
        }
        DrawingKind::Line => {
            if points.len() >= 2 {
                surface.stroke_polyline(&points[..2], false, palette::DRAWING_STROKE, width);
            }
        }
        DrawingKind::Point => {
            if let Some(center) = points.first() {
                surface.fill_circle(*center, stroke::POINT_RADIUS * metric, palette::DRAWING_STROKE);
            }
        }
        DrawingKind::Polygon => {
            if points.len() >= 2 {
                surface.stroke_polyline(&points, true, palette::DRAWING_STROKE, width);
            }
        }
    }

    points
}

fn draw_preview<T: Space>(surface: &mut dyn Surface, preview: &Preview, pass: &RenderPass<T>) {
    match preview {
        Preview::Shape { kind, points } => {
            draw_shape(surface, *kind, points, pass);
        }
        Preview::Polygon {
            vertices,
            cursor,
            snapping,
        } => {
            let metric = pass.drawings.metric();
            let width = stroke::WIDTH * metric;
            let mut path: Vec<Point> = vertices.iter().map(|v| pass.drawings.point(*v)).collect();
            if let Some(cursor) = cursor {
                path.push(pass.drawings.point(*cursor));
            }
            let Some(first) = path.first().copied() else {
                return;
            };
            if *snapping {
                path.push(first);
                surface.stroke_circle(
                    first,
                    stroke::SNAP_INDICATOR_RADIUS * metric,
                    palette::DRAWING_STROKE,
                    width,
                );
            }
            if path.len() >= 2 {
                surface.stroke_polyline(&path, false, palette::DRAWING_STROKE, width);
            }
        }
    }
}

// ============================================================================
// Label chips
// ============================================================================

/// Filled chip above `anchor` with white text, sized to the measured text.
/// `metric` scales font size, padding and chip height.
fn draw_chip(surface: &mut dyn Surface, text: &str, anchor: Point, metric: f32, fill: Rgba) {
    let font_size = label::FONT_SIZE * metric;
    let padding = label::CHIP_PADDING * metric;
    let height = label::CHIP_HEIGHT * metric;
    let width = surface.measure_text(text, font_size) + 2.0 * padding;

    surface.fill_rect(
        Bounds::from_corners(
            Point::new(anchor.x, anchor.y - height),
            Point::new(anchor.x + width, anchor.y),
        ),
        fill,
    );
    surface.fill_text(
        text,
        Point::new(anchor.x + padding, anchor.y - padding),
        font_size,
        palette::CHIP_TEXT,
    );
}

#[cfg(test)]
mod tests;
