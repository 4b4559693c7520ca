//! CPU raster surface backed by tiny-skia, used for export and headless
//! rendering. Text is rasterized with ab_glyph.

use std::path::Path;

use ab_glyph::{Font, FontArc, PxScale, ScaleFont, point};
use image::{DynamicImage, RgbaImage};
use tiny_skia::{
    Color, ColorU8, FillRule, Paint, PathBuilder, Pixmap, PremultipliedColorU8, Rect, Stroke,
    Transform,
};

use super::{RenderError, Rgba, Shadow, Surface};
use crate::geometry::{Bounds, Point};
use crate::scaling::Size;

/// Average glyph advance as a fraction of the font size, used when no font
/// could be loaded.
const FALLBACK_ADVANCE: f32 = 0.5;

/// Fonts tried in order when no font path is configured.
const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Helvetica.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Load a font from `path`, or None if it is missing or unreadable.
pub fn load_font(path: &Path) -> Option<FontArc> {
    let bytes = std::fs::read(path).ok()?;
    match FontArc::try_from_vec(bytes) {
        Ok(font) => Some(font),
        Err(e) => {
            log::warn!("⚠️ Invalid font {:?}: {}", path, e);
            None
        }
    }
}

/// First usable font from the well-known system locations.
pub fn load_system_font() -> Option<FontArc> {
    let font = SYSTEM_FONTS
        .iter()
        .find_map(|candidate| load_font(Path::new(candidate)));
    if font.is_none() {
        log::warn!("⚠️ No system font found, label text will be omitted");
    }
    font
}

fn paint_for(color: Rgba) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, color.alpha_u8());
    paint.anti_alias = true;
    paint
}

fn rect_of(bounds: Bounds) -> Option<Rect> {
    Rect::from_ltrb(bounds.min.x, bounds.min.y, bounds.max.x, bounds.max.y)
}

/// Raster surface with an optional font for label text.
pub struct SkiaSurface {
    pixmap: Pixmap,
    font: Option<FontArc>,
}

impl std::fmt::Debug for SkiaSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SkiaSurface")
            .field("width", &self.pixmap.width())
            .field("height", &self.pixmap.height())
            .field("font", &self.font.is_some())
            .finish()
    }
}

impl SkiaSurface {
    /// Transparent surface of the given pixel size.
    pub fn new(width: u32, height: u32) -> Result<Self, RenderError> {
        let pixmap = Pixmap::new(width, height).ok_or(RenderError::Allocation { width, height })?;
        Ok(Self { pixmap, font: None })
    }

    /// Surface holding a copy of `image` at its native size.
    pub fn from_image(image: &DynamicImage) -> Result<Self, RenderError> {
        let rgba = image.to_rgba8();
        let mut surface = Self::new(rgba.width(), rgba.height())?;
        for (dst, src) in surface.pixmap.pixels_mut().iter_mut().zip(rgba.pixels()) {
            let [r, g, b, a] = src.0;
            *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
        }
        Ok(surface)
    }

    pub fn with_font(mut self, font: Option<FontArc>) -> Self {
        self.font = font;
        self
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Copy the pixels out as a straight-alpha RGBA image.
    pub fn to_image(&self) -> RgbaImage {
        let mut out = RgbaImage::new(self.pixmap.width(), self.pixmap.height());
        for (dst, src) in out.pixels_mut().zip(self.pixmap.pixels()) {
            let c = src.demultiply();
            dst.0 = [c.red(), c.green(), c.blue(), c.alpha()];
        }
        out
    }

    fn polygon_path(points: &[Point], offset: Point, closed: bool) -> Option<tiny_skia::Path> {
        let (first, rest) = points.split_first()?;
        let mut pb = PathBuilder::new();
        pb.move_to(first.x + offset.x, first.y + offset.y);
        for p in rest {
            pb.line_to(p.x + offset.x, p.y + offset.y);
        }
        if closed {
            pb.close();
        }
        pb.finish()
    }

    /// Source-over blend of `color` at `coverage` into one pixel.
    fn blend_pixel(&mut self, x: i32, y: i32, color: Rgba, coverage: f32) {
        let (width, height) = (self.pixmap.width() as i32, self.pixmap.height() as i32);
        if x < 0 || y < 0 || x >= width || y >= height {
            return;
        }
        let index = (y * width + x) as usize;
        let Some(dst) = self.pixmap.pixels_mut().get_mut(index) else {
            return;
        };

        let sa = (color.a * coverage).clamp(0.0, 1.0);
        let inv = 1.0 - sa;
        let channel = |src: u8, dst: u8| (src as f32 * sa + dst as f32 * inv).round() as u8;

        let a = (sa * 255.0 + dst.alpha() as f32 * inv).round() as u8;
        let r = channel(color.r, dst.red()).min(a);
        let g = channel(color.g, dst.green()).min(a);
        let b = channel(color.b, dst.blue()).min(a);
        if let Some(blended) = PremultipliedColorU8::from_rgba(r, g, b, a) {
            *dst = blended;
        }
    }
}

impl Surface for SkiaSurface {
    fn resize(&mut self, size: Size) -> Result<(), RenderError> {
        let (width, height) = size.to_pixels();
        if width == self.pixmap.width() && height == self.pixmap.height() {
            return Ok(());
        }
        self.pixmap = Pixmap::new(width, height).ok_or(RenderError::Allocation { width, height })?;
        Ok(())
    }

    fn size(&self) -> Size {
        Size::from((self.pixmap.width(), self.pixmap.height()))
    }

    fn clear(&mut self) {
        self.pixmap.fill(Color::TRANSPARENT);
    }

    fn stroke_polyline(&mut self, points: &[Point], closed: bool, color: Rgba, width: f32) {
        let Some(path) = Self::polygon_path(points, Point::default(), closed) else {
            return;
        };
        let stroke = Stroke {
            width,
            ..Default::default()
        };
        self.pixmap
            .stroke_path(&path, &paint_for(color), &stroke, Transform::identity(), None);
    }

    fn stroke_rect(&mut self, bounds: Bounds, color: Rgba, width: f32) {
        let corners = [
            bounds.min,
            Point::new(bounds.max.x, bounds.min.y),
            bounds.max,
            Point::new(bounds.min.x, bounds.max.y),
        ];
        self.stroke_polyline(&corners, true, color, width);
    }

    fn fill_rect(&mut self, bounds: Bounds, color: Rgba) {
        if let Some(rect) = rect_of(bounds) {
            self.pixmap
                .fill_rect(rect, &paint_for(color), Transform::identity(), None);
        }
    }

    fn fill_polygon(&mut self, points: &[Point], color: Rgba, shadow: Option<Shadow>) {
        // No blur support; the shadow is a plain offset fill
        let shadow_path = shadow.and_then(|s| Some((s, Self::polygon_path(points, s.offset, true)?)));
        if let Some((shadow, path)) = shadow_path {
            self.pixmap.fill_path(
                &path,
                &paint_for(shadow.color),
                FillRule::Winding,
                Transform::identity(),
                None,
            );
        }
        if let Some(path) = Self::polygon_path(points, Point::default(), true) {
            self.pixmap
                .fill_path(&path, &paint_for(color), FillRule::Winding, Transform::identity(), None);
        }
    }

    fn fill_circle(&mut self, center: Point, radius: f32, color: Rgba) {
        if let Some(path) = PathBuilder::from_circle(center.x, center.y, radius) {
            self.pixmap
                .fill_path(&path, &paint_for(color), FillRule::Winding, Transform::identity(), None);
        }
    }

    fn stroke_circle(&mut self, center: Point, radius: f32, color: Rgba, width: f32) {
        if let Some(path) = PathBuilder::from_circle(center.x, center.y, radius) {
            let stroke = Stroke {
                width,
                ..Default::default()
            };
            self.pixmap
                .stroke_path(&path, &paint_for(color), &stroke, Transform::identity(), None);
        }
    }

    fn measure_text(&self, text: &str, font_size: f32) -> f32 {
        match &self.font {
            Some(font) => {
                let scaled = font.as_scaled(PxScale::from(font_size));
                text.chars().map(|c| scaled.h_advance(scaled.glyph_id(c))).sum()
            }
            None => text.chars().count() as f32 * font_size * FALLBACK_ADVANCE,
        }
    }

    fn fill_text(&mut self, text: &str, origin: Point, font_size: f32, color: Rgba) {
        let Some(font) = self.font.clone() else {
            return;
        };
        let scale = PxScale::from(font_size);
        let scaled = font.as_scaled(scale);

        let mut caret = origin.x;
        for c in text.chars() {
            let id = scaled.glyph_id(c);
            let glyph = id.with_scale_and_position(scale, point(caret, origin.y));
            caret += scaled.h_advance(id);

            let Some(outlined) = font.outline_glyph(glyph) else {
                continue;
            };
            let bounds = outlined.px_bounds();
            let (left, top) = (bounds.min.x as i32, bounds.min.y as i32);
            outlined.draw(|gx, gy, coverage| {
                self.blend_pixel(left + gx as i32, top + gy as i32, color, coverage);
            });
        }
    }
}
