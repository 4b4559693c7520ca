//! Coordinate spaces and the conversions between them.
//!
//! Detections arrive in the pixel space of the original radiograph, while
//! user drawings are captured in the pixel space of the displayed (resized)
//! canvas. Both collections carry their space in the type, and every
//! conversion goes through [`Scale`], so the on-screen render and the
//! full-resolution export share one computation.

use std::fmt;
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Marker trait for a coordinate space.
pub trait Space: Copy + Default + fmt::Debug + PartialEq + 'static {
    /// Human-readable name used in logs.
    const NAME: &'static str;
}

/// Pixels of the original (uploaded) image. Export renders in this space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImageSpace;

/// Pixels of the displayed canvas overlaying the resized image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CanvasSpace;

impl Space for ImageSpace {
    const NAME: &'static str = "image";
}

impl Space for CanvasSpace {
    const NAME: &'static str = "canvas";
}

/// Width and height of an image or surface in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// True when either dimension is zero, negative or not finite.
    pub fn is_empty(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
    }

    /// Pixel dimensions rounded to the nearest integer, for allocating surfaces.
    pub fn to_pixels(&self) -> (u32, u32) {
        (
            self.width.round().max(0.0) as u32,
            self.height.round().max(0.0) as u32,
        )
    }

    /// True if either axis differs from `other` by more than `threshold`.
    pub fn differs_from(&self, other: &Size, threshold: f32) -> bool {
        (self.width - other.width).abs() > threshold
            || (self.height - other.height).abs() > threshold
    }
}

impl From<(u32, u32)> for Size {
    fn from((width, height): (u32, u32)) -> Self {
        Self::new(width as f32, height as f32)
    }
}

// ============================================================================
// Coordinate collections
// ============================================================================

/// A flattened `[x0, y0, x1, y1, ...]` coordinate list tagged with its space.
#[derive(Serialize, Deserialize)]
#[serde(transparent, bound = "")]
pub struct Coords<S: Space> {
    values: Vec<f32>,
    #[serde(skip)]
    space: PhantomData<S>,
}

impl<S: Space> Coords<S> {
    pub fn new(values: Vec<f32>) -> Self {
        Self {
            values,
            space: PhantomData,
        }
    }

    /// Build from a list of vertices.
    pub fn from_points(points: &[Point]) -> Self {
        Self::new(points.iter().flat_map(|p| [p.x, p.y]).collect())
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    /// Number of raw values (twice the vertex count).
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of complete `(x, y)` pairs.
    pub fn vertex_count(&self) -> usize {
        self.values.len() / 2
    }

    pub fn vertex(&self, index: usize) -> Option<Point> {
        let x = *self.values.get(index * 2)?;
        let y = *self.values.get(index * 2 + 1)?;
        Some(Point::new(x, y))
    }

    pub fn vertices(&self) -> impl Iterator<Item = Point> + '_ {
        self.values
            .chunks_exact(2)
            .map(|pair| Point::new(pair[0], pair[1]))
    }

    /// Overwrite the coordinate pair at `index`. Returns false if out of range.
    pub fn set_vertex(&mut self, index: usize, point: Point) -> bool {
        if index >= self.vertex_count() {
            return false;
        }
        self.values[index * 2] = point.x;
        self.values[index * 2 + 1] = point.y;
        true
    }

    /// Overwrite a single raw value. Returns false if out of range.
    pub fn set_value(&mut self, index: usize, value: f32) -> bool {
        match self.values.get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Shift every vertex by `(dx, dy)`.
    pub fn translate(&mut self, dx: f32, dy: f32) {
        for (i, value) in self.values.iter_mut().enumerate() {
            if i % 2 == 0 {
                *value += dx;
            } else {
                *value += dy;
            }
        }
    }
}

impl<S: Space> Clone for Coords<S> {
    fn clone(&self) -> Self {
        Self::new(self.values.clone())
    }
}

impl<S: Space> Default for Coords<S> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<S: Space> PartialEq for Coords<S> {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

impl<S: Space> fmt::Debug for Coords<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Coords<{}>{:?}", S::NAME, self.values)
    }
}

// ============================================================================
// Scale factors
// ============================================================================

/// Per-axis scale factor mapping coordinates from space `F` into space `T`.
pub struct Scale<F: Space, T: Space> {
    pub x: f32,
    pub y: f32,
    spaces: PhantomData<(F, T)>,
}

impl<F: Space, T: Space> Scale<F, T> {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            spaces: PhantomData,
        }
    }

    pub fn identity() -> Self {
        Self::new(1.0, 1.0)
    }

    /// Scale that maps a surface of size `from` onto a surface of size `to`.
    /// Returns None if `from` has no area.
    pub fn between(from: Size, to: Size) -> Option<Self> {
        if from.is_empty() || to.is_empty() {
            return None;
        }
        Some(Self::new(to.width / from.width, to.height / from.height))
    }

    /// The reverse mapping, `T` back into `F`.
    pub fn inverse(&self) -> Scale<T, F> {
        Scale::new(1.0 / self.x, 1.0 / self.y)
    }

    pub fn point(&self, point: Point) -> Point {
        Point::new(point.x * self.x, point.y * self.y)
    }

    pub fn coords(&self, coords: &Coords<F>) -> Coords<T> {
        Coords::new(
            coords
                .as_slice()
                .iter()
                .enumerate()
                .map(|(i, v)| if i % 2 == 0 { v * self.x } else { v * self.y })
                .collect(),
        )
    }

    /// Scale the vertices of `coords` straight into a point list.
    pub fn points(&self, coords: &Coords<F>) -> Vec<Point> {
        coords.vertices().map(|p| self.point(p)).collect()
    }

    /// Factor for lengths that are not tied to an axis (stroke width, font size).
    pub fn metric(&self) -> f32 {
        self.x
    }
}

impl<F: Space, T: Space> Clone for Scale<F, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<F: Space, T: Space> Copy for Scale<F, T> {}

impl<F: Space, T: Space> PartialEq for Scale<F, T> {
    fn eq(&self, other: &Self) -> bool {
        self.x == other.x && self.y == other.y
    }
}

impl<F: Space, T: Space> fmt::Debug for Scale<F, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Scale<{} -> {}>({:.4}, {:.4})",
            F::NAME,
            T::NAME,
            self.x,
            self.y
        )
    }
}

/// Scale used to place detections (original pixels) on the displayed canvas.
pub fn display_scale(original: Size, displayed: Size) -> Option<Scale<ImageSpace, CanvasSpace>> {
    Scale::between(original, displayed)
}

/// Scale used to place drawings (canvas pixels) on the full-resolution export.
pub fn export_scale(original: Size, displayed: Size) -> Option<Scale<CanvasSpace, ImageSpace>> {
    display_scale(original, displayed).map(|s| s.inverse())
}
