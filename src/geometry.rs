//! Pure geometry helpers used for hit-testing and snapping.
//!
//! All functions work in displayed-canvas pixels and keep no state.
//! Both searches are first-match-wins in drawing creation order: the first
//! candidate inside the tolerance is returned, even if a later one is closer.

use serde::{Deserialize, Serialize};

use crate::model::{Drawing, DrawingId, DrawingKind};

/// A 2D point.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Calculate distance to another point.
    pub fn distance_to(&self, other: &Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Component-wise difference `self - other`.
    pub fn offset_from(&self, other: &Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }
}

/// Axis-aligned bounds, always normalized so that `min <= max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Point,
    pub max: Point,
}

impl Bounds {
    /// Bounds spanned by two opposite corners, in any order.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            min: Point::new(a.x.min(b.x), a.y.min(b.y)),
            max: Point::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// Bounds of a vertex list. None if empty.
    pub fn of_points(points: impl IntoIterator<Item = Point>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        Some(iter.fold(Self::from_corners(first, first), |b, p| Self {
            min: Point::new(b.min.x.min(p.x), b.min.y.min(p.y)),
            max: Point::new(b.max.x.max(p.x), b.max.y.max(p.y)),
        }))
    }

    /// Inclusive containment test.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.min.x && x <= self.max.x && y >= self.min.y && y <= self.max.y
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }
}

/// Distance from `(px, py)` to the segment `a`-`b`.
///
/// The projection parameter is clamped to `[0, 1]`, so points beyond either
/// end measure to the nearest endpoint. A zero-length segment measures to `a`.
pub fn distance_point_to_segment(px: f32, py: f32, ax: f32, ay: f32, bx: f32, by: f32) -> f32 {
    let cx = bx - ax;
    let cy = by - ay;
    let len_sq = cx * cx + cy * cy;

    let t = if len_sq > 0.0 {
        (((px - ax) * cx + (py - ay) * cy) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let dx = px - (ax + t * cx);
    let dy = py - (ay + t * cy);
    (dx * dx + dy * dy).sqrt()
}

/// Even-odd ray casting over a flattened `[x0, y0, x1, y1, ...]` vertex list.
/// The last vertex connects back to the first.
pub fn is_point_in_polygon(px: f32, py: f32, flat_points: &[f32]) -> bool {
    let n = flat_points.len() / 2;
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = (flat_points[i * 2], flat_points[i * 2 + 1]);
        let (xj, yj) = (flat_points[j * 2], flat_points[j * 2 + 1]);

        if ((yi > py) != (yj > py)) && (px < (xj - xi) * (py - yi) / (yj - yi) + xi) {
            inside = !inside;
        }
        j = i;
    }

    inside
}

/// A reshape handle found under the pointer.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexHit {
    /// Drawing owning the vertex
    pub drawing_id: DrawingId,
    /// Index into the drawing's handle list (see [`Drawing::handles`])
    pub vertex_index: usize,
    /// Vertex position at the time of the hit
    pub original_x: f32,
    pub original_y: f32,
}

/// First reshape handle within `threshold` of `(x, y)`.
///
/// Hidden drawings and point markers are skipped.
pub fn find_nearest_vertex(x: f32, y: f32, drawings: &[Drawing], threshold: f32) -> Option<VertexHit> {
    let cursor = Point::new(x, y);

    drawings
        .iter()
        .filter(|d| d.visible)
        .find_map(|drawing| {
            drawing
                .handles()
                .into_iter()
                .enumerate()
                .find(|(_, handle)| handle.distance_to(&cursor) < threshold)
                .map(|(vertex_index, handle)| VertexHit {
                    drawing_id: drawing.id.clone(),
                    vertex_index,
                    original_x: handle.x,
                    original_y: handle.y,
                })
        })
}

/// Check whether `(x, y)` lands on a drawing for the purposes of the move tool.
///
/// Rectangles test their bounds, polygons their interior, lines and points
/// test distance against `tolerance`.
pub fn drawing_contains(drawing: &Drawing, x: f32, y: f32, tolerance: f32) -> bool {
    let points = drawing.points.as_slice();
    match drawing.kind {
        DrawingKind::Rectangle => match (drawing.points.vertex(0), drawing.points.vertex(1)) {
            (Some(a), Some(b)) => Bounds::from_corners(a, b).contains(x, y),
            _ => false,
        },
        DrawingKind::Line => match points {
            [x1, y1, x2, y2, ..] => distance_point_to_segment(x, y, *x1, *y1, *x2, *y2) < tolerance,
            _ => false,
        },
        DrawingKind::Polygon => is_point_in_polygon(x, y, points),
        DrawingKind::Point => drawing
            .points
            .vertex(0)
            .is_some_and(|p| p.distance_to(&Point::new(x, y)) < tolerance),
    }
}

/// First visible drawing under `(x, y)`, in creation order.
pub fn find_shape_at_point<'a>(
    x: f32,
    y: f32,
    drawings: &'a [Drawing],
    tolerance: f32,
) -> Option<&'a DrawingId> {
    drawings
        .iter()
        .filter(|d| d.visible)
        .find(|d| drawing_contains(d, x, y, tolerance))
        .map(|d| &d.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scaling::Coords;

    const EPSILON: f32 = 0.0001;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    fn drawing(id: &str, kind: DrawingKind, points: Vec<f32>) -> Drawing {
        Drawing::new(id, kind, Coords::new(points))
    }

    #[test]
    fn test_distance_perpendicular() {
        assert!(approx_eq(distance_point_to_segment(5.0, 5.0, 0.0, 0.0, 10.0, 0.0), 5.0));
    }

    #[test]
    fn test_distance_clamped_to_endpoint() {
        assert!(approx_eq(distance_point_to_segment(-5.0, 0.0, 0.0, 0.0, 10.0, 0.0), 5.0));
        assert!(approx_eq(distance_point_to_segment(13.0, 4.0, 0.0, 0.0, 10.0, 0.0), 5.0));
    }

    #[test]
    fn test_distance_degenerate_segment() {
        assert!(approx_eq(distance_point_to_segment(3.0, 4.0, 0.0, 0.0, 0.0, 0.0), 5.0));
    }

    #[test]
    fn test_point_in_polygon() {
        let square = [0.0, 0.0, 100.0, 0.0, 100.0, 100.0, 0.0, 100.0];
        assert!(is_point_in_polygon(50.0, 50.0, &square));
        assert!(!is_point_in_polygon(150.0, 50.0, &square));
        assert!(!is_point_in_polygon(50.0, 50.0, &[0.0, 0.0, 10.0, 10.0]));
    }

    #[test]
    fn test_point_in_concave_polygon() {
        // U shape opening upwards
        let u = [
            0.0, 0.0, 10.0, 0.0, 10.0, 20.0, 20.0, 20.0, 20.0, 0.0, 30.0, 0.0, 30.0, 30.0, 0.0, 30.0,
        ];
        assert!(is_point_in_polygon(5.0, 10.0, &u));
        assert!(!is_point_in_polygon(15.0, 10.0, &u));
        assert!(is_point_in_polygon(15.0, 25.0, &u));
    }

    #[test]
    fn test_find_shape_rectangle() {
        let drawings = vec![drawing("r", DrawingKind::Rectangle, vec![10.0, 10.0, 110.0, 60.0])];
        assert_eq!(
            find_shape_at_point(50.0, 30.0, &drawings, 10.0).map(String::as_str),
            Some("r")
        );
        assert_eq!(find_shape_at_point(200.0, 200.0, &drawings, 10.0), None);
    }

    #[test]
    fn test_find_shape_rectangle_drawn_backwards() {
        let drawings = vec![drawing("r", DrawingKind::Rectangle, vec![110.0, 60.0, 10.0, 10.0])];
        assert!(find_shape_at_point(50.0, 30.0, &drawings, 10.0).is_some());
    }

    #[test]
    fn test_find_shape_line_and_point() {
        let drawings = vec![
            drawing("l", DrawingKind::Line, vec![0.0, 0.0, 100.0, 0.0]),
            drawing("p", DrawingKind::Point, vec![200.0, 200.0]),
        ];
        assert_eq!(
            find_shape_at_point(50.0, 9.0, &drawings, 10.0).map(String::as_str),
            Some("l")
        );
        assert_eq!(find_shape_at_point(50.0, 11.0, &drawings, 10.0), None);
        assert_eq!(
            find_shape_at_point(205.0, 205.0, &drawings, 10.0).map(String::as_str),
            Some("p")
        );
    }

    #[test]
    fn test_find_shape_skips_hidden_and_first_match_wins() {
        let mut hidden = drawing("hidden", DrawingKind::Rectangle, vec![0.0, 0.0, 100.0, 100.0]);
        hidden.visible = false;
        let drawings = vec![
            hidden,
            drawing("outer", DrawingKind::Rectangle, vec![0.0, 0.0, 100.0, 100.0]),
            drawing("inner", DrawingKind::Rectangle, vec![40.0, 40.0, 60.0, 60.0]),
        ];
        assert_eq!(
            find_shape_at_point(50.0, 50.0, &drawings, 10.0).map(String::as_str),
            Some("outer")
        );
    }

    #[test]
    fn test_find_nearest_vertex_rectangle_corners() {
        let drawings = vec![drawing("r", DrawingKind::Rectangle, vec![10.0, 10.0, 110.0, 60.0])];

        let hit = find_nearest_vertex(108.0, 12.0, &drawings, 10.0).unwrap();
        assert_eq!(hit.drawing_id, "r");
        assert_eq!(hit.vertex_index, 1);
        assert_eq!((hit.original_x, hit.original_y), (110.0, 10.0));

        let hit = find_nearest_vertex(12.0, 58.0, &drawings, 10.0).unwrap();
        assert_eq!(hit.vertex_index, 3);

        assert!(find_nearest_vertex(60.0, 35.0, &drawings, 10.0).is_none());
    }

    #[test]
    fn test_find_nearest_vertex_first_match_not_nearest() {
        let drawings = vec![
            drawing("a", DrawingKind::Line, vec![0.0, 0.0, 50.0, 50.0]),
            drawing("b", DrawingKind::Line, vec![3.0, 0.0, 80.0, 80.0]),
        ];
        // (3, 0) is closer to b's start, but a comes first and is within range
        let hit = find_nearest_vertex(3.0, 0.0, &drawings, 10.0).unwrap();
        assert_eq!(hit.drawing_id, "a");
    }

    #[test]
    fn test_points_are_not_reshapeable() {
        let drawings = vec![drawing("p", DrawingKind::Point, vec![5.0, 5.0])];
        assert!(find_nearest_vertex(5.0, 5.0, &drawings, 10.0).is_none());
    }

    #[test]
    fn test_bounds_of_points() {
        let b = Bounds::of_points([Point::new(5.0, 1.0), Point::new(-2.0, 8.0), Point::new(3.0, 3.0)])
            .unwrap();
        assert_eq!(b.min, Point::new(-2.0, 1.0));
        assert_eq!(b.max, Point::new(5.0, 8.0));
        assert!(Bounds::of_points(std::iter::empty()).is_none());
    }
}
