//! User-authored shapes.

use serde::{Deserialize, Serialize};

use crate::geometry::{Bounds, Point};
use crate::labels::LabelSelection;
use crate::scaling::{CanvasSpace, Coords};

/// Unique identifier for a drawing.
pub type DrawingId = String;

/// Kind of a user-drawn shape. Determines the layout of [`Drawing::points`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawingKind {
    /// `[x1, y1, x2, y2]`, two opposite corners
    Rectangle,
    /// `[x1, y1, x2, y2]`, the two endpoints
    Line,
    /// `[x, y]`
    Point,
    /// `[x0, y0, x1, y1, ...]`, at least three vertices, implicitly closed
    Polygon,
}

impl DrawingKind {
    /// Get the display name for this kind.
    pub fn name(&self) -> &'static str {
        match self {
            DrawingKind::Rectangle => "Rectangle",
            DrawingKind::Line => "Line",
            DrawingKind::Point => "Point",
            DrawingKind::Polygon => "Polygon",
        }
    }

    /// Get all drawing kinds.
    pub fn all() -> &'static [DrawingKind] {
        &[
            DrawingKind::Rectangle,
            DrawingKind::Line,
            DrawingKind::Point,
            DrawingKind::Polygon,
        ]
    }
}

/// Offset accumulated by move-tool drags.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Translation {
    pub x: f32,
    pub y: f32,
}

/// A shape drawn by the user, stored in displayed-canvas pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Drawing {
    pub id: DrawingId,
    #[serde(rename = "type")]
    pub kind: DrawingKind,
    pub points: Coords<CanvasSpace>,
    /// Composed label, empty until the label step completes
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tooth_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pathology: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_pathology: Option<String>,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<Translation>,
}

fn default_visible() -> bool {
    true
}

impl Drawing {
    /// Create a visible, unlabeled drawing.
    pub fn new(id: impl Into<DrawingId>, kind: DrawingKind, points: Coords<CanvasSpace>) -> Self {
        Self {
            id: id.into(),
            kind,
            points,
            label: String::new(),
            tooth_number: None,
            pathology: None,
            custom_pathology: None,
            visible: true,
            translation: None,
        }
    }

    /// Reshape handles in index order.
    ///
    /// Rectangles expose four corners derived from the two stored points:
    /// 0 = (x1, y1), 1 = (x2, y1), 2 = (x2, y2), 3 = (x1, y2).
    /// Lines expose both endpoints, polygons every vertex. Points have none.
    pub fn handles(&self) -> Vec<Point> {
        let p = self.points.as_slice();
        match self.kind {
            DrawingKind::Rectangle => match p {
                [x1, y1, x2, y2, ..] => vec![
                    Point::new(*x1, *y1),
                    Point::new(*x2, *y1),
                    Point::new(*x2, *y2),
                    Point::new(*x1, *y2),
                ],
                _ => Vec::new(),
            },
            DrawingKind::Line => self.points.vertices().take(2).collect(),
            DrawingKind::Polygon => self.points.vertices().collect(),
            DrawingKind::Point => Vec::new(),
        }
    }

    /// Move reshape handle `index` to `target`.
    ///
    /// Rectangle corners update the x and y value they share with their
    /// neighbours so the box stays axis-aligned. Returns false if the handle
    /// does not exist.
    pub fn move_handle(&mut self, index: usize, target: Point) -> bool {
        match self.kind {
            DrawingKind::Rectangle => {
                let (xi, yi) = match index {
                    0 => (0, 1),
                    1 => (2, 1),
                    2 => (2, 3),
                    3 => (0, 3),
                    _ => return false,
                };
                if self.points.len() < 4 {
                    return false;
                }
                self.points.set_value(xi, target.x) && self.points.set_value(yi, target.y)
            }
            DrawingKind::Line if index < 2 => self.points.set_vertex(index, target),
            DrawingKind::Polygon => self.points.set_vertex(index, target),
            DrawingKind::Line | DrawingKind::Point => false,
        }
    }

    /// Shift every point by `(dx, dy)` and record the shift.
    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.points.translate(dx, dy);
        let offset = self.translation.get_or_insert_with(Translation::default);
        offset.x += dx;
        offset.y += dy;
    }

    /// Axis-aligned bounds of all stored points.
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::of_points(self.points.vertices())
    }

    /// Where the label chip is anchored: the first stored point.
    pub fn label_anchor(&self) -> Option<Point> {
        self.points.vertex(0)
    }

    /// Write a completed label selection onto this drawing.
    pub fn apply_label(&mut self, selection: &LabelSelection) {
        self.label = selection.compose();
        self.tooth_number = Some(selection.tooth_number.clone());
        self.pathology = Some(selection.pathology.clone());
        self.custom_pathology = selection.custom_pathology.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect() -> Drawing {
        Drawing::new(
            "r",
            DrawingKind::Rectangle,
            Coords::new(vec![10.0, 10.0, 110.0, 60.0]),
        )
    }

    #[test]
    fn test_rectangle_handles() {
        let handles = rect().handles();
        assert_eq!(
            handles,
            vec![
                Point::new(10.0, 10.0),
                Point::new(110.0, 10.0),
                Point::new(110.0, 60.0),
                Point::new(10.0, 60.0),
            ]
        );
    }

    #[test]
    fn test_rectangle_corner_drag_stays_axis_aligned() {
        let mut r = rect();
        assert!(r.move_handle(1, Point::new(120.0, 5.0)));
        assert_eq!(r.points.as_slice(), &[10.0, 5.0, 120.0, 60.0]);

        assert!(r.move_handle(3, Point::new(0.0, 70.0)));
        assert_eq!(r.points.as_slice(), &[0.0, 5.0, 120.0, 70.0]);

        assert!(!r.move_handle(4, Point::new(0.0, 0.0)));
    }

    #[test]
    fn test_polygon_handle_moves_single_vertex() {
        let mut poly = Drawing::new(
            "p",
            DrawingKind::Polygon,
            Coords::new(vec![0.0, 0.0, 50.0, 0.0, 50.0, 50.0]),
        );
        assert!(poly.move_handle(2, Point::new(40.0, 45.0)));
        assert_eq!(poly.points.as_slice(), &[0.0, 0.0, 50.0, 0.0, 40.0, 45.0]);
        assert!(!poly.move_handle(3, Point::new(1.0, 1.0)));
    }

    #[test]
    fn test_point_has_no_handles() {
        let mut point = Drawing::new("pt", DrawingKind::Point, Coords::new(vec![1.0, 2.0]));
        assert!(point.handles().is_empty());
        assert!(!point.move_handle(0, Point::new(5.0, 5.0)));
    }

    #[test]
    fn test_translate_accumulates_offset() {
        let mut r = rect();
        r.translate(5.0, -3.0);
        r.translate(1.0, 1.0);
        assert_eq!(r.points.as_slice(), &[16.0, 8.0, 116.0, 58.0]);
        assert_eq!(r.translation, Some(Translation { x: 6.0, y: -2.0 }));
    }

    #[test]
    fn test_serde_uses_original_field_names() {
        let json = r#"{"id":"drawing-1","type":"line","points":[0,0,5,5],"label":"","visible":false}"#;
        let drawing: Drawing = serde_json::from_str(json).unwrap();
        assert_eq!(drawing.kind, DrawingKind::Line);
        assert!(!drawing.visible);

        let out = serde_json::to_string(&drawing).unwrap();
        assert!(out.contains("\"type\":\"line\""));
        assert!(!out.contains("toothNumber"));
    }
}
