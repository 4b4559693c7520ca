//! Transient pointer-interaction state.

use crate::constants::polygon::MIN_VERTICES;
use crate::geometry::Point;
use crate::model::{DrawingId, DrawingKind};
use crate::scaling::{CanvasSpace, Coords};

/// What the pointer is currently doing on the canvas.
///
/// Exactly one interaction is active at a time; finalizing, cancelling or
/// switching tools returns to [`Interaction::Idle`].
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Interaction {
    #[default]
    Idle,
    /// Rectangle or line drag from `start` to `current`
    Drawing {
        kind: DrawingKind,
        start: Point,
        current: Point,
    },
    /// Polygon vertices placed so far and the last pointer position
    Polygon {
        vertices: Vec<Point>,
        cursor: Option<Point>,
    },
    /// Reshape drag of one handle. `offset` is the grab point minus the handle
    /// position, preserved for the whole drag.
    DraggingVertex {
        drawing_id: DrawingId,
        vertex_index: usize,
        offset: Point,
    },
    /// Move drag of a whole drawing. `last` is the previous pointer position.
    Transforming { drawing_id: DrawingId, last: Point },
}

impl Interaction {
    pub fn is_idle(&self) -> bool {
        matches!(self, Interaction::Idle)
    }

    /// Label used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Interaction::Idle => "idle",
            Interaction::Drawing { .. } => "drawing",
            Interaction::Polygon { .. } => "polygon",
            Interaction::DraggingVertex { .. } => "dragging vertex",
            Interaction::Transforming { .. } => "transforming",
        }
    }
}

/// True when a click at `at` should close a polygon with these vertices.
pub fn closes_polygon(vertices: &[Point], at: Point, snap_threshold: f32) -> bool {
    vertices.len() >= MIN_VERTICES
        && vertices
            .first()
            .is_some_and(|first| first.distance_to(&at) < snap_threshold)
}

/// In-progress construction to draw on top of the committed shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum Preview {
    /// Rectangle or line being dragged, `[x1, y1, x2, y2]`
    Shape {
        kind: DrawingKind,
        points: Coords<CanvasSpace>,
    },
    /// Open polygon path with a rubber band to the cursor
    Polygon {
        vertices: Vec<Point>,
        cursor: Option<Point>,
        /// Cursor is close enough to the first vertex to close the polygon
        snapping: bool,
    },
}

impl Preview {
    pub(crate) fn of(interaction: &Interaction, snap_threshold: f32) -> Option<Preview> {
        match interaction {
            Interaction::Drawing {
                kind,
                start,
                current,
            } => Some(Preview::Shape {
                kind: *kind,
                points: Coords::from_points(&[*start, *current]),
            }),
            Interaction::Polygon { vertices, cursor } => Some(Preview::Polygon {
                vertices: vertices.clone(),
                cursor: *cursor,
                snapping: cursor.is_some_and(|c| closes_polygon(vertices, c, snap_threshold)),
            }),
            _ => None,
        }
    }
}
