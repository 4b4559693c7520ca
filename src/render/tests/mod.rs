//! Tests for the render pipeline, driven through a surface that records
//! every call.

use super::*;
use crate::editor::Preview;
use crate::scaling::Coords;

const EPSILON: f32 = 0.0001;

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

#[derive(Debug, Clone, PartialEq)]
enum Op {
    Resize(Size),
    Clear,
    Polyline { points: Vec<Point>, closed: bool, color: Rgba, width: f32 },
    StrokeRect { bounds: Bounds, color: Rgba, width: f32 },
    FillRect { bounds: Bounds, color: Rgba },
    FillPolygon { points: Vec<Point>, color: Rgba, shadow: Option<Shadow> },
    FillCircle { center: Point, radius: f32 },
    StrokeCircle { center: Point, radius: f32 },
    Text { text: String, origin: Point, font_size: f32 },
}

#[derive(Default)]
struct RecordingSurface {
    size: Size,
    ops: Vec<Op>,
}

impl RecordingSurface {
    fn sized(width: f32, height: f32) -> Self {
        Self {
            size: Size::new(width, height),
            ops: Vec::new(),
        }
    }

    fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Surface for RecordingSurface {
    fn resize(&mut self, size: Size) -> Result<(), RenderError> {
        self.size = size;
        self.ops.push(Op::Resize(size));
        Ok(())
    }

    fn size(&self) -> Size {
        self.size
    }

    fn clear(&mut self) {
        self.ops.push(Op::Clear);
    }

    fn stroke_polyline(&mut self, points: &[Point], closed: bool, color: Rgba, width: f32) {
        self.ops.push(Op::Polyline {
            points: points.to_vec(),
            closed,
            color,
            width,
        });
    }

    fn stroke_rect(&mut self, bounds: Bounds, color: Rgba, width: f32) {
        self.ops.push(Op::StrokeRect { bounds, color, width });
    }

    fn fill_rect(&mut self, bounds: Bounds, color: Rgba) {
        self.ops.push(Op::FillRect { bounds, color });
    }

    fn fill_polygon(&mut self, points: &[Point], color: Rgba, shadow: Option<Shadow>) {
        self.ops.push(Op::FillPolygon {
            points: points.to_vec(),
            color,
            shadow,
        });
    }

    fn fill_circle(&mut self, center: Point, radius: f32, _color: Rgba) {
        self.ops.push(Op::FillCircle { center, radius });
    }

    fn stroke_circle(&mut self, center: Point, radius: f32, _color: Rgba, _width: f32) {
        self.ops.push(Op::StrokeCircle { center, radius });
    }

    fn measure_text(&self, text: &str, font_size: f32) -> f32 {
        text.chars().count() as f32 * font_size * 0.5
    }

    fn fill_text(&mut self, text: &str, origin: Point, font_size: f32, _color: Rgba) {
        self.ops.push(Op::Text {
            text: text.to_string(),
            origin,
            font_size,
        });
    }
}

fn region(id: &str, label: &str, bbox: Vec<f32>, polygon: Option<Vec<f32>>) -> Region {
    Region {
        id: id.to_string(),
        label: label.to_string(),
        bbox: Coords::new(bbox),
        polygon: polygon.map(Coords::new),
        visible: true,
    }
}

fn caries() -> Detection {
    let mut detection = Detection::new("Caries");
    detection.regions.push(region(
        "Caries-0",
        "1",
        vec![100.0, 100.0, 300.0, 200.0],
        Some(vec![100.0, 100.0, 300.0, 100.0, 300.0, 200.0]),
    ));
    detection
}

fn labeled_rectangle() -> Drawing {
    let mut drawing = Drawing::new(
        "drawing-1",
        DrawingKind::Rectangle,
        Coords::new(vec![10.0, 30.0, 50.0, 60.0]),
    );
    drawing.label = "11  Caries".to_string();
    drawing
}

fn scene<'a>(
    detections: &'a [Detection],
    drawings: &'a [Drawing],
    mode: InferenceMode,
) -> Scene<'a> {
    Scene {
        detections,
        drawings,
        preview: None,
        annotations_enabled: true,
        mode,
    }
}

const ORIGINAL: Size = Size {
    width: 1000.0,
    height: 800.0,
};
const DISPLAYED: Size = Size {
    width: 500.0,
    height: 400.0,
};

#[test]
fn test_display_scales_detection_boxes() {
    let detections = vec![caries()];
    let mut surface = RecordingSurface::default();
    render_display(
        &mut surface,
        &scene(&detections, &[], InferenceMode::QualityCheck),
        ORIGINAL,
        DISPLAYED,
    )
    .unwrap();

    assert_eq!(surface.ops[0], Op::Resize(DISPLAYED));
    assert_eq!(surface.ops[1], Op::Clear);
    assert_eq!(
        surface.ops[2],
        Op::StrokeRect {
            bounds: Bounds::from_corners(Point::new(50.0, 50.0), Point::new(150.0, 100.0)),
            color: palette::DETECTION_STROKE,
            width: 2.0,
        }
    );

    // Chip: 20 tall above the box, 8 chars * 7px + 10 wide
    assert_eq!(
        surface.ops[3],
        Op::FillRect {
            bounds: Bounds::from_corners(Point::new(50.0, 30.0), Point::new(116.0, 50.0)),
            color: palette::DETECTION_CHIP,
        }
    );
    assert_eq!(
        surface.ops[4],
        Op::Text {
            text: "1 Caries".to_string(),
            origin: Point::new(55.0, 45.0),
            font_size: 14.0,
        }
    );
}

#[test]
fn test_pathology_mode_fills_polygons_with_shadow() {
    let mut filling = Detection::new("Filling");
    filling.regions.push(region(
        "Filling-1",
        "2",
        vec![0.0, 0.0, 10.0, 10.0],
        Some(vec![0.0, 0.0, 10.0, 0.0, 10.0, 10.0]),
    ));
    let detections = vec![caries(), filling];
    let mut surface = RecordingSurface::default();
    render_display(
        &mut surface,
        &scene(&detections, &[], InferenceMode::PathologyCheck),
        ORIGINAL,
        DISPLAYED,
    )
    .unwrap();

    let fills: Vec<_> = surface
        .ops
        .iter()
        .filter_map(|op| match op {
            Op::FillPolygon { points, color, shadow } => Some((points.clone(), *color, *shadow)),
            _ => None,
        })
        .collect();
    assert_eq!(fills.len(), 2);

    let (points, color, shadow) = &fills[0];
    assert_eq!(points[0], Point::new(50.0, 50.0));
    assert_eq!(*color, class_color("Caries"));
    assert_eq!(shadow.unwrap().offset, Point::new(2.0, 2.0));

    let (_, color, shadow) = &fills[1];
    assert_eq!(*color, class_color("Filling"));
    assert_eq!(shadow.unwrap().offset, Point::new(4.0, 4.0));

    assert!(!surface.ops.iter().any(|op| matches!(op, Op::StrokeRect { .. })));
    assert_eq!(surface.texts(), vec!["1 Caries", "2 Filling"]);
}

#[test]
fn test_quality_mode_ignores_polygons() {
    let detections = vec![caries()];
    let mut surface = RecordingSurface::default();
    render_display(
        &mut surface,
        &scene(&detections, &[], InferenceMode::QualityCheck),
        ORIGINAL,
        DISPLAYED,
    )
    .unwrap();
    assert!(!surface.ops.iter().any(|op| matches!(op, Op::FillPolygon { .. })));
}

#[test]
fn test_disabled_annotations_only_clear() {
    let detections = vec![caries()];
    let drawings = vec![labeled_rectangle()];
    let mut frame = scene(&detections, &drawings, InferenceMode::PathologyCheck);
    frame.annotations_enabled = false;

    let mut surface = RecordingSurface::default();
    render_display(&mut surface, &frame, ORIGINAL, DISPLAYED).unwrap();
    assert_eq!(surface.ops, vec![Op::Resize(DISPLAYED), Op::Clear]);
}

#[test]
fn test_hidden_items_are_skipped() {
    let mut detection = caries();
    detection.regions[0].visible = false;
    let mut drawing = labeled_rectangle();
    drawing.visible = false;

    let mut surface = RecordingSurface::default();
    render_display(
        &mut surface,
        &scene(&[detection], &[drawing], InferenceMode::PathologyCheck),
        ORIGINAL,
        DISPLAYED,
    )
    .unwrap();
    assert_eq!(surface.ops.len(), 2);
}

#[test]
fn test_draw_order_detections_drawings_preview() {
    let detections = vec![caries()];
    let drawings = vec![labeled_rectangle()];
    let mut frame = scene(&detections, &drawings, InferenceMode::QualityCheck);
    frame.preview = Some(Preview::Shape {
        kind: DrawingKind::Line,
        points: Coords::new(vec![0.0, 0.0, 5.0, 5.0]),
    });

    let mut surface = RecordingSurface::default();
    render_display(&mut surface, &frame, ORIGINAL, DISPLAYED).unwrap();

    assert_eq!(surface.texts(), vec!["1 Caries", "11  Caries"]);
    assert!(matches!(
        surface.ops.last(),
        Some(Op::Polyline { closed: false, .. })
    ));
}

#[test]
fn test_drawings_are_not_rescaled_on_display() {
    let drawings = vec![labeled_rectangle()];
    let mut surface = RecordingSurface::default();
    render_display(
        &mut surface,
        &scene(&[], &drawings, InferenceMode::QualityCheck),
        ORIGINAL,
        DISPLAYED,
    )
    .unwrap();

    assert_eq!(
        surface.ops[2],
        Op::StrokeRect {
            bounds: Bounds::from_corners(Point::new(10.0, 30.0), Point::new(50.0, 60.0)),
            color: palette::DRAWING_STROKE,
            width: 2.0,
        }
    );
}

#[test]
fn test_export_scales_drawings_and_chip_metrics() {
    let detections = vec![caries()];
    let drawings = vec![labeled_rectangle()];
    let mut frame = scene(&detections, &drawings, InferenceMode::QualityCheck);
    frame.preview = Some(Preview::Shape {
        kind: DrawingKind::Line,
        points: Coords::new(vec![0.0, 0.0, 5.0, 5.0]),
    });

    let mut surface = RecordingSurface::sized(ORIGINAL.width, ORIGINAL.height);
    render_export(&mut surface, &frame, DISPLAYED);

    // Detections in original pixels
    assert_eq!(
        surface.ops[0],
        Op::StrokeRect {
            bounds: Bounds::from_corners(Point::new(100.0, 100.0), Point::new(300.0, 200.0)),
            color: palette::DETECTION_STROKE,
            width: 2.0,
        }
    );

    // Drawings doubled, including stroke width and chip
    let drawing_ops: Vec<_> = surface.ops[3..].to_vec();
    assert_eq!(
        drawing_ops[0],
        Op::StrokeRect {
            bounds: Bounds::from_corners(Point::new(20.0, 60.0), Point::new(100.0, 120.0)),
            color: palette::DRAWING_STROKE,
            width: 4.0,
        }
    );
    match &drawing_ops[2] {
        Op::Text {
            origin, font_size, ..
        } => {
            assert!(approx_eq(*font_size, 28.0));
            assert!(approx_eq(origin.x, 30.0));
            assert!(approx_eq(origin.y, 50.0));
        }
        other => panic!("unexpected op: {:?}", other),
    }

    // No preview in the export
    assert_eq!(drawing_ops.len(), 3);
}

#[test]
fn test_export_skips_everything_when_disabled() {
    let drawings = vec![labeled_rectangle()];
    let mut frame = scene(&[], &drawings, InferenceMode::QualityCheck);
    frame.annotations_enabled = false;

    let mut surface = RecordingSurface::sized(100.0, 100.0);
    render_export(&mut surface, &frame, DISPLAYED);
    assert!(surface.ops.is_empty());
}

#[test]
fn test_polygon_preview_snap_indicator() {
    let mut frame = scene(&[], &[], InferenceMode::QualityCheck);
    frame.preview = Some(Preview::Polygon {
        vertices: vec![Point::new(0.0, 0.0), Point::new(50.0, 0.0), Point::new(50.0, 50.0)],
        cursor: Some(Point::new(2.0, 2.0)),
        snapping: true,
    });

    let mut surface = RecordingSurface::default();
    render_display(&mut surface, &frame, ORIGINAL, DISPLAYED).unwrap();

    assert_eq!(
        surface.ops[2],
        Op::StrokeCircle {
            center: Point::new(0.0, 0.0),
            radius: 6.0,
        }
    );
    match &surface.ops[3] {
        Op::Polyline { points, .. } => {
            assert_eq!(points.len(), 5);
            assert_eq!(points.last(), Some(&Point::new(0.0, 0.0)));
        }
        other => panic!("unexpected op: {:?}", other),
    }
}

#[test]
fn test_point_and_unlabeled_drawings() {
    let drawings = vec![Drawing::new(
        "p",
        DrawingKind::Point,
        Coords::new(vec![4.0, 4.0]),
    )];
    let mut surface = RecordingSurface::default();
    render_display(
        &mut surface,
        &scene(&[], &drawings, InferenceMode::QualityCheck),
        ORIGINAL,
        DISPLAYED,
    )
    .unwrap();

    assert_eq!(
        surface.ops[2..],
        [Op::FillCircle {
            center: Point::new(4.0, 4.0),
            radius: 3.0,
        }]
    );
}

#[test]
fn test_unknown_original_size_draws_nothing() {
    let drawings = vec![labeled_rectangle()];
    let mut surface = RecordingSurface::default();
    render_display(
        &mut surface,
        &scene(&[], &drawings, InferenceMode::QualityCheck),
        Size::default(),
        DISPLAYED,
    )
    .unwrap();
    assert_eq!(surface.ops.len(), 2);
}

#[test]
fn test_skia_export_paints_drawing_stroke() {
    let drawings = vec![Drawing::new(
        "l",
        DrawingKind::Line,
        Coords::new(vec![0.0, 10.0, 50.0, 10.0]),
    )];
    let frame = scene(&[], &drawings, InferenceMode::QualityCheck);

    let mut surface = SkiaSurface::new(100, 40).unwrap();
    render_export(&mut surface, &frame, Size::new(50.0, 20.0));

    let image = surface.to_image();
    // Line doubled to y = 20, stroke width 4
    assert_eq!(image.get_pixel(50, 20).0, [0, 255, 0, 255]);
    assert_eq!(image.get_pixel(50, 35).0[3], 0);
}
