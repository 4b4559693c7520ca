//! Tests for the move and reshape tools.

use super::*;
use crate::editor::Interaction;
use crate::model::Translation;

fn editor_with_rectangle() -> (Editor, String) {
    let mut editor = editor_with_tool(ToolMode::Rectangle);
    gesture(&mut editor, (10.0, 10.0), (110.0, 60.0));
    let id = editor.store().drawings()[0].id.clone();
    (editor, id)
}

#[test]
fn test_move_translates_by_sum_of_deltas() {
    let (mut editor, id) = editor_with_rectangle();
    editor.update(EditorMessage::SelectTool(ToolMode::Move));

    down(&mut editor, 50.0, 30.0);
    assert!(matches!(editor.interaction(), Interaction::Transforming { .. }));
    drag_to(&mut editor, 55.0, 28.0);
    drag_to(&mut editor, 70.0, 40.0);
    drag_to(&mut editor, 62.0, 45.0);
    editor.update(EditorMessage::WindowPointerUp);

    // Total delta (12, 15)
    let drawing = editor.store().drawing(&id).unwrap();
    assert_points(drawing.points.as_slice(), &[22.0, 25.0, 122.0, 75.0]);
    let translation = drawing.translation.unwrap();
    assert!(approx_eq(translation.x, 12.0));
    assert!(approx_eq(translation.y, 15.0));
    assert!(editor.interaction().is_idle());
}

#[test]
fn test_move_line_over_several_drags() {
    let mut editor = editor_with_tool(ToolMode::Line);
    gesture(&mut editor, (0.0, 0.0), (100.0, 0.0));
    editor.update(EditorMessage::SelectTool(ToolMode::Move));

    gesture(&mut editor, (50.0, 2.0), (60.0, 12.0));
    gesture(&mut editor, (60.0, 12.0), (40.0, 22.0));

    let drawing = &editor.store().drawings()[0];
    assert_points(drawing.points.as_slice(), &[-10.0, 20.0, 90.0, 20.0]);
    assert_eq!(drawing.translation, Some(Translation { x: -10.0, y: 20.0 }));
}

#[test]
fn test_move_on_empty_space_does_nothing() {
    let (mut editor, id) = editor_with_rectangle();
    editor.update(EditorMessage::SelectTool(ToolMode::Move));

    down(&mut editor, 300.0, 300.0);
    assert!(editor.interaction().is_idle());
    drag_to(&mut editor, 320.0, 320.0);
    assert_points(
        editor.store().drawing(&id).unwrap().points.as_slice(),
        &[10.0, 10.0, 110.0, 60.0],
    );
}

#[test]
fn test_move_does_not_touch_history() {
    let (mut editor, _) = editor_with_rectangle();
    let before = editor.store().history().len();
    editor.update(EditorMessage::SelectTool(ToolMode::Move));
    gesture(&mut editor, (50.0, 30.0), (80.0, 30.0));
    assert_eq!(editor.store().history().len(), before);
}

#[test]
fn test_reshape_keeps_grab_offset() {
    let (mut editor, id) = editor_with_rectangle();
    editor.update(EditorMessage::SelectTool(ToolMode::Reshape));

    // Grab corner 2 (110, 60) three pixels off
    down(&mut editor, 107.0, 57.0);
    assert!(matches!(
        editor.interaction(),
        Interaction::DraggingVertex { vertex_index: 2, .. }
    ));
    drag_to(&mut editor, 147.0, 77.0);
    up(&mut editor, 147.0, 77.0);

    let drawing = editor.store().drawing(&id).unwrap();
    assert_points(drawing.points.as_slice(), &[10.0, 10.0, 150.0, 80.0]);
    assert!(editor.interaction().is_idle());
}

#[test]
fn test_reshape_rectangle_corner_stays_axis_aligned() {
    let (mut editor, id) = editor_with_rectangle();
    editor.update(EditorMessage::SelectTool(ToolMode::Reshape));

    // Corner 3 is (x1, y2)
    gesture(&mut editor, (10.0, 60.0), (0.0, 90.0));
    let drawing = editor.store().drawing(&id).unwrap();
    assert_points(drawing.points.as_slice(), &[0.0, 10.0, 110.0, 90.0]);
}

#[test]
fn test_reshape_polygon_vertex() {
    let mut editor = editor_with_tool(ToolMode::Polygon);
    for (x, y) in [(0.0, 0.0), (50.0, 0.0), (50.0, 50.0), (0.0, 0.0)] {
        down(&mut editor, x, y);
    }
    editor.update(EditorMessage::SelectTool(ToolMode::Reshape));

    gesture(&mut editor, (50.0, 50.0), (60.0, 70.0));
    assert_points(
        editor.store().drawings()[0].points.as_slice(),
        &[0.0, 0.0, 50.0, 0.0, 60.0, 70.0],
    );
}

#[test]
fn test_reshape_miss_is_noop() {
    let (mut editor, id) = editor_with_rectangle();
    editor.update(EditorMessage::SelectTool(ToolMode::Reshape));

    gesture(&mut editor, (60.0, 35.0), (90.0, 90.0));
    assert_points(
        editor.store().drawing(&id).unwrap().points.as_slice(),
        &[10.0, 10.0, 110.0, 60.0],
    );
}

#[test]
fn test_hidden_drawings_cannot_be_moved() {
    let (mut editor, id) = editor_with_rectangle();
    editor.update(EditorMessage::ToggleDrawingVisibility(id.clone()));
    editor.update(EditorMessage::SelectTool(ToolMode::Move));

    down(&mut editor, 50.0, 30.0);
    assert!(editor.interaction().is_idle());
}

#[test]
fn test_drag_of_deleted_drawing_clears_state() {
    let (mut editor, id) = editor_with_rectangle();
    editor.update(EditorMessage::SelectTool(ToolMode::Move));
    down(&mut editor, 50.0, 30.0);

    editor.update(EditorMessage::DeleteDrawing(id));
    let outcome = drag_to(&mut editor, 60.0, 30.0);
    assert!(!outcome.redraw);
    assert!(editor.interaction().is_idle());
}
