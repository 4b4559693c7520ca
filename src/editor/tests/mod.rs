//! Scenario tests for the canvas editor.
//!
//! Each test drives the editor through the same message sequence a host
//! would send for a real pointer gesture.

mod transform_tests;

use super::{Editor, EditorMessage, Outcome};
use crate::geometry::Point;
use crate::tool::ToolMode;

const EPSILON: f32 = 0.0001;

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn assert_points(actual: &[f32], expected: &[f32]) {
    assert_eq!(actual.len(), expected.len(), "{:?} vs {:?}", actual, expected);
    for (a, e) in actual.iter().zip(expected) {
        assert!(approx_eq(*a, *e), "{:?} vs {:?}", actual, expected);
    }
}

fn editor_with_tool(tool: ToolMode) -> Editor {
    let mut editor = Editor::default();
    editor.update(EditorMessage::SelectTool(tool));
    editor
}

fn down(editor: &mut Editor, x: f32, y: f32) -> Outcome {
    editor.update(EditorMessage::PointerDown(Point::new(x, y)))
}

fn drag_to(editor: &mut Editor, x: f32, y: f32) -> Outcome {
    editor.update(EditorMessage::PointerMove(Point::new(x, y)))
}

fn up(editor: &mut Editor, x: f32, y: f32) -> Outcome {
    editor.update(EditorMessage::PointerUp(Point::new(x, y)))
}

/// Full press-drag-release gesture.
fn gesture(editor: &mut Editor, from: (f32, f32), to: (f32, f32)) -> Outcome {
    down(editor, from.0, from.1);
    drag_to(editor, to.0, to.1);
    up(editor, to.0, to.1)
}
